//! Spreadsheet sources backed by `calamine`.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use calamine::{CellErrorType, Data, Ods, Reader, Sheets, Xls, Xlsb, Xlsx, open_workbook, open_workbook_auto};
use chrono::NaiveDateTime;
use log::debug;

use crate::{
    error::{IntakeError, Result},
    grid::RawGrid,
    source::{ReaderEngine, TabularSource, UnitId},
};

pub struct WorkbookSource {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
    sheet_names: Vec<String>,
}

impl WorkbookSource {
    pub fn open(path: &Path, engine: ReaderEngine) -> Result<Self> {
        let workbook = match engine {
            ReaderEngine::Xlsx => {
                Sheets::Xlsx(open_workbook::<Xlsx<_>, _>(path).map_err(|e| IntakeError::open(path, e))?)
            }
            ReaderEngine::Xls => {
                Sheets::Xls(open_workbook::<Xls<_>, _>(path).map_err(|e| IntakeError::open(path, e))?)
            }
            ReaderEngine::Xlsb => {
                Sheets::Xlsb(open_workbook::<Xlsb<_>, _>(path).map_err(|e| IntakeError::open(path, e))?)
            }
            ReaderEngine::Ods => {
                Sheets::Ods(open_workbook::<Ods<_>, _>(path).map_err(|e| IntakeError::open(path, e))?)
            }
            ReaderEngine::Auto | ReaderEngine::Delimited => {
                open_workbook_auto(path).map_err(|e| IntakeError::open(path, e))?
            }
        };
        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(IntakeError::open(path, "workbook contains no sheets"));
        }
        debug!("Workbook {:?} has sheets {:?}", path, sheet_names);
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
            sheet_names,
        })
    }
}

impl TabularSource for WorkbookSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn units(&self) -> Vec<UnitId> {
        self.sheet_names.iter().cloned().map(UnitId::Sheet).collect()
    }

    fn read_rows(&mut self, unit: &UnitId, skip: usize, limit: Option<usize>) -> Result<RawGrid> {
        let Some(sheet) = unit.sheet_name() else {
            return Err(IntakeError::UnknownUnit {
                path: self.path.clone(),
                unit: unit.to_string(),
            });
        };
        if !self.sheet_names.iter().any(|name| name == sheet) {
            return Err(IntakeError::UnknownUnit {
                path: self.path.clone(),
                unit: sheet.to_string(),
            });
        }
        let range = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|e| IntakeError::read(&self.path, format!("sheet '{sheet}': {e}")))?;

        // Anchor at A1 so row indices are absolute sheet rows.
        let (first_row, first_col) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));
        let take = limit.unwrap_or(usize::MAX);

        let leading_blank = first_row.saturating_sub(skip).min(take);
        let mut rows: Vec<Vec<String>> = vec![Vec::new(); leading_blank];
        let data_skip = skip.saturating_sub(first_row);
        rows.extend(
            range
                .rows()
                .skip(data_skip)
                .take(take - leading_blank)
                .map(|cells| {
                    let mut row = vec![String::new(); first_col];
                    row.extend(cells.iter().map(cell_to_text));
                    row
                }),
        );
        Ok(RawGrid::from_rows(rows))
    }
}

/// Renders a spreadsheet cell the way it reads on screen.
pub fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Bool(flag) => (if *flag { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) => render_datetime(&datetime),
            None => value.as_f64().to_string(),
        },
        Data::Error(err) => render_error(err),
    }
}

fn render_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Error cells keep their kind, e.g. `#Div0` or `#NA`.
fn render_error(err: &CellErrorType) -> String {
    format!("#{err:?}")
}
