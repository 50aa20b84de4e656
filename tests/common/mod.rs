#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::{TempDir, tempdir};

/// Catalog with the sample schemas used across the integration tests.
pub const SAMPLE_CATALOG: &str = r#"
sample1:
  columns:
    idx: Index
    name: [Name, Organization]
    country: [Country, País]
    employees: Number of employees
sample1_with_duplicated:
  columns:
    idx: Index
    employees: "Number of employees(1)"
people:
  columns:
    first_name: First Name
    last_name: [Last Name, Surname]
    email: [Email, E-mail]
    _ignore_: Notes
"#;

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }

    pub fn catalog(&self) -> PathBuf {
        self.write("schemas.yaml", SAMPLE_CATALOG)
    }

    /// Writes an xlsx workbook; each sheet is a name plus rows of cells.
    /// Cells that parse as numbers are written as numbers and `YYYY-MM-DD`
    /// cells as date-formatted datetimes.
    pub fn write_xlsx(&self, name: &str, sheets: &[(&str, &[&[&str]])]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        for (sheet_name, rows) in sheets {
            let sheet = workbook.add_worksheet();
            sheet.set_name(*sheet_name).expect("sheet name");
            for (row_idx, row) in rows.iter().enumerate() {
                for (col_idx, cell) in row.iter().enumerate() {
                    if cell.is_empty() {
                        continue;
                    }
                    let (r, c) = (row_idx as u32, col_idx as u16);
                    if let Ok(number) = cell.parse::<f64>() {
                        sheet.write_number(r, c, number).expect("write number");
                    } else if let Some(date) = iso_date(cell) {
                        sheet
                            .write_datetime_with_format(r, c, &date, &date_format)
                            .expect("write datetime");
                    } else {
                        sheet.write_string(r, c, *cell).expect("write string");
                    }
                }
            }
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}

fn iso_date(cell: &str) -> Option<ExcelDateTime> {
    let mut parts = cell.splitn(3, '-').map(str::parse::<u16>);
    let (Some(Ok(year)), Some(Ok(month)), Some(Ok(day))) = (parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    if year < 1900 || month > 12 || day > 31 {
        return None;
    }
    ExcelDateTime::from_ymd(year, month as u8, day as u8).ok()
}
