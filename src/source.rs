//! Reader seam between the detection engine and concrete file formats.
//!
//! A source exposes one or more *units*: every sheet of a workbook, or the
//! whole file for delimited text. Detection scans a bounded window of each
//! unit; extraction re-reads a unit from its detected header row.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use log::debug;
use serde::Serialize;

use crate::{delimited::DelimitedSource, error::Result, grid::RawGrid, workbook::WorkbookSource};

/// Identifies the unit a header was searched in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum UnitId {
    Sheet(String),
    File(PathBuf),
}

impl UnitId {
    pub fn sheet_name(&self) -> Option<&str> {
        match self {
            UnitId::Sheet(name) => Some(name),
            UnitId::File(_) => None,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitId::Sheet(name) => write!(f, "{name}"),
            UnitId::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Which reader opens the file. `Auto` decides from the file extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReaderEngine {
    #[default]
    Auto,
    Xlsx,
    Xls,
    Xlsb,
    Ods,
    Delimited,
}

impl ReaderEngine {
    /// Resolves `Auto` to a concrete engine for `path`.
    pub fn resolve(self, path: &Path) -> ReaderEngine {
        if self != ReaderEngine::Auto {
            return self;
        }
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlam" | "xltx" | "xltm" => ReaderEngine::Xlsx,
            "xls" | "xla" => ReaderEngine::Xls,
            "xlsb" => ReaderEngine::Xlsb,
            "ods" => ReaderEngine::Ods,
            _ => ReaderEngine::Delimited,
        }
    }

    pub fn is_spreadsheet(self) -> bool {
        !matches!(self, ReaderEngine::Auto | ReaderEngine::Delimited)
    }
}

/// Tabular file reader used for both header detection and extraction.
pub trait TabularSource {
    fn path(&self) -> &Path;

    /// Units in source order.
    fn units(&self) -> Vec<UnitId>;

    /// Reads up to `limit` rows of `unit` after skipping `skip` rows.
    /// `None` reads to the end of the unit.
    fn read_rows(&mut self, unit: &UnitId, skip: usize, limit: Option<usize>) -> Result<RawGrid>;

    /// Bounded window used for header detection.
    fn read_window(&mut self, unit: &UnitId, rows: usize) -> Result<RawGrid> {
        self.read_rows(unit, 0, Some(rows))
    }
}

/// Opens `path` with the engine resolved from `options`, sniffing encoding
/// and delimiter for delimited text when they are not given explicitly.
pub fn open_source(path: &Path, options: &crate::ReadOptions) -> Result<Box<dyn TabularSource>> {
    let engine = options.engine.resolve(path);
    debug!("Opening {:?} with {:?} reader", path, engine);
    if engine.is_spreadsheet() {
        Ok(Box::new(WorkbookSource::open(path, engine)?))
    } else {
        Ok(Box::new(DelimitedSource::open(path, options)?))
    }
}
