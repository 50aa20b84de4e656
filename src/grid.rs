//! Raw string grids read from a sheet or delimited file.

use crate::{names, normalize};

/// Default number of leading rows scanned for a header.
pub const DEFAULT_WINDOW_ROWS: usize = 50;

/// Rows × columns of raw string cells.
///
/// Every row has exactly [`RawGrid::width`] cells; short rows are padded with
/// empty strings so that a missing cell and an empty cell compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl RawGrid {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { rows, width }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Treats every row as a candidate header: disambiguates repeated values,
    /// then normalizes each cell.
    pub fn header_candidates(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| normalize::normalize_row(&names::disambiguate(row)))
            .collect()
    }
}
