//! Delimited-text sources: one unit per file.

use std::{
    io::BufRead,
    path::{Path, PathBuf},
};

use encoding_rs::Encoding;
use log::info;

use crate::{
    ReadOptions,
    error::{IntakeError, Result},
    grid::RawGrid,
    io_utils,
    source::{TabularSource, UnitId},
};

#[derive(Debug)]
pub struct DelimitedSource {
    path: PathBuf,
    encoding: &'static Encoding,
    delimiter: u8,
}

impl DelimitedSource {
    /// Opens `path`, taking encoding and delimiter from `options` or sniffing them.
    pub fn open(path: &Path, options: &ReadOptions) -> Result<Self> {
        if !path.is_file() {
            return Err(IntakeError::open(path, "not a readable file"));
        }
        let encoding = match options.encoding.as_deref() {
            Some(label) => io_utils::resolve_encoding(Some(label))?,
            None => options.encoding_sniffer.sniff_path(path)?.encoding,
        };
        let delimiter = match options.delimiter {
            Some(delimiter) => delimiter,
            None => options.delimiter_sniffer.sniff_path(path, encoding)?,
        };
        info!(
            "Reading {:?} as {} text delimited by '{}'",
            path,
            encoding.name(),
            crate::printable_delimiter(delimiter)
        );
        Ok(Self::with_dialect(path, encoding, delimiter))
    }

    pub fn with_dialect(path: &Path, encoding: &'static Encoding, delimiter: u8) -> Self {
        Self {
            path: path.to_path_buf(),
            encoding,
            delimiter,
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl TabularSource for DelimitedSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn units(&self) -> Vec<UnitId> {
        vec![UnitId::File(self.path.clone())]
    }

    fn read_rows(&mut self, unit: &UnitId, skip: usize, limit: Option<usize>) -> Result<RawGrid> {
        if *unit != UnitId::File(self.path.clone()) {
            return Err(IntakeError::UnknownUnit {
                path: self.path.clone(),
                unit: unit.to_string(),
            });
        }
        let reader = io_utils::open_decoded(&self.path, self.encoding)?;
        let mut rows = Vec::new();
        // Blank lines are data rows, so indices always equal line numbers.
        for line in reader.lines().skip(skip).take(limit.unwrap_or(usize::MAX)) {
            let line = line.map_err(|e| IntakeError::read(&self.path, e))?;
            rows.push(io_utils::split_line(&line, self.delimiter));
        }
        Ok(RawGrid::from_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn window_keeps_blank_lines_and_pads_rows() {
        let file = write_temp(b"Report\n\nIndex;Name;Country\n1;Acme\n");
        let mut source = DelimitedSource::with_dialect(file.path(), UTF_8, b';');
        let unit = source.units().remove(0);
        let grid = source.read_window(&unit, 50).unwrap();
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.row(1).unwrap(), ["", "", ""]);
        assert_eq!(grid.row(3).unwrap(), ["1", "Acme", ""]);
    }

    #[test]
    fn skip_and_limit_follow_line_numbers() {
        let file = write_temp(b"a,b\nc,d\ne,f\ng,h\n");
        let mut source = DelimitedSource::with_dialect(file.path(), UTF_8, b',');
        let unit = source.units().remove(0);
        let grid = source.read_rows(&unit, 1, Some(2)).unwrap();
        assert_eq!(grid.rows(), [vec!["c", "d"], vec!["e", "f"]]);
        let tail = source.read_rows(&unit, 3, None).unwrap();
        assert_eq!(tail.rows(), [vec!["g", "h"]]);
    }

    #[test]
    fn open_sniffs_encoding_and_delimiter() {
        let (bytes, _, _) = WINDOWS_1252.encode("Índice|Descrição\n1|Café\n");
        let file = write_temp(&bytes);
        let source = DelimitedSource::open(file.path(), &ReadOptions::default()).unwrap();
        assert_eq!(source.encoding(), WINDOWS_1252);
        assert_eq!(source.delimiter(), b'|');
    }

    #[test]
    fn explicit_dialect_skips_sniffing() {
        let file = write_temp(b"no delimiters here\n");
        let options = ReadOptions {
            encoding: Some("utf-8".to_string()),
            delimiter: Some(b','),
            ..ReadOptions::default()
        };
        let mut source = DelimitedSource::open(file.path(), &options).unwrap();
        let unit = source.units().remove(0);
        let grid = source.read_window(&unit, 5).unwrap();
        assert_eq!(grid.rows(), [vec!["no delimiters here"]]);
    }

    #[test]
    fn sheets_are_not_units_of_a_text_file() {
        let file = write_temp(b"a,b\n");
        let mut source = DelimitedSource::with_dialect(file.path(), UTF_8, b',');
        let err = source
            .read_window(&UnitId::Sheet("Sheet1".into()), 5)
            .expect_err("sheet unit");
        assert!(matches!(err, IntakeError::UnknownUnit { .. }));
    }
}
