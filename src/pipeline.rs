//! `read_file`: open, sniff, scan and extract one file.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::{
    catalog::SchemaCatalog,
    diagnostics::Diagnostics,
    error::{IntakeError, Result},
    extract::{self, ExtractionResult},
    grid::DEFAULT_WINDOW_ROWS,
    orchestrator::{self, ScanOutcome},
    sniff::{DelimiterSniffer, EncodingSniffer},
    source::{self, ReaderEngine},
};

/// Reader configuration for one call to [`read_file`].
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Encoding label for delimited text; sniffed when `None`.
    pub encoding: Option<String>,
    /// Field delimiter for delimited text; sniffed when `None`.
    pub delimiter: Option<u8>,
    pub engine: ReaderEngine,
    /// Sheets to scan; empty scans every sheet.
    pub sheets: Vec<String>,
    pub window_rows: usize,
    pub encoding_sniffer: EncodingSniffer,
    pub delimiter_sniffer: DelimiterSniffer,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            encoding: None,
            delimiter: None,
            engine: ReaderEngine::Auto,
            sheets: Vec::new(),
            window_rows: DEFAULT_WINDOW_ROWS,
            encoding_sniffer: EncodingSniffer::default(),
            delimiter_sniffer: DelimiterSniffer::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadOutcome {
    pub path: PathBuf,
    /// Extraction results in unit order; the single no-match element when
    /// nothing was accepted.
    pub results: Vec<ExtractionResult>,
    pub diagnostics: Diagnostics,
}

impl ReadOutcome {
    pub fn matched(&self) -> bool {
        self.results.iter().any(ExtractionResult::is_match)
    }

    /// Returns the results, or `NoSchemaMatch` when nothing was accepted.
    pub fn into_matched(self) -> Result<Vec<ExtractionResult>> {
        if !self.matched() {
            return Err(IntakeError::NoSchemaMatch { path: self.path });
        }
        Ok(self.results)
    }
}

/// Header detection only: scores every unit of `path` without extracting.
pub fn detect_file(path: &Path, catalog: &SchemaCatalog, options: &ReadOptions) -> Result<ScanOutcome> {
    let mut source = source::open_source(path, options)?;
    let units = orchestrator::resolve_units(&*source, &options.sheets)?;
    orchestrator::scan_source(&mut *source, catalog, &units, options.window_rows)
}

/// Detects the schema of every unit in `path` and extracts the accepted ones.
pub fn read_file(path: &Path, catalog: &SchemaCatalog, options: &ReadOptions) -> Result<ReadOutcome> {
    let mut source = source::open_source(path, options)?;
    let units = orchestrator::resolve_units(&*source, &options.sheets)?;
    let scan = orchestrator::scan_source(&mut *source, catalog, &units, options.window_rows)?;
    let mut diagnostics = scan.diagnostics;

    let mut results = Vec::with_capacity(scan.accepted.len());
    for candidate in &scan.accepted {
        let Some(schema) = catalog.get(&candidate.schema_id) else {
            continue;
        };
        let (result, duplicates) = extract::extract(&mut *source, candidate, schema)?;
        diagnostics.duplicate_columns.extend(duplicates);
        results.push(result);
    }

    if results.is_empty() {
        warn!("{:?}: no schema matched any of {} unit(s)", path, units.len());
        results.push(ExtractionResult::no_match());
    } else {
        info!("{:?}: {} unit(s) extracted", path, results.len());
    }

    Ok(ReadOutcome {
        path: path.to_path_buf(),
        results,
        diagnostics,
    })
}
