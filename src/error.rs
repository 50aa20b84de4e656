//! Error types for schema detection and extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening, sniffing, scanning, or extracting a source file.
///
/// Detection failures abort processing of the current file only; callers are
/// free to continue with other files.
#[derive(Debug, Error)]
pub enum IntakeError {
    // === Source access ===
    /// File missing, unreadable, or not a valid workbook.
    #[error("failed to open {path}: {message}")]
    SourceOpen { path: PathBuf, message: String },

    /// Reading rows from an already opened source failed.
    #[error("failed to read {path}: {message}")]
    SourceRead { path: PathBuf, message: String },

    /// A caller-supplied sheet name does not exist in the workbook.
    #[error("sheet '{unit}' not found in {path}")]
    UnknownUnit { path: PathBuf, unit: String },

    // === Sniffing ===
    /// Explicit encoding label that `encoding_rs` does not know.
    #[error("unknown encoding '{label}'")]
    UnknownEncoding { label: String },

    /// Encoding detection confidence at or below the acceptance floor.
    #[error("could not detect the encoding of {path} (confidence {confidence:.2})")]
    EncodingDetection { path: PathBuf, confidence: f64 },

    /// None of the candidate delimiters occurs in the sampled prefix.
    #[error("could not detect the delimiter of {path}: none of [{candidates}] occurs in the sample")]
    DelimiterDetection { path: PathBuf, candidates: String },

    /// Delimiter candidates and explicit delimiters must be single ASCII characters.
    #[error("delimiter {value:?} is not a single ASCII character")]
    InvalidDelimiter { value: char },

    // === Matching ===
    /// No unit of the file matched any schema above the acceptance threshold.
    #[error("no schema matched any sheet of {path} at or above the acceptance threshold")]
    NoSchemaMatch { path: PathBuf },

    // === Schema catalog ===
    /// Schema definition violates a construction invariant.
    #[error("invalid schema '{schema}': {reason}")]
    InvalidSchema { schema: String, reason: String },

    /// Catalog file unreadable or malformed.
    #[error("failed to load schema catalog {path}: {message}")]
    Catalog { path: PathBuf, message: String },
}

impl IntakeError {
    pub(crate) fn open(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::SourceOpen {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::SourceRead {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Returns true for failures that are specific to sniffing delimited text.
    pub fn is_detection_failure(&self) -> bool {
        matches!(
            self,
            Self::EncodingDetection { .. } | Self::DelimiterDetection { .. }
        )
    }
}

/// Result type for intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;
