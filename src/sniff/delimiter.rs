//! Field delimiter detection by character frequency.

use std::path::Path;

use encoding_rs::Encoding;
use itertools::Itertools;
use log::debug;

use crate::{
    error::{IntakeError, Result},
    io_utils,
};

pub const DELIMITER_SAMPLE_CHARS: usize = 2048;
pub const DEFAULT_DELIMITER_CANDIDATES: [char; 7] = ['#', '|', ';', '\t', ':', ',', '^'];

#[derive(Debug, Clone)]
pub struct DelimiterSniffer {
    candidates: Vec<char>,
    sample_chars: usize,
}

impl Default for DelimiterSniffer {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_DELIMITER_CANDIDATES.to_vec(),
            sample_chars: DELIMITER_SAMPLE_CHARS,
        }
    }
}

impl DelimiterSniffer {
    /// Candidates in priority order; every candidate must be ASCII.
    pub fn with_candidates(candidates: Vec<char>) -> Result<Self> {
        if let Some(&value) = candidates.iter().find(|ch| !ch.is_ascii()) {
            return Err(IntakeError::InvalidDelimiter { value });
        }
        Ok(Self {
            candidates,
            ..Self::default()
        })
    }

    pub fn sample_chars(mut self, chars: usize) -> Self {
        self.sample_chars = chars;
        self
    }

    pub fn candidates(&self) -> &[char] {
        &self.candidates
    }

    /// Most frequent candidate in `sample` with its count. The earliest
    /// candidate wins ties; `None` when no candidate occurs at all.
    pub fn detect(&self, sample: &str) -> Option<(char, usize)> {
        let counts = sample.chars().take(self.sample_chars).counts();
        let mut best: Option<(char, usize)> = None;
        for &candidate in &self.candidates {
            let count = counts.get(&candidate).copied().unwrap_or(0);
            if count > 0 && best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((candidate, count));
            }
        }
        best
    }

    pub fn sniff_path(&self, path: &Path, encoding: &'static Encoding) -> Result<u8> {
        let sample = io_utils::read_decoded_chars(path, encoding, self.sample_chars)?;
        let Some((delimiter, count)) = self.detect(&sample) else {
            return Err(IntakeError::DelimiterDetection {
                path: path.to_path_buf(),
                candidates: self.candidates.iter().map(|ch| format!("{ch:?}")).join(" "),
            });
        };
        debug!("Delimiter for {:?}: {:?} ({} occurrences)", path, delimiter, count);
        Ok(delimiter as u8)
    }
}
