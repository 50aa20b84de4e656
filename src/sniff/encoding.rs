//! Byte-encoding detection for delimited text sources.
//!
//! Two detectors run over a fixed 10 KiB prefix. The primary detector scores
//! every allowed encoding statistically; the secondary detector is a plain
//! BOM / ASCII / UTF-8 check consulted only when the primary has nothing to
//! say (a prefix without a single non-ASCII byte). An `ascii` verdict from the
//! secondary detector is widened to windows-1252, of which ASCII is a subset.

use std::path::Path;

use encoding_rs::{
    Encoding, ISO_8859_2, ISO_8859_15, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1250, WINDOWS_1252,
    X_USER_DEFINED,
};
use log::debug;
use serde::Serialize;

use crate::{
    error::{IntakeError, Result},
    io_utils,
};

pub const ENCODING_SAMPLE_BYTES: usize = 10 * 1024;
/// Guesses at or below this confidence are rejected.
pub const MIN_ENCODING_CONFIDENCE: f64 = 0.5;

const ASCII_LABEL: &str = "ascii";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Detector {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodingGuess {
    pub encoding: &'static Encoding,
    pub confidence: f64,
    pub detector: Detector,
}

#[derive(Debug, Clone)]
pub struct EncodingSniffer {
    allowed: Vec<&'static Encoding>,
    denied: Vec<String>,
    sample_bytes: usize,
}

impl Default for EncodingSniffer {
    fn default() -> Self {
        Self {
            allowed: vec![
                UTF_8,
                WINDOWS_1252,
                ISO_8859_15,
                WINDOWS_1250,
                ISO_8859_2,
                UTF_16LE,
                UTF_16BE,
            ],
            denied: vec![ASCII_LABEL.to_string(), X_USER_DEFINED.name().to_ascii_lowercase()],
            sample_bytes: ENCODING_SAMPLE_BYTES,
        }
    }
}

impl EncodingSniffer {
    /// Replaces the allow-list; order is the tie-break order.
    pub fn allow(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.allowed = encodings;
        self
    }

    /// Adds a label (encoding name or `ascii`) that the primary detector must never return.
    pub fn deny(mut self, label: &str) -> Self {
        self.denied.push(label.trim().to_ascii_lowercase());
        self
    }

    pub fn sample_bytes(mut self, bytes: usize) -> Self {
        self.sample_bytes = bytes.max(1);
        self
    }

    pub fn sniff_path(&self, path: &Path) -> Result<EncodingGuess> {
        let prefix = io_utils::read_prefix(path, self.sample_bytes)?;
        let guess = self.guess(&prefix);
        debug!(
            "Encoding guess for {:?}: {} ({:.3}, {:?} detector)",
            path,
            guess.encoding.name(),
            guess.confidence,
            guess.detector
        );
        if guess.confidence <= MIN_ENCODING_CONFIDENCE {
            return Err(IntakeError::EncodingDetection {
                path: path.to_path_buf(),
                confidence: guess.confidence,
            });
        }
        Ok(guess)
    }

    /// Runs both detectors without applying the confidence floor.
    pub fn guess(&self, bytes: &[u8]) -> EncodingGuess {
        if let Some((encoding, confidence)) = self.primary(bytes) {
            return EncodingGuess {
                encoding,
                confidence,
                detector: Detector::Primary,
            };
        }
        let (label, encoding, confidence) = secondary(bytes);
        let encoding = if label == ASCII_LABEL { WINDOWS_1252 } else { encoding };
        EncodingGuess {
            encoding,
            confidence,
            detector: Detector::Secondary,
        }
    }

    fn candidates(&self) -> impl Iterator<Item = &'static Encoding> + '_ {
        self.allowed.iter().copied().filter(|encoding| {
            let name = encoding.name().to_ascii_lowercase();
            !self.denied.iter().any(|denied| *denied == name)
        })
    }

    fn primary(&self, bytes: &[u8]) -> Option<(&'static Encoding, f64)> {
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return self
                .candidates()
                .any(|candidate| candidate == encoding)
                .then_some((encoding, 1.0));
        }
        if bytes.is_ascii() {
            return None;
        }

        let mut best: Option<(&'static Encoding, f64)> = None;
        for candidate in self.candidates() {
            let score = if candidate == UTF_8 {
                utf8_score(bytes)
            } else if candidate.is_single_byte() {
                let (text, _) = candidate.decode_without_bom_handling(bytes);
                single_byte_score(&text)
            } else {
                // UTF-16 without a BOM is not guessed.
                None
            };
            if let Some(score) = score
                && best.is_none_or(|(_, best_score)| score > best_score)
            {
                best = Some((candidate, score));
            }
        }
        best.filter(|(_, score)| *score > 0.0)
    }
}

fn secondary(bytes: &[u8]) -> (&'static str, &'static Encoding, f64) {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return (encoding.name(), encoding, 1.0);
    }
    if bytes.is_ascii() {
        return (ASCII_LABEL, WINDOWS_1252, 1.0);
    }
    if let Some(score) = utf8_score(bytes) {
        return (UTF_8.name(), UTF_8, score);
    }
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    let score = single_byte_score(&text).unwrap_or(0.0);
    (WINDOWS_1252.name(), WINDOWS_1252, score)
}

/// Cleanliness of a strictly valid UTF-8 prefix; `None` when the bytes are not
/// UTF-8. A multi-byte sequence cut off by the prefix boundary is tolerated.
fn utf8_score(bytes: &[u8]) -> Option<f64> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) if err.error_len().is_none() => {
            std::str::from_utf8(&bytes[..err.valid_up_to()]).ok()?
        }
        Err(_) => return None,
    };
    let stats = CharStats::collect(text);
    (stats.total > 0).then(|| stats.cleanliness())
}

/// `cleanliness × plausibility` of text decoded with a single-byte encoding.
/// Plausibility is the share of non-ASCII characters that are printable
/// (accented letters and symbols such as `€` or `°`); C1 controls count
/// against it.
fn single_byte_score(text: &str) -> Option<f64> {
    let stats = CharStats::collect(text);
    if stats.non_ascii == 0 {
        return None;
    }
    let plausibility = stats.non_ascii_printable as f64 / stats.non_ascii as f64;
    Some(stats.cleanliness() * plausibility)
}

#[derive(Debug, Default)]
struct CharStats {
    total: usize,
    suspicious: usize,
    non_ascii: usize,
    non_ascii_printable: usize,
}

impl CharStats {
    fn collect(text: &str) -> Self {
        let mut stats = CharStats::default();
        for ch in text.chars() {
            stats.total += 1;
            let is_control = ch.is_control() && !matches!(ch, '\t' | '\n' | '\r');
            let suspicious = is_control || ch == char::REPLACEMENT_CHARACTER;
            if suspicious {
                stats.suspicious += 1;
            }
            if !ch.is_ascii() {
                stats.non_ascii += 1;
                if !suspicious {
                    stats.non_ascii_printable += 1;
                }
            }
        }
        stats
    }

    fn cleanliness(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        1.0 - self.suspicious as f64 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// NUL, ESC and C1 controls mixed with a few symbols: no plausible text encoding.
    const LOW_SIGNAL: [u8; 10] = [0x00, 0x1B, 0x81, 0x8D, 0x90, 0x9D, 0xA4, 0xB6, 0xD7, 0xF7];

    #[test]
    fn utf8_text_is_detected_by_the_primary_detector() {
        let guess = EncodingSniffer::default().guess("Índice;Descrição\n1;Café\n".as_bytes());
        assert_eq!(guess.encoding, UTF_8);
        assert_eq!(guess.detector, Detector::Primary);
        assert!(guess.confidence > 0.9);
    }

    #[test]
    fn latin1_text_prefers_windows_1252() {
        let (bytes, _, _) = WINDOWS_1252.encode("Índice;Descrição\n1;Café\n");
        let guess = EncodingSniffer::default().guess(&bytes);
        assert_eq!(guess.encoding, WINDOWS_1252);
        assert_eq!(guess.confidence, 1.0);
    }

    #[test]
    fn symbols_alone_are_plausible_windows_1252() {
        let (bytes, _, _) = WINDOWS_1252.encode("Index;Name;Country;Price (€);Temp (°C)\n1;Acme;BR;9,90;21\n");
        let guess = EncodingSniffer::default().guess(&bytes);
        assert_eq!(guess.encoding, WINDOWS_1252);
        assert_eq!(guess.detector, Detector::Primary);
        assert!(guess.confidence > MIN_ENCODING_CONFIDENCE, "{guess:?}");
    }

    #[test]
    fn pure_ascii_falls_back_and_widens_to_windows_1252() {
        let guess = EncodingSniffer::default().guess(b"Index,Name,Website\n1,Acme,acme.io\n");
        assert_eq!(guess.detector, Detector::Secondary);
        assert_eq!(guess.encoding, WINDOWS_1252);
        assert_eq!(guess.confidence, 1.0);
    }

    #[test]
    fn byte_order_mark_is_authoritative() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend("a,b".encode_utf16().flat_map(u16::to_le_bytes));
        let guess = EncodingSniffer::default().guess(&bytes);
        assert_eq!(guess.encoding, UTF_16LE);
        assert_eq!(guess.confidence, 1.0);
    }

    #[test]
    fn truncated_trailing_sequence_still_counts_as_utf8() {
        let mut bytes = "Organização".as_bytes().to_vec();
        bytes.extend_from_slice(&[0xC3]);
        let guess = EncodingSniffer::default().guess(&bytes);
        assert_eq!(guess.encoding, UTF_8);
    }

    #[test]
    fn low_signal_bytes_score_at_or_below_the_floor() {
        let sample = LOW_SIGNAL.repeat(64);
        let guess = EncodingSniffer::default().guess(&sample);
        assert!(guess.confidence <= MIN_ENCODING_CONFIDENCE, "{guess:?}");
    }

    #[test]
    fn denied_encodings_are_never_returned_by_the_primary() {
        let (bytes, _, _) = WINDOWS_1252.encode("Índice;Descrição\n");
        let guess = EncodingSniffer::default().deny("windows-1252").guess(&bytes);
        assert_eq!(guess.encoding, ISO_8859_15);
    }

    #[test]
    fn sniff_path_rejects_low_confidence() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        std::io::Write::write_all(&mut file, &LOW_SIGNAL.repeat(32)).unwrap();
        let err = EncodingSniffer::default()
            .sniff_path(file.path())
            .expect_err("low-signal sample must fail");
        assert!(matches!(err, IntakeError::EncodingDetection { .. }));
    }
}
