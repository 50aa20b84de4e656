//! Encoding and delimiter sniffing for delimited-text sources.

mod delimiter;
mod encoding;

pub use delimiter::{DEFAULT_DELIMITER_CANDIDATES, DELIMITER_SAMPLE_CHARS, DelimiterSniffer};
pub use encoding::{
    Detector, ENCODING_SAMPLE_BYTES, EncodingGuess, EncodingSniffer, MIN_ENCODING_CONFIDENCE,
};
