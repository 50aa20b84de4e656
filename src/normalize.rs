//! Header and cell text canonicalization.
//!
//! Every comparison between a sheet cell and a schema alias goes through
//! [`normalize_text`]. Two strings match if and only if their normalized forms
//! are equal; there is no similarity scoring.

use std::fmt::Display;

use deunicode::deunicode_with_tofu;
use itertools::Itertools;

/// Canonicalizes any displayable value for header matching.
///
/// The value is split on whitespace (line breaks and tabs included) before
/// each token is transliterated to ASCII, with diacritics stripped and
/// characters without a transliteration dropped. The result is lower-cased,
/// literal `\n` escape sequences become spaces, and whitespace runs collapse
/// to a single space with the ends trimmed.
pub fn normalize_text<T: Display + ?Sized>(value: &T) -> String {
    let ascii = value
        .to_string()
        .split_whitespace()
        .map(|token| deunicode_with_tofu(token, ""))
        .join(" ")
        .to_ascii_lowercase();
    ascii.replace("\\n", " ").split_whitespace().join(" ")
}

/// Normalizes every value of a row, preserving order.
pub fn normalize_row<S: AsRef<str>>(row: &[S]) -> Vec<String> {
    row.iter().map(|value| normalize_text(value.as_ref())).collect()
}
