//! I/O helpers for delimited text: encoding resolution, bounded prefix reads,
//! decoded line iteration, single-line field splitting, and CSV output.
//!
//! Detection never streams a whole file. Encoding sniffing reads a raw byte
//! prefix, delimiter sniffing a decoded character prefix, and header scanning
//! a bounded number of lines.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::Context;
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};

use crate::error::{IntakeError, Result};

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes()).ok_or_else(|| IntakeError::UnknownEncoding {
            label: value.to_string(),
        })
    } else {
        Ok(UTF_8)
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| IntakeError::open(path, e))
}

/// Reads at most `limit` raw bytes from the start of `path`.
pub fn read_prefix(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(limit);
    open_file(path)?
        .take(limit as u64)
        .read_to_end(&mut buffer)
        .map_err(|e| IntakeError::read(path, e))?;
    Ok(buffer)
}

/// Opens `path` as UTF-8 text transcoded from `encoding`; a BOM is stripped.
pub fn open_decoded(
    path: &Path,
    encoding: &'static Encoding,
) -> Result<BufReader<DecodeReaderBytes<File, Vec<u8>>>> {
    let file = open_file(path)?;
    let decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .build(file);
    Ok(BufReader::new(decoder))
}

/// Reads at most `limit` decoded characters from the start of `path`.
///
/// At most `4 × limit` bytes of UTF-8 are pulled through the decoder, which
/// always covers `limit` characters; a character cut at that boundary falls
/// past the limit and is discarded.
pub fn read_decoded_chars(path: &Path, encoding: &'static Encoding, limit: usize) -> Result<String> {
    let mut decoded = Vec::new();
    open_decoded(path, encoding)?
        .take(limit.saturating_mul(4) as u64)
        .read_to_end(&mut decoded)
        .map_err(|e| IntakeError::read(path, e))?;
    Ok(String::from_utf8_lossy(&decoded).chars().take(limit).collect())
}

/// Splits one physical line into fields, honouring quotes within the line.
/// A blank line yields no fields.
pub fn split_line(line: &str, delimiter: u8) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .double_quote(true)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        Some(Err(_)) => line.split(delimiter as char).map(str::to_string).collect(),
        None => Vec::new(),
    }
}

pub fn open_csv_writer(path: &Path, delimiter: u8) -> anyhow::Result<csv::Writer<Box<dyn Write>>> {
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let writer: Box<dyn Write> = Box::new(BufWriter::new(file));
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(writer))
}
