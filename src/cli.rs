use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{ReadOptions, grid::DEFAULT_WINDOW_ROWS, source::ReaderEngine};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Detect header rows and known schemas in messy spreadsheets and CSV files",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score every sheet of a file against a schema catalog
    Detect(DetectArgs),
    /// Extract matched sheets as canonical CSV files or previews
    Extract(ExtractArgs),
    /// List the schemas, canonical fields and aliases of a catalog
    Schemas(SchemasArgs),
}

/// Input and reader options shared by `detect` and `extract`.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Spreadsheet or delimited text file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Schema catalog (YAML)
    #[arg(short = 's', long = "schemas")]
    pub schemas: PathBuf,
    /// Restrict the scan to these sheets (repeatable)
    #[arg(long = "sheet", action = clap::ArgAction::Append)]
    pub sheets: Vec<String>,
    /// Character encoding of delimited text (sniffed when omitted)
    #[arg(long = "encoding")]
    pub encoding: Option<String>,
    /// Delimiter of delimited text (supports ',', 'tab', ';', '|'; sniffed when omitted)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Reader used to open the input
    #[arg(long, value_enum, default_value_t = ReaderEngine::Auto)]
    pub engine: ReaderEngine,
    /// Number of leading rows searched for a header
    #[arg(long = "window-rows", default_value_t = DEFAULT_WINDOW_ROWS)]
    pub window_rows: usize,
}

impl SourceArgs {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            encoding: self.encoding.clone(),
            delimiter: self.delimiter,
            engine: self.engine,
            sheets: self.sheets.clone(),
            window_rows: self.window_rows,
            ..ReadOptions::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Emit scores and diagnostics as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Directory receiving one CSV per matched sheet
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Print the first N rows of every result instead of writing files
    #[arg(long)]
    pub preview: Option<usize>,
    /// Delimiter for written CSV files
    #[arg(long = "output-delimiter", value_parser = parse_delimiter, default_value = ",")]
    pub output_delimiter: u8,
}

#[derive(Debug, Args)]
pub struct SchemasArgs {
    /// Schema catalog (YAML)
    #[arg(short = 's', long = "schemas")]
    pub schemas: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn delimiter_names_and_single_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("semicolon"), Ok(b';'));
        assert_eq!(parse_delimiter("^"), Ok(b'^'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("¦").is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn source_args_become_read_options() {
        let cli = Cli::try_parse_from([
            "schema-sniff",
            "detect",
            "-i",
            "book.xlsx",
            "-s",
            "schemas.yaml",
            "--sheet",
            "Orgs",
            "--sheet",
            "More",
            "--engine",
            "xlsx",
            "--window-rows",
            "10",
        ])
        .unwrap();
        let Commands::Detect(args) = cli.command else {
            panic!("expected detect");
        };
        let options = args.source.read_options();
        assert_eq!(options.sheets, vec!["Orgs", "More"]);
        assert_eq!(options.engine, ReaderEngine::Xlsx);
        assert_eq!(options.window_rows, 10);
        assert_eq!(options.delimiter, None);
    }
}
