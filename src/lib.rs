pub mod catalog;
pub mod cli;
mod columns;
pub mod delimited;
mod detect;
pub mod diagnostics;
pub mod error;
mod export;
pub mod extract;
pub mod grid;
pub mod io_utils;
pub mod matcher;
pub mod names;
pub mod normalize;
pub mod orchestrator;
pub mod pipeline;
pub mod selector;
pub mod sniff;
pub mod source;
pub mod table;
pub mod workbook;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use catalog::{FieldSpec, SchemaCatalog, SchemaDefinition};
pub use diagnostics::Diagnostics;
pub use error::IntakeError;
pub use extract::{ExtractionResult, OutputTable};
pub use pipeline::{ReadOptions, ReadOutcome, detect_file, read_file};
pub use source::{ReaderEngine, TabularSource, UnitId};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("schema_sniff", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Detect(args) => detect::execute(&args),
        Commands::Extract(args) => export::execute(&args),
        Commands::Schemas(args) => columns::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
