//! `extract`: run the full pipeline and write or preview the canonical tables.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use log::info;

use crate::{
    catalog::SchemaCatalog,
    cli::ExtractArgs,
    extract::ExtractionResult,
    io_utils, pipeline, table,
};

pub fn execute(args: &ExtractArgs) -> Result<()> {
    let catalog = SchemaCatalog::load(&args.source.schemas)
        .with_context(|| format!("Loading schema catalog {:?}", args.source.schemas))?;
    let options = args.source.read_options();
    let input = &args.source.input;
    let results = pipeline::read_file(input, &catalog, &options)
        .with_context(|| format!("Reading {input:?}"))?
        .into_matched()?;

    if let Some(limit) = args.preview {
        for result in &results {
            preview(result, limit);
        }
    }

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).with_context(|| format!("Creating output directory {dir:?}"))?;
        for result in &results {
            let path = dir.join(output_file_name(input, result));
            write_result(&path, result, args.output_delimiter)?;
            info!("Wrote {} row(s) to {:?}", result.table.len(), path);
        }
    } else if args.preview.is_none() {
        bail!("Nothing to do: pass --output-dir and/or --preview");
    }
    Ok(())
}

fn preview(result: &ExtractionResult, limit: usize) {
    let unit = result.unit.as_ref().map(ToString::to_string).unwrap_or_default();
    let schema = result.schema_id.as_deref().unwrap_or_default();
    println!("== {unit} -> {schema} ({} row(s))", result.table.len());
    let rows: Vec<Vec<String>> = result.table.rows().iter().take(limit).cloned().collect();
    table::print_table(result.table.columns(), &rows);
}

/// `<input stem>__<unit>__<schema>.csv` with path-hostile characters replaced.
pub fn output_file_name(input: &Path, result: &ExtractionResult) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let unit = match &result.unit {
        Some(crate::UnitId::Sheet(name)) => name.clone(),
        _ => "file".to_string(),
    };
    let schema = result.schema_id.clone().unwrap_or_default();
    format!(
        "{}__{}__{}.csv",
        file_safe(&stem),
        file_safe(&unit),
        file_safe(&schema)
    )
}

fn file_safe(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_whitespace() => '_',
            ch => ch,
        })
        .collect()
}

fn write_result(path: &Path, result: &ExtractionResult, delimiter: u8) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, delimiter)?;
    writer
        .write_record(result.table.columns())
        .with_context(|| format!("Writing header to {path:?}"))?;
    for (idx, row) in result.table.rows().iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("Writing row {} to {path:?}", idx + 1))?;
    }
    writer.flush().with_context(|| format!("Flushing {path:?}"))?;
    Ok(())
}
