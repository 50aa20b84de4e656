//! `detect`: score every unit of a file and report the verdicts.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    catalog::SchemaCatalog,
    cli::DetectArgs,
    orchestrator::ScanOutcome,
    pipeline, selector, table,
};

#[derive(Serialize)]
struct DetectReport<'a> {
    input: &'a std::path::Path,
    threshold: f64,
    #[serde(flatten)]
    outcome: &'a ScanOutcome,
}

pub fn execute(args: &DetectArgs) -> Result<()> {
    let catalog = SchemaCatalog::load(&args.source.schemas)
        .with_context(|| format!("Loading schema catalog {:?}", args.source.schemas))?;
    let options = args.source.read_options();
    let outcome = pipeline::detect_file(&args.source.input, &catalog, &options)
        .with_context(|| format!("Detecting schemas in {:?}", args.source.input))?;

    if args.json {
        let report = DetectReport {
            input: &args.source.input,
            threshold: selector::ACCEPTANCE_THRESHOLD,
            outcome: &outcome,
        };
        let json = serde_json::to_string_pretty(&report).context("Serializing detection report")?;
        println!("{json}");
    } else {
        print_report(&outcome);
    }

    info!(
        "{} of {} unit(s) in {:?} matched a schema",
        outcome.accepted.len(),
        outcome.accepted.len() + outcome.diagnostics.rejected.len(),
        args.source.input
    );
    Ok(())
}

fn print_report(outcome: &ScanOutcome) {
    let headers = ["unit", "schema", "row", "matched", "proportion", "verdict"]
        .map(str::to_string)
        .to_vec();
    let rows: Vec<Vec<String>> = outcome
        .diagnostics
        .scores
        .iter()
        .map(|score| {
            let chosen = outcome
                .accepted
                .iter()
                .any(|a| a.unit == score.unit && a.schema_id == score.schema_id);
            vec![
                score.unit.to_string(),
                score.schema_id.clone(),
                score.best_row.map(|row| row.to_string()).unwrap_or_default(),
                format!("{}/{}", score.matched_fields, score.total_fields),
                format!("{:.2}", score.proportion),
                if chosen { "accepted" } else { "" }.to_string(),
            ]
        })
        .collect();
    table::print_table(&headers, &rows);

    if !outcome.diagnostics.rejected.is_empty() {
        println!();
        let headers = ["rejected unit", "reason", "best schema", "best proportion"]
            .map(str::to_string)
            .to_vec();
        let rows: Vec<Vec<String>> = outcome
            .diagnostics
            .rejected
            .iter()
            .map(|rejected| {
                vec![
                    rejected.unit.to_string(),
                    format!("{:?}", rejected.reason),
                    rejected.best_schema.clone().unwrap_or_default(),
                    format!("{:.2}", rejected.best_proportion),
                ]
            })
            .collect();
        table::print_table(&headers, &rows);
    }

    if !outcome.diagnostics.unmatched_fields.is_empty() {
        println!();
        let headers = ["unit", "schema", "unmatched field", "aliases"]
            .map(str::to_string)
            .to_vec();
        let rows: Vec<Vec<String>> = outcome
            .diagnostics
            .unmatched_fields
            .iter()
            .map(|field| {
                vec![
                    field.unit.to_string(),
                    field.schema_id.clone(),
                    field.field.clone(),
                    field.aliases.join(", "),
                ]
            })
            .collect();
        table::print_table(&headers, &rows);
    }
}
