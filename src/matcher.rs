//! Scoring of a raw grid against one schema definition.
//!
//! Every row of the header window is treated as a candidate header. A schema
//! field is *present* in a row when any cell of that row equals any of the
//! field's aliases after normalization. The row with the most present fields
//! is the best header candidate for that schema.

use std::collections::HashSet;

use serde::Serialize;

use crate::{catalog::SchemaDefinition, grid::RawGrid, source::UnitId};

/// Result of scoring one schema against one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScore {
    pub schema_id: String,
    pub unit: UnitId,
    /// Zero-based row of the best header candidate; `None` for an empty unit.
    pub best_row: Option<usize>,
    pub matched_fields: usize,
    pub total_fields: usize,
    /// `matched_fields / total_fields` at `best_row`, always within `[0, 1]`.
    pub proportion: f64,
}

/// Schema field that did not match a single cell anywhere in the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedField {
    pub schema_id: String,
    pub unit: UnitId,
    pub field: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    pub score: MatchScore,
    pub unmatched: Vec<UnmatchedField>,
}

/// Header window prepared once per unit and shared by every schema.
#[derive(Debug, Clone, Default)]
pub struct PreparedGrid {
    rows: Vec<HashSet<String>>,
}

impl PreparedGrid {
    pub fn new(grid: &RawGrid) -> Self {
        let rows = grid
            .header_candidates()
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    fn row_contains_any(&self, row: usize, aliases: &[String]) -> bool {
        aliases.iter().any(|alias| self.rows[row].contains(alias))
    }
}

pub fn score_schema(grid: &PreparedGrid, schema: &SchemaDefinition, unit: &UnitId) -> MatchReport {
    let mut present = vec![0usize; grid.height()];
    let mut unmatched = Vec::new();

    for field in schema.fields() {
        let aliases = field.normalized_aliases();
        let mut matched_anywhere = false;
        for (row, count) in present.iter_mut().enumerate() {
            if grid.row_contains_any(row, &aliases) {
                *count += 1;
                matched_anywhere = true;
            }
        }
        if !matched_anywhere {
            unmatched.push(UnmatchedField {
                schema_id: schema.id().to_string(),
                unit: unit.clone(),
                field: field.canonical().to_string(),
                aliases,
            });
        }
    }

    // First occurrence of the maximum wins.
    let mut best: Option<(usize, usize)> = None;
    for (row, &count) in present.iter().enumerate() {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((row, count));
        }
    }

    let total_fields = schema.field_count();
    let matched_fields = best.map(|(_, count)| count).unwrap_or(0);
    let proportion = if total_fields == 0 {
        0.0
    } else {
        matched_fields as f64 / total_fields as f64
    };

    MatchReport {
        score: MatchScore {
            schema_id: schema.id().to_string(),
            unit: unit.clone(),
            best_row: best.map(|(row, _)| row),
            matched_fields,
            total_fields,
            proportion,
        },
        unmatched,
    }
}
