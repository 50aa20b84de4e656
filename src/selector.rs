//! Best-schema selection per unit and the acceptance threshold.

use log::debug;
use serde::Serialize;

use crate::{
    catalog::SchemaCatalog,
    matcher::{MatchScore, PreparedGrid, UnmatchedField, score_schema},
    source::UnitId,
};

/// Minimum proportion of schema fields a header row must match.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.7;

pub fn accepts(proportion: f64) -> bool {
    proportion >= ACCEPTANCE_THRESHOLD
}

/// A unit whose best schema cleared the threshold at a concrete header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedCandidate {
    pub schema_id: String,
    pub unit: UnitId,
    pub header_row: usize,
    pub proportion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    EmptyUnit,
    BelowThreshold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Accepted(AcceptedCandidate),
    Rejected {
        reason: RejectReason,
        best_schema: Option<String>,
        best_proportion: f64,
    },
}

/// Everything learned about one unit: every schema's score in catalog order,
/// the unmatched fields, and the verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitVerdict {
    pub unit: UnitId,
    pub scores: Vec<MatchScore>,
    pub unmatched: Vec<UnmatchedField>,
    pub selection: Selection,
}

impl UnitVerdict {
    pub fn accepted(&self) -> Option<&AcceptedCandidate> {
        match &self.selection {
            Selection::Accepted(candidate) => Some(candidate),
            Selection::Rejected { .. } => None,
        }
    }
}

/// Scores every schema of `catalog` against `grid` and keeps the best one.
/// Catalog order breaks ties.
pub fn select(unit: &UnitId, grid: &PreparedGrid, catalog: &SchemaCatalog) -> UnitVerdict {
    let mut scores = Vec::with_capacity(catalog.len());
    let mut unmatched = Vec::new();
    for schema in catalog {
        let report = score_schema(grid, schema, unit);
        debug!(
            "{}: schema '{}' matched {}/{} field(s) at row {:?}",
            unit,
            schema.id(),
            report.score.matched_fields,
            report.score.total_fields,
            report.score.best_row
        );
        scores.push(report.score);
        unmatched.extend(report.unmatched);
    }

    let mut best: Option<&MatchScore> = None;
    for score in &scores {
        if best.is_none_or(|current| score.proportion > current.proportion) {
            best = Some(score);
        }
    }

    let selection = match best {
        _ if grid.height() == 0 => Selection::Rejected {
            reason: RejectReason::EmptyUnit,
            best_schema: None,
            best_proportion: 0.0,
        },
        Some(score) => match score.best_row {
            Some(header_row) if accepts(score.proportion) => {
                Selection::Accepted(AcceptedCandidate {
                    schema_id: score.schema_id.clone(),
                    unit: unit.clone(),
                    header_row,
                    proportion: score.proportion,
                })
            }
            _ => Selection::Rejected {
                reason: RejectReason::BelowThreshold,
                best_schema: Some(score.schema_id.clone()),
                best_proportion: score.proportion,
            },
        },
        None => Selection::Rejected {
            reason: RejectReason::BelowThreshold,
            best_schema: None,
            best_proportion: 0.0,
        },
    };

    UnitVerdict {
        unit: unit.clone(),
        scores,
        unmatched,
        selection,
    }
}
