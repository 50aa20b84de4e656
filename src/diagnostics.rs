//! Structured record of what detection and extraction observed for a file.

use serde::Serialize;

use crate::{
    matcher::{MatchScore, UnmatchedField},
    selector::{RejectReason, Selection, UnitVerdict},
    source::UnitId,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedUnit {
    pub unit: UnitId,
    pub reason: RejectReason,
    pub best_schema: Option<String>,
    pub best_proportion: f64,
}

/// Header cells that had to be suffixed to become unique during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateColumn {
    pub unit: UnitId,
    pub schema_id: String,
    pub original: String,
    pub renamed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub scores: Vec<MatchScore>,
    pub rejected: Vec<RejectedUnit>,
    pub unmatched_fields: Vec<UnmatchedField>,
    pub duplicate_columns: Vec<DuplicateColumn>,
}

impl Diagnostics {
    /// Folds one unit's verdict in; call in unit order.
    pub fn record(&mut self, verdict: &UnitVerdict) {
        self.scores.extend(verdict.scores.iter().cloned());
        self.unmatched_fields.extend(verdict.unmatched.iter().cloned());
        if let Selection::Rejected {
            reason,
            best_schema,
            best_proportion,
        } = &verdict.selection
        {
            self.rejected.push(RejectedUnit {
                unit: verdict.unit.clone(),
                reason: *reason,
                best_schema: best_schema.clone(),
                best_proportion: *best_proportion,
            });
        }
    }

    pub fn scores_for<'a>(&'a self, unit: &'a UnitId) -> impl Iterator<Item = &'a MatchScore> + 'a {
        self.scores.iter().filter(move |score| &score.unit == unit)
    }
}
