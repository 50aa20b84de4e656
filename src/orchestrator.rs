//! Per-unit header scan over a whole source.
//!
//! Header windows are read one unit at a time because a reader needs
//! exclusive access to its file. Scoring is independent per unit and runs on
//! the rayon pool; results come back in unit order.

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    catalog::SchemaCatalog,
    diagnostics::Diagnostics,
    error::{IntakeError, Result},
    matcher::PreparedGrid,
    selector::{AcceptedCandidate, Selection, UnitVerdict, select},
    source::{TabularSource, UnitId},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanOutcome {
    /// Accepted units in source order.
    pub accepted: Vec<AcceptedCandidate>,
    pub diagnostics: Diagnostics,
}

/// Restricts the source's units to the requested sheet names, keeping source
/// order. An empty request selects every unit; sources without sheets ignore
/// the request.
pub fn resolve_units(source: &dyn TabularSource, requested: &[String]) -> Result<Vec<UnitId>> {
    let units = source.units();
    if requested.is_empty() || units.iter().all(|unit| unit.sheet_name().is_none()) {
        return Ok(units);
    }
    if let Some(missing) = requested
        .iter()
        .find(|name| !units.iter().any(|unit| unit.sheet_name() == Some(name.as_str())))
    {
        return Err(IntakeError::UnknownUnit {
            path: source.path().to_path_buf(),
            unit: missing.clone(),
        });
    }
    Ok(units
        .into_iter()
        .filter(|unit| {
            unit.sheet_name()
                .is_some_and(|name| requested.iter().any(|wanted| wanted == name))
        })
        .collect())
}

pub fn scan_source(
    source: &mut dyn TabularSource,
    catalog: &SchemaCatalog,
    units: &[UnitId],
    window_rows: usize,
) -> Result<ScanOutcome> {
    let mut windows = Vec::with_capacity(units.len());
    for unit in units {
        let grid = source.read_window(unit, window_rows)?;
        windows.push((unit, grid));
    }

    let verdicts: Vec<UnitVerdict> = windows
        .par_iter()
        .map(|(unit, grid)| select(unit, &PreparedGrid::new(grid), catalog))
        .collect();

    let mut outcome = ScanOutcome::default();
    for verdict in &verdicts {
        outcome.diagnostics.record(verdict);
        match &verdict.selection {
            Selection::Accepted(candidate) => {
                info!(
                    "{:?} [{}]: schema '{}' accepted at row {} ({:.0}% of fields)",
                    source.path(),
                    candidate.unit,
                    candidate.schema_id,
                    candidate.header_row,
                    candidate.proportion * 100.0
                );
                outcome.accepted.push(candidate.clone());
            }
            Selection::Rejected {
                reason,
                best_schema,
                best_proportion,
            } => warn!(
                "{:?} [{}]: no schema accepted ({:?}; best {} at {:.0}%)",
                source.path(),
                verdict.unit,
                reason,
                best_schema.as_deref().unwrap_or("-"),
                best_proportion * 100.0
            ),
        }
    }
    Ok(outcome)
}
