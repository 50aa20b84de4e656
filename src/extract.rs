//! Extraction of an accepted unit into a canonical output table.
//!
//! The unit is re-read from its detected header row to the end. Columns whose
//! normalized header is a known alias are kept and renamed to their canonical
//! field; everything else survives only inside the per-row `row_data` backup.

use std::path::Path;

use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    catalog::{IGNORE_FIELD, SchemaDefinition},
    diagnostics::DuplicateColumn,
    error::Result,
    names, normalize,
    selector::AcceptedCandidate,
    source::{TabularSource, UnitId},
};

pub const ROW_DATA_COLUMN: &str = "row_data";
pub const DATA_SOURCE_COLUMN: &str = "data_source";

/// Column-named string table. Every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|cells| cells[index].as_str())
    }

    /// Parses the `row_data` backup of `row`.
    pub fn row_data(&self, row: usize) -> Option<Map<String, Value>> {
        match serde_json::from_str(self.value(row, ROW_DATA_COLUMN)?) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// One accepted unit turned into a table, or the single no-match element
/// (`schema_id` and `unit` both `None`, empty table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub schema_id: Option<String>,
    pub unit: Option<UnitId>,
    pub table: OutputTable,
}

impl ExtractionResult {
    pub fn no_match() -> Self {
        Self {
            schema_id: None,
            unit: None,
            table: OutputTable::default(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.schema_id.is_some()
    }
}

/// Re-reads `candidate.unit` from its header row and builds the output table.
pub fn extract(
    source: &mut dyn TabularSource,
    candidate: &AcceptedCandidate,
    schema: &SchemaDefinition,
) -> Result<(ExtractionResult, Vec<DuplicateColumn>)> {
    let grid = source.read_rows(&candidate.unit, candidate.header_row, None)?;
    let (table, duplicates) = build_table(source.path(), &candidate.unit, schema, grid.into_rows());
    info!(
        "{:?} [{}]: extracted {} row(s) x {} column(s) as '{}'",
        source.path(),
        candidate.unit,
        table.len(),
        table.columns().len(),
        schema.id()
    );
    Ok((
        ExtractionResult {
            schema_id: Some(schema.id().to_string()),
            unit: Some(candidate.unit.clone()),
            table,
        },
        duplicates,
    ))
}

/// Builds the output table from `rows`, whose first row is the header.
/// Rows whose cells are all empty are skipped.
pub fn build_table(
    path: &Path,
    unit: &UnitId,
    schema: &SchemaDefinition,
    rows: Vec<Vec<String>>,
) -> (OutputTable, Vec<DuplicateColumn>) {
    let mut rows = rows.into_iter();
    let raw_header = rows.next().unwrap_or_default();
    let width = raw_header.len();

    let header = names::disambiguate(&raw_header);
    let normalized = normalize::normalize_row(&header);
    let backup_keys = names::unique_names(&normalized);

    let lookup = schema.alias_lookup();
    let kept: Vec<(usize, &str)> = normalized
        .iter()
        .enumerate()
        .filter_map(|(index, name)| lookup.get(name).map(|canonical| (index, *canonical)))
        .filter(|(_, canonical)| *canonical != IGNORE_FIELD)
        .collect();
    let canonical: Vec<&str> = kept.iter().map(|(_, name)| *name).collect();
    let columns = names::unique_names(
        &canonical
            .iter()
            .copied()
            .chain([ROW_DATA_COLUMN, DATA_SOURCE_COLUMN])
            .collect::<Vec<_>>(),
    );

    let mut duplicates = duplicate_columns(unit, schema.id(), &raw_header, &header);
    duplicates.extend(duplicate_columns(
        unit,
        schema.id(),
        &canonical,
        &columns[..canonical.len()],
    ));
    for duplicate in &duplicates {
        debug!("{unit}: column '{}' renamed to {:?}", duplicate.original, duplicate.renamed);
    }

    let data_source = format!("{}|{}|{}", path.display(), unit, schema.id());

    let mut table_rows = Vec::new();
    for mut row in rows {
        row.resize(width, String::new());
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let backup: Map<String, Value> = backup_keys
            .iter()
            .cloned()
            .zip(row.iter().cloned().map(Value::String))
            .collect();
        let mut cells: Vec<String> = kept.iter().map(|(index, _)| row[*index].clone()).collect();
        cells.push(Value::Object(backup).to_string());
        cells.push(data_source.clone());
        table_rows.push(cells);
    }

    (
        OutputTable {
            columns,
            rows: table_rows,
        },
        duplicates,
    )
}

fn duplicate_columns<S: AsRef<str>>(
    unit: &UnitId,
    schema_id: &str,
    original: &[S],
    renamed: &[String],
) -> Vec<DuplicateColumn> {
    names::duplicated_values(original)
        .into_iter()
        .map(|value| DuplicateColumn {
            unit: unit.clone(),
            schema_id: schema_id.to_string(),
            renamed: original
                .iter()
                .zip(renamed)
                .filter(|(name, _)| AsRef::<str>::as_ref(*name) == value)
                .map(|(_, new_name)| new_name.clone())
                .collect(),
            original: value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::tests::{sample_catalog, three_sheet_source};

    fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn unit() -> UnitId {
        UnitId::Sheet("Orgs".to_string())
    }

    #[test]
    fn matched_columns_are_renamed_and_the_rest_are_pruned() {
        let catalog = sample_catalog();
        let schema = catalog.get("sample1").unwrap();
        let (table, duplicates) = build_table(
            Path::new("in/orgs.xlsx"),
            &unit(),
            schema,
            rows(&[
                &["INDEX", "Website", "Name", "País", "Number of\\nemployees"],
                &["1", "acme.io", "Acme", "BR", "10"],
            ]),
        );
        assert_eq!(
            table.columns(),
            ["idx", "name", "country", "employees", ROW_DATA_COLUMN, DATA_SOURCE_COLUMN]
        );
        assert_eq!(table.value(0, "idx"), Some("1"));
        assert_eq!(table.value(0, "employees"), Some("10"));
        assert_eq!(table.column_index("website"), None);
        assert_eq!(table.value(0, DATA_SOURCE_COLUMN), Some("in/orgs.xlsx|Orgs|sample1"));
        assert!(duplicates.is_empty());
    }

    #[test]
    fn row_data_keeps_every_cell_in_header_order() {
        let catalog = sample_catalog();
        let schema = catalog.get("sample1").unwrap();
        let (table, _) = build_table(
            Path::new("orgs.csv"),
            &unit(),
            schema,
            rows(&[&["Index", "Website", "Name"], &["1", "acme.io"]]),
        );
        let backup = table.row_data(0).expect("row_data object");
        let keys: Vec<_> = backup.keys().cloned().collect();
        assert_eq!(keys, vec!["index", "website", "name"]);
        assert_eq!(backup["website"], "acme.io");
        assert_eq!(backup["name"], "");
    }

    #[test]
    fn ignored_fields_are_dropped_and_colliding_names_suffixed() {
        let schema = SchemaDefinition::new(
            "contacts",
            vec![
                ("phone", vec!["Phone", "Mobile"]),
                ("_ignore_", vec!["Notes"]),
            ],
        )
        .unwrap();
        let (table, duplicates) = build_table(
            Path::new("c.csv"),
            &unit(),
            &schema,
            rows(&[&["Phone", "Notes", "Mobile"], &["1", "n", "2"]]),
        );
        assert_eq!(table.columns(), ["phone(0)", "phone(1)", ROW_DATA_COLUMN, DATA_SOURCE_COLUMN]);
        assert_eq!(table.value(0, "phone(1)"), Some("2"));
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].original, "phone");
        assert_eq!(duplicates[0].renamed, vec!["phone(0)", "phone(1)"]);
    }

    #[test]
    fn row_data_keeps_cells_whose_suffixed_names_collide() {
        let catalog = sample_catalog();
        let schema = catalog.get("sample1").unwrap();
        let header = ["Index", "a", "a", "a(0)", "a(0)(0)"];
        let (table, _) = build_table(
            Path::new("a.csv"),
            &unit(),
            schema,
            rows(&[&header, &["1", "v1", "v2", "v3", "v4"]]),
        );
        let backup = table.row_data(0).unwrap();
        assert_eq!(backup.len(), header.len());
        let values: Vec<_> = backup.values().filter_map(Value::as_str).collect();
        assert_eq!(values, vec!["1", "v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn canonical_names_that_collide_after_suffixing_stay_distinct() {
        let schema = SchemaDefinition::new(
            "contacts",
            vec![("phone", vec!["Phone", "Mobile"]), ("phone(0)", vec!["Landline"])],
        )
        .unwrap();
        let (table, _) = build_table(
            Path::new("c.csv"),
            &unit(),
            &schema,
            rows(&[&["Phone", "Mobile", "Landline"], &["1", "2", "3"]]),
        );
        assert_eq!(
            table.columns(),
            ["phone(0)(0)", "phone(1)", "phone(0)(1)", ROW_DATA_COLUMN, DATA_SOURCE_COLUMN]
        );
        assert_eq!(table.value(0, "phone(1)"), Some("2"));
        assert_eq!(table.value(0, "phone(0)(1)"), Some("3"));
    }

    #[test]
    fn duplicated_headers_map_through_suffixed_aliases() {
        let schema = SchemaDefinition::new(
            "sample1_with_duplicated",
            vec![
                ("idx", vec!["Index"]),
                ("employees", vec!["Number of employees(1)"]),
            ],
        )
        .unwrap();
        let (table, duplicates) = build_table(
            Path::new("d.csv"),
            &unit(),
            &schema,
            rows(&[
                &["Index", "Number of employees", "Number of employees"],
                &["1", "10", "12"],
            ]),
        );
        assert_eq!(table.columns()[..2], ["idx", "employees"]);
        assert_eq!(table.value(0, "employees"), Some("12"));
        assert_eq!(duplicates[0].original, "Number of employees");
        let backup = table.row_data(0).unwrap();
        assert!(backup.contains_key("number of employees(0)"));
    }

    #[test]
    fn blank_rows_are_skipped_and_long_rows_truncated() {
        let catalog = sample_catalog();
        let schema = catalog.get("sample1").unwrap();
        let (table, _) = build_table(
            Path::new("x.csv"),
            &unit(),
            schema,
            rows(&[&["Index", "Name"], &["", ""], &["2", "B", "overflow"]]),
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "name"), Some("B"));
        assert_eq!(table.row_data(0).unwrap().len(), 2);
    }

    #[test]
    fn extract_reads_from_the_header_row() {
        let mut source = three_sheet_source();
        let catalog = sample_catalog();
        let candidate = AcceptedCandidate {
            schema_id: "sample1".to_string(),
            unit: UnitId::Sheet("Orgs".into()),
            header_row: 1,
            proportion: 1.0,
        };
        let (result, _) = extract(&mut source, &candidate, catalog.get("sample1").unwrap()).unwrap();
        assert!(result.is_match());
        assert_eq!(result.table.len(), 1);
        assert_eq!(result.table.value(0, "name"), Some("Acme"));
        assert_eq!(
            result.table.value(0, DATA_SOURCE_COLUMN),
            Some("memory.xlsx|Orgs|sample1")
        );
    }
}
