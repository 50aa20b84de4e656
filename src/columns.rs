//! Schema listing from a catalog file.
//!
//! Renders every schema's canonical fields with their raw and normalized
//! aliases as an ASCII table.

use anyhow::{Context, Result};
use log::info;

use crate::{catalog::SchemaCatalog, cli::SchemasArgs, table};

pub fn execute(args: &SchemasArgs) -> Result<()> {
    let catalog = SchemaCatalog::load(&args.schemas)
        .with_context(|| format!("Loading schema catalog {schemas:?}", schemas = args.schemas))?;

    if catalog.is_empty() {
        info!("Catalog {:?} does not define any schemas", args.schemas);
        return Ok(());
    }

    let mut rows = Vec::new();
    for schema in &catalog {
        for (idx, field) in schema.fields().iter().enumerate() {
            let schema_id = if idx == 0 {
                schema.id().to_string()
            } else {
                String::new()
            };
            let canonical = if field.is_ignored() {
                format!("{} (dropped)", field.canonical())
            } else {
                field.canonical().to_string()
            };
            rows.push(vec![
                schema_id,
                canonical,
                field.aliases().join(", "),
                field.normalized_aliases().join(", "),
            ]);
        }
    }

    let headers = vec![
        "schema".to_string(),
        "field".to_string(),
        "aliases".to_string(),
        "normalized".to_string(),
    ];
    table::print_table(&headers, &rows);
    info!("Listed {} schema(s) from {:?}", catalog.len(), args.schemas);
    Ok(())
}
