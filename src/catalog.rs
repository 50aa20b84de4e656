//! Schema definitions and the catalog they are selected from.
//!
//! A [`SchemaDefinition`] maps canonical field names to the raw alias strings
//! that may appear in a source header. The [`SchemaCatalog`] is the ordered,
//! read-only set of definitions a file is scored against; its order is the
//! tie-break order when two schemas score the same.
//!
//! Catalogs are usually loaded from YAML:
//!
//! ```yaml
//! sample1:
//!   columns:
//!     idx: [Index]
//!     org_id: [Organization Id]
//!     employees: Number of employees
//! ```

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
};

use serde::Serialize;
use serde_yaml::Value;

use crate::{
    error::{IntakeError, Result},
    extract::{DATA_SOURCE_COLUMN, ROW_DATA_COLUMN},
    normalize::normalize_text,
};

/// Reserved canonical name for columns that must be recognised but dropped.
pub const IGNORE_FIELD: &str = "_ignore_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    canonical: String,
    aliases: Vec<String>,
}

impl FieldSpec {
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn is_ignored(&self) -> bool {
        self.canonical == IGNORE_FIELD
    }

    /// Aliases in normalized form, duplicates removed, order kept.
    pub fn normalized_aliases(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.aliases
            .iter()
            .map(normalize_text)
            .filter(|alias| seen.insert(alias.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDefinition {
    id: String,
    fields: Vec<FieldSpec>,
}

impl SchemaDefinition {
    /// Builds a validated definition from `(canonical, aliases)` pairs.
    pub fn new<I, C, A, S>(id: impl Into<String>, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, A)>,
        C: Into<String>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        let invalid = |reason: String| IntakeError::InvalidSchema {
            schema: id.clone(),
            reason,
        };
        if id.trim().is_empty() {
            return Err(invalid("schema id cannot be empty".to_string()));
        }

        let mut canonical_names = HashSet::new();
        let mut specs = Vec::new();
        for (canonical, aliases) in fields {
            let canonical = canonical.into();
            if canonical.trim().is_empty() {
                return Err(invalid("canonical field names cannot be empty".to_string()));
            }
            if [ROW_DATA_COLUMN, DATA_SOURCE_COLUMN].contains(&canonical.as_str()) {
                return Err(invalid(format!("field name '{canonical}' is reserved for output metadata")));
            }
            if !canonical_names.insert(canonical.clone()) {
                return Err(invalid(format!("field '{canonical}' is defined twice")));
            }
            let aliases = aliases.into_iter().map(Into::into).collect::<Vec<String>>();
            if aliases.is_empty() {
                return Err(invalid(format!("field '{canonical}' has no aliases")));
            }
            if let Some(blank) = aliases.iter().find(|alias| normalize_text(alias.as_str()).is_empty()) {
                return Err(invalid(format!(
                    "field '{canonical}' has alias {blank:?}, which is blank once normalized"
                )));
            }
            specs.push(FieldSpec { canonical, aliases });
        }
        if specs.is_empty() {
            return Err(invalid("a schema needs at least one field".to_string()));
        }

        Ok(Self { id, fields: specs })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Normalized alias → canonical name. When two fields list the same
    /// alias, the field declared first keeps it.
    pub fn alias_lookup(&self) -> HashMap<String, &str> {
        let mut lookup = HashMap::new();
        for field in &self.fields {
            for alias in field.normalized_aliases() {
                lookup.entry(alias).or_insert(field.canonical.as_str());
            }
        }
        lookup
    }
}

/// Ordered set of schema definitions with unique ids.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaCatalog {
    schemas: Vec<SchemaDefinition>,
}

impl SchemaCatalog {
    pub fn new(schemas: Vec<SchemaDefinition>) -> Result<Self> {
        let mut ids = HashSet::new();
        for schema in &schemas {
            if !ids.insert(schema.id.as_str()) {
                return Err(IntakeError::InvalidSchema {
                    schema: schema.id.clone(),
                    reason: "schema id is not unique within the catalog".to_string(),
                });
            }
        }
        Ok(Self { schemas })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| IntakeError::Catalog {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_yaml_str(&raw).map_err(|err| match err {
            IntakeError::Catalog { message, .. } => IntakeError::Catalog {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parses a YAML catalog; document order is catalog order.
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let malformed = |message: String| IntakeError::Catalog {
            path: "<inline>".into(),
            message,
        };
        let document: Value = serde_yaml::from_str(input).map_err(|err| malformed(err.to_string()))?;
        let mapping = document
            .as_mapping()
            .ok_or_else(|| malformed("top level must map schema ids to definitions".to_string()))?;

        let mut schemas = Vec::with_capacity(mapping.len());
        for (id, body) in mapping {
            let id = scalar_to_string(id)
                .ok_or_else(|| malformed("schema ids must be scalars".to_string()))?;
            let columns = body
                .get("columns")
                .and_then(Value::as_mapping)
                .ok_or_else(|| malformed(format!("schema '{id}' has no 'columns' mapping")))?;
            let mut fields = Vec::with_capacity(columns.len());
            for (canonical, aliases) in columns {
                let canonical = scalar_to_string(canonical).ok_or_else(|| {
                    malformed(format!("schema '{id}' has a non-scalar field name"))
                })?;
                let aliases = match aliases {
                    Value::Sequence(items) => items
                        .iter()
                        .map(scalar_to_string)
                        .collect::<Option<Vec<_>>>(),
                    other => scalar_to_string(other).map(|alias| vec![alias]),
                }
                .ok_or_else(|| {
                    malformed(format!(
                        "aliases of '{canonical}' in schema '{id}' must be scalars"
                    ))
                })?;
                fields.push((canonical, aliases));
            }
            schemas.push(SchemaDefinition::new(id, fields)?);
        }
        Self::new(schemas)
    }

    pub fn get(&self, id: &str) -> Option<&SchemaDefinition> {
        self.schemas.iter().find(|schema| schema.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SchemaDefinition> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl<'a> IntoIterator for &'a SchemaCatalog {
    type Item = &'a SchemaDefinition;
    type IntoIter = std::slice::Iter<'a, SchemaDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
