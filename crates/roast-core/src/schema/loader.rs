//! Schema definitions in their JSON form
//!
//! ```json
//! {
//!   "users": {
//!     "id":        { "type": "integer", "nullable": false, "default": { "generator": "auto_increment" } },
//!     "firstName": { "type": "string", "nullable": false },
//!     "age":       { "type": "integer", "default": 0 }
//!   }
//! }
//! ```
//!
//! `null` is accepted as an alias of `nullable`. A `default` is either a
//! scalar or `{ "generator": "<name>" }` resolved through a
//! [`GeneratorRegistry`].

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::{ColumnDefault, ColumnSchema, ColumnType, GeneratorRegistry, Schema, TableSchema};
use crate::errors::{Result, RoastError};

/// Column definition as written in JSON
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, alias = "null")]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub default: Option<DefaultDef>,
}

/// A default as written in JSON
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DefaultDef {
    Generator { generator: String },
    Static(Value),
}

/// Whole schema definition: table name to column name to column definition
pub type SchemaDef = IndexMap<String, IndexMap<String, ColumnDef>>;

impl Schema {
    /// Parse a JSON schema definition, keeping document order
    ///
    /// # Errors
    ///
    /// - `Serialization` if the text is not a valid definition
    /// - `InvalidSchema` for unknown generators or non-scalar static defaults
    pub fn from_json_str(json: &str, registry: &GeneratorRegistry) -> Result<Self> {
        let def: SchemaDef = serde_json::from_str(json)?;
        Self::from_def(def, registry)
    }

    /// Build a schema from an already-parsed definition
    ///
    /// # Errors
    ///
    /// `InvalidSchema` for unknown generators or non-scalar static defaults.
    pub fn from_def(def: SchemaDef, registry: &GeneratorRegistry) -> Result<Self> {
        let mut schema = Schema::new();
        for (table_name, columns) in def {
            let mut table = TableSchema::new();
            for (column_name, column_def) in columns {
                let column = column_from_def(&table_name, &column_name, column_def, registry)?;
                table = table.column(column_name, column);
            }
            tracing::debug!(table = %table_name, columns = table.len(), "loaded table schema");
            schema = schema.table(table_name, table);
        }
        Ok(schema)
    }
}

fn column_from_def(
    table: &str,
    column: &str,
    def: ColumnDef,
    registry: &GeneratorRegistry,
) -> Result<ColumnSchema> {
    let default = match def.default {
        None | Some(DefaultDef::Static(Value::Null)) => None,
        Some(DefaultDef::Static(value @ (Value::Array(_) | Value::Object(_)))) => {
            return Err(RoastError::InvalidSchema {
                reason: format!(
                    "default for '{}.{}' must be a scalar, got {}",
                    table, column, value
                ),
            });
        }
        Some(DefaultDef::Static(value)) => Some(ColumnDefault::Static(value)),
        Some(DefaultDef::Generator { generator }) => {
            let f = registry
                .get(&generator)
                .ok_or_else(|| RoastError::InvalidSchema {
                    reason: format!(
                        "unknown default generator '{}' for '{}.{}'",
                        generator, table, column
                    ),
                })?;
            Some(ColumnDefault::Computed(f))
        }
    };

    Ok(ColumnSchema {
        column_type: def.column_type,
        nullable: def.nullable.unwrap_or(true),
        default,
    })
}
