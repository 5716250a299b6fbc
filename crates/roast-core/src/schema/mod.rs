//! Static description of tables and columns
//!
//! A [`Schema`] maps table names to [`TableSchema`]s, which map column names
//! to [`ColumnSchema`]s. Declaration order is preserved for both, so
//! validation and defaulting visit columns in the order they were declared.

pub mod generators;
pub mod loader;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, RoastError};
use crate::model::Record;

pub use generators::GeneratorRegistry;

/// Scalar type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Number,
}

/// Default computed from the rows currently stored in the table
pub type DefaultFn = Arc<dyn Fn(&[Record]) -> Value + Send + Sync>;

/// How a missing column value is filled in
#[derive(Clone)]
pub enum ColumnDefault {
    /// A fixed value
    Static(Value),
    /// A value derived from the table's current rows
    Computed(DefaultFn),
}

impl ColumnDefault {
    /// Wrap a closure as a computed default
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&[Record]) -> Value + Send + Sync + 'static,
    {
        ColumnDefault::Computed(Arc::new(f))
    }

    /// `max(existing ids) + 1`, or `1` for an empty table
    pub fn auto_increment() -> Self {
        ColumnDefault::Computed(Arc::new(generators::auto_increment))
    }

    /// A fresh random UUIDv4 string
    pub fn uuid() -> Self {
        ColumnDefault::Computed(Arc::new(generators::uuid_v4))
    }

    /// Produce the default value for a table holding `rows`
    pub fn resolve(&self, rows: &[Record]) -> Value {
        match self {
            ColumnDefault::Static(value) => value.clone(),
            ColumnDefault::Computed(f) => f(rows),
        }
    }
}

impl fmt::Debug for ColumnDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnDefault::Static(value) => f.debug_tuple("Static").field(value).finish(),
            ColumnDefault::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Type, nullability and default of one column
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
}

impl ColumnSchema {
    /// A nullable column without default
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            nullable: true,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::new(ColumnType::String)
    }

    pub fn integer() -> Self {
        Self::new(ColumnType::Integer)
    }

    pub fn number() -> Self {
        Self::new(ColumnType::Number)
    }

    /// Reject nil values
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Shorthand for a static default
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        self.with_default(ColumnDefault::Static(value.into()))
    }
}

/// Ordered column schemas of one table
#[derive(Debug, Clone, Default)]
pub struct TableSchema {
    columns: IndexMap<String, ColumnSchema>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column, keeping its first declaration position
    pub fn column(mut self, name: impl Into<String>, column: ColumnSchema) -> Self {
        self.columns.insert(name.into(), column);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnSchema)> {
        self.columns.iter().map(|(name, col)| (name.as_str(), col))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Immutable description of every table a repo may touch
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: IndexMap<String, TableSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a table
    pub fn table(mut self, name: impl Into<String>, table: TableSchema) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    /// Look up a table's schema
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if the schema does not declare `name`.
    pub fn require_table(&self, name: &str) -> Result<&TableSchema> {
        self.tables
            .get(name)
            .ok_or_else(|| RoastError::UnknownTable {
                table: name.to_string(),
            })
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_builder_defaults_to_nullable() {
        let col = ColumnSchema::string();
        assert!(col.nullable);
        assert!(col.default.is_none());

        let col = ColumnSchema::integer().not_null().default_value(0);
        assert!(!col.nullable);
        assert!(matches!(col.default, Some(ColumnDefault::Static(ref v)) if *v == json!(0)));
    }

    #[test]
    fn test_table_preserves_declaration_order() {
        let table = TableSchema::new()
            .column("id", ColumnSchema::integer())
            .column("firstName", ColumnSchema::string())
            .column("age", ColumnSchema::integer());

        let names: Vec<&str> = table.columns().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["id", "firstName", "age"]);
    }

    #[test]
    fn test_require_table_unknown() {
        let schema = Schema::new().table("users", TableSchema::new());
        assert!(schema.require_table("users").is_ok());
        assert!(matches!(
            schema.require_table("others"),
            Err(RoastError::UnknownTable { ref table }) if table == "others"
        ));
    }

    #[test]
    fn test_computed_default_sees_rows() {
        let default = ColumnDefault::computed(|rows| json!(rows.len()));
        let row = json!({"id": 1}).as_object().cloned().unwrap();
        assert_eq!(default.resolve(&[row.clone(), row]), json!(2));
    }
}
