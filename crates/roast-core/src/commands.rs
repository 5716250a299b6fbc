//! Command types for record writes
//!
//! A command is the caller's intent; the repo turns it into exactly one
//! [`Change`](crate::diff::Change) after defaulting and validation.

use serde_json::Value;

use crate::model::Record;

/// A write against one table
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert a new record; missing columns are defaulted
    Insert { table: String, record: Record },

    /// Shallow-merge `values` over the row with `id`
    Update {
        table: String,
        id: Value,
        values: Record,
    },

    /// Remove the row with `id`
    Delete { table: String, id: Value },
}

impl Command {
    pub fn table(&self) -> &str {
        match self {
            Command::Insert { table, .. }
            | Command::Update { table, .. }
            | Command::Delete { table, .. } => table,
        }
    }

    /// Operation name used in log events
    pub fn op(&self) -> &'static str {
        match self {
            Command::Insert { .. } => "insert",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
        }
    }
}
