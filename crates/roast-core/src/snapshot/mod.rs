//! Immutable whole-database values
//!
//! A [`Snapshot`] maps table names to ordered row sequences. Each table's rows
//! sit behind an `Arc`, so deriving a new snapshot copies only the tables it
//! touches and earlier snapshots stay valid for diffing.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{id_key, record_id, Record};

/// Table name to ordered rows; absent tables read as empty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    tables: IndexMap<String, Arc<Vec<Record>>>,
}

impl Snapshot {
    /// An empty snapshot (no tables written yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this snapshot with `table` replaced by `rows`
    pub fn with_table(&self, table: impl Into<String>, rows: Vec<Record>) -> Self {
        let mut next = self.clone();
        next.tables.insert(table.into(), Arc::new(rows));
        next
    }

    /// Rows of `table`, in order; empty if the table was never written
    pub fn rows(&self, table: &str) -> &[Record] {
        self.tables
            .get(table)
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }

    /// Find the row whose `id` equals `id`
    pub fn find(&self, table: &str, id: &Value) -> Option<&Record> {
        self.rows(table)
            .iter()
            .find(|row| record_id(row) == Some(id))
    }

    /// True if `table` has been written (even if it is now empty)
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Table names in first-write order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Total number of rows across all tables
    pub fn row_count(&self) -> usize {
        self.tables.values().map(|rows| rows.len()).sum()
    }

    /// True if no table holds any row
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Mutable rows of `table`, creating it and unsharing it as needed
    pub(crate) fn rows_mut(&mut self, table: &str) -> &mut Vec<Record> {
        let rows = self.tables.entry(table.to_string()).or_default();
        Arc::make_mut(rows)
    }

    /// Position of the row with `id` in `table`
    pub(crate) fn position(&self, table: &str, id: &Value) -> Option<usize> {
        self.rows(table)
            .iter()
            .position(|row| record_id(row) == Some(id))
    }

    /// True if both snapshots share the same row storage for `table`
    pub fn shares_table_with(&self, other: &Snapshot, table: &str) -> bool {
        match (self.tables.get(table), other.tables.get(table)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Structural equality
///
/// Absent tables equal empty ones. Rows are matched by id, so two tables with
/// the same records in a different order are equal.
impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.table_names()
            .chain(other.table_names())
            .all(|table| rows_eq(self.rows(table), other.rows(table)))
    }
}

fn rows_eq(a: &[Record], b: &[Record]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let by_id: HashMap<String, &Record> = b
        .iter()
        .filter_map(|row| record_id(row).map(|id| (id_key(id), row)))
        .collect();

    a.iter().all(|row| match record_id(row) {
        Some(id) => by_id.get(&id_key(id)) == Some(&row),
        None => b.contains(row),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_absent_table_reads_empty() {
        let snapshot = Snapshot::new();
        assert!(snapshot.rows("users").is_empty());
        assert!(!snapshot.has_table("users"));
    }

    #[test]
    fn test_absent_equals_empty() {
        let empty = Snapshot::new();
        let written = Snapshot::new().with_table("users", Vec::new());
        assert_eq!(empty, written);
    }

    #[test]
    fn test_row_order_is_not_significant() {
        let a = Snapshot::new().with_table(
            "users",
            vec![row(json!({"id": 1, "n": "a"})), row(json!({"id": 2, "n": "b"}))],
        );
        let b = Snapshot::new().with_table(
            "users",
            vec![row(json!({"id": 2, "n": "b"})), row(json!({"id": 1, "n": "a"}))],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_values_are_unequal() {
        let a = Snapshot::new().with_table("users", vec![row(json!({"id": 1, "n": "a"}))]);
        let b = Snapshot::new().with_table("users", vec![row(json!({"id": 1, "n": "z"}))]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_with_table_leaves_original_untouched() {
        let a = Snapshot::new().with_table("users", vec![row(json!({"id": 1}))]);
        let b = a.with_table("comments", vec![row(json!({"id": "c"}))]);

        assert!(a.rows("comments").is_empty());
        assert_eq!(b.rows("comments").len(), 1);
        assert!(a.shares_table_with(&b, "users"));
    }

    #[test]
    fn test_find_by_id() {
        let snapshot = Snapshot::new().with_table(
            "users",
            vec![row(json!({"id": 1, "n": "a"})), row(json!({"id": 2, "n": "b"}))],
        );
        assert_eq!(
            snapshot.find("users", &json!(2)).and_then(|r| r.get("n")),
            Some(&json!("b"))
        );
        assert!(snapshot.find("users", &json!(3)).is_none());
    }

    #[test]
    fn test_serializes_as_object_of_arrays() {
        let snapshot = Snapshot::new().with_table("users", vec![row(json!({"id": 1}))]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json, json!({"users": [{"id": 1}]}));

        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
