//! Snapshot diff computation engine.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::apply::apply;
use crate::diff::model::Change;
use crate::model::{id_key, record_id, Record};
use crate::snapshot::Snapshot;

/// Compute the minimal ordered change list turning `from` into `to`
///
/// For every row id in the union of both sides:
/// - only in `to` → `insert`
/// - only in `from` → `delete`
/// - in both but unequal → `set`
/// - in both and equal → nothing
///
/// Rows without an `id` cannot be addressed by a change and are skipped.
pub fn diff(from: &Snapshot, to: &Snapshot) -> Vec<Change> {
    let tables: IndexSet<&str> = from.table_names().chain(to.table_names()).collect();

    let mut changes = Vec::new();
    for table in tables {
        diff_table(table, from.rows(table), to.rows(table), &mut changes);
    }

    tracing::debug!(change_count = changes.len(), "computed snapshot diff");
    changes
}

/// Compute the changes that undo `changes` applied to `from`
///
/// Equivalent to `diff(apply(from, changes), from)`.
pub fn invert(from: &Snapshot, changes: &[Change]) -> Vec<Change> {
    let to = apply(from, changes);
    diff(&to, from)
}

fn diff_table(table: &str, from_rows: &[Record], to_rows: &[Record], out: &mut Vec<Change>) {
    let from_index = index_rows(table, from_rows);
    let to_index = index_rows(table, to_rows);

    for (key, (id, from_row)) in &from_index {
        match to_index.get(key) {
            None => out.push(Change::Delete {
                table: table.to_string(),
                id: (*id).clone(),
            }),
            Some((_, to_row)) if to_row != from_row => out.push(Change::Set {
                table: table.to_string(),
                id: (*id).clone(),
                record: (*to_row).clone(),
            }),
            Some(_) => {}
        }
    }

    for (key, (_, to_row)) in &to_index {
        if !from_index.contains_key(key) {
            out.push(Change::Insert {
                table: table.to_string(),
                record: (*to_row).clone(),
            });
        }
    }
}

/// Rows keyed by id, in row order; the first row wins on duplicate ids
fn index_rows<'a>(table: &str, rows: &'a [Record]) -> IndexMap<String, (&'a Value, &'a Record)> {
    let mut index = IndexMap::with_capacity(rows.len());
    for row in rows {
        match record_id(row) {
            Some(id) => {
                index.entry(id_key(id)).or_insert((id, row));
            }
            None => tracing::debug!(table, "skipping row without id"),
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_identical_snapshots_have_empty_diff() {
        let a = Snapshot::new().with_table("users", vec![row(json!({"id": 1}))]);
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn test_insert_delete_set() {
        let from = Snapshot::new().with_table(
            "users",
            vec![row(json!({"id": 1, "n": "a"})), row(json!({"id": 2, "n": "b"}))],
        );
        let to = Snapshot::new().with_table(
            "users",
            vec![row(json!({"id": 1, "n": "A"})), row(json!({"id": 3, "n": "c"}))],
        );

        let changes = diff(&from, &to);
        assert_eq!(
            changes,
            vec![
                Change::Set {
                    table: "users".to_string(),
                    id: json!(1),
                    record: row(json!({"id": 1, "n": "A"})),
                },
                Change::Delete {
                    table: "users".to_string(),
                    id: json!(2),
                },
                Change::Insert {
                    table: "users".to_string(),
                    record: row(json!({"id": 3, "n": "c"})),
                },
            ]
        );
    }

    #[test]
    fn test_tables_visited_from_first_then_to_only() {
        let from = Snapshot::new().with_table("users", vec![row(json!({"id": 1}))]);
        let to = Snapshot::new()
            .with_table("comments", vec![row(json!({"id": "c1"}))])
            .with_table("users", vec![row(json!({"id": 1, "n": "x"}))]);

        let changes = diff(&from, &to);
        let tables: Vec<&str> = changes.iter().map(Change::table).collect();
        assert_eq!(tables, vec!["users", "comments"]);
    }

    #[test]
    fn test_rows_without_id_are_skipped() {
        let from = Snapshot::new();
        let to = Snapshot::new().with_table("users", vec![row(json!({"n": "anonymous"}))]);
        assert!(diff(&from, &to).is_empty());
    }

    #[test]
    fn test_invert_restores_from() {
        let from = Snapshot::new().with_table("users", vec![row(json!({"id": 1, "n": "a"}))]);
        let to = Snapshot::new().with_table(
            "users",
            vec![row(json!({"id": 1, "n": "b"})), row(json!({"id": 2}))],
        );

        let forward = diff(&from, &to);
        let backward = invert(&from, &forward);
        assert_eq!(backward, diff(&to, &from));
        assert_eq!(apply(&apply(&from, &forward), &backward), from);
    }
}
