//! Functional-boundary apply function
//!
//! [`apply`] folds a change list over a snapshot and returns the resulting
//! snapshot. The input snapshot is never modified.
//!
//! ## Totality Contract
//!
//! - **Never fails**: apply returns a snapshot for every input
//! - **No validation**: changes are trusted; schema checks happened when the
//!   change was produced
//! - **Missing targets are no-ops**: `delete`/`set` of an absent id change
//!   nothing
//! - **Sequential**: later changes observe the effects of earlier ones
//!
//! ## Example
//!
//! ```
//! use roast_core::{apply, Change, Snapshot};
//! use serde_json::json;
//!
//! let record = json!({"id": 1, "firstName": "Mitch"}).as_object().cloned().unwrap();
//! let changes = vec![Change::Insert { table: "users".to_string(), record }];
//!
//! let next = apply(&Snapshot::new(), &changes);
//! assert_eq!(next.rows("users").len(), 1);
//! ```

use crate::diff::model::Change;
use crate::snapshot::Snapshot;

/// Apply `changes` in order to a copy of `snapshot`
pub fn apply(snapshot: &Snapshot, changes: &[Change]) -> Snapshot {
    let mut next = snapshot.clone();
    for change in changes {
        apply_change(&mut next, change);
    }
    next
}

/// Apply one change in place
///
/// Only the touched table is copied; other tables keep sharing storage with
/// the snapshots they came from.
pub fn apply_change(snapshot: &mut Snapshot, change: &Change) {
    match change {
        Change::Insert { table, record } => {
            snapshot.rows_mut(table).push(record.clone());
        }

        Change::Delete { table, id } => {
            if let Some(pos) = snapshot.position(table, id) {
                snapshot.rows_mut(table).remove(pos);
            } else {
                tracing::debug!(table = %table, %id, "delete of absent row ignored");
            }
        }

        Change::Set { table, id, record } => {
            if let Some(pos) = snapshot.position(table, id) {
                snapshot.rows_mut(table)[pos] = record.clone();
            } else {
                tracing::debug!(table = %table, %id, "set of absent row ignored");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn row(value: Value) -> crate::model::Record {
        value.as_object().cloned().unwrap()
    }

    fn users(rows: Vec<Value>) -> Snapshot {
        Snapshot::new().with_table("users", rows.into_iter().map(row).collect())
    }

    #[test]
    fn test_insert_creates_table() {
        let next = apply(
            &Snapshot::new(),
            &[Change::Insert {
                table: "users".to_string(),
                record: row(json!({"id": 1})),
            }],
        );
        assert!(next.has_table("users"));
        assert_eq!(next.rows("users"), &[row(json!({"id": 1}))]);
    }

    #[test]
    fn test_set_preserves_position() {
        let start = users(vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
        let next = apply(
            &start,
            &[Change::Set {
                table: "users".to_string(),
                id: json!(2),
                record: row(json!({"id": 2, "n": "new"})),
            }],
        );
        assert_eq!(next.rows("users")[1], row(json!({"id": 2, "n": "new"})));
        assert_eq!(next.rows("users").len(), 3);
    }

    #[test]
    fn test_delete_and_set_of_absent_rows_are_noops() {
        let start = users(vec![json!({"id": 1})]);
        let next = apply(
            &start,
            &[
                Change::Delete {
                    table: "users".to_string(),
                    id: json!(9),
                },
                Change::Set {
                    table: "ghosts".to_string(),
                    id: json!(1),
                    record: row(json!({"id": 1})),
                },
            ],
        );
        assert_eq!(next, start);
        assert!(!next.has_table("ghosts"));
    }

    #[test]
    fn test_later_changes_observe_earlier_ones() {
        let next = apply(
            &Snapshot::new(),
            &[
                Change::Insert {
                    table: "users".to_string(),
                    record: row(json!({"id": 1, "n": "a"})),
                },
                Change::Set {
                    table: "users".to_string(),
                    id: json!(1),
                    record: row(json!({"id": 1, "n": "b"})),
                },
                Change::Delete {
                    table: "users".to_string(),
                    id: json!(1),
                },
            ],
        );
        assert!(next.rows("users").is_empty());
    }

    #[test]
    fn test_input_snapshot_is_untouched() {
        let start = users(vec![json!({"id": 1})]);
        let _ = apply(
            &start,
            &[Change::Delete {
                table: "users".to_string(),
                id: json!(1),
            }],
        );
        assert_eq!(start.rows("users").len(), 1);
    }
}
