//! Change and transaction types.
//!
//! `Change` serializes to the wire shape
//! `{ "action": "insert"|"delete"|"set", "table": .., "id"?: .., "record"?: .. }`.

use roast_core_types::TransactionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Record;
use crate::snapshot::Snapshot;

/// One edit to a single table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Change {
    /// Append `record` to `table`
    Insert { table: String, record: Record },
    /// Remove the row with `id` from `table`
    Delete { table: String, id: Value },
    /// Replace the row with `id` by `record`, keeping its position
    Set {
        table: String,
        id: Value,
        record: Record,
    },
}

impl Change {
    /// The table this change targets
    pub fn table(&self) -> &str {
        match self {
            Change::Insert { table, .. } | Change::Delete { table, .. } | Change::Set { table, .. } => {
                table
            }
        }
    }

    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            Change::Insert { .. } => "insert",
            Change::Delete { .. } => "delete",
            Change::Set { .. } => "set",
        }
    }
}

/// An identified, ordered batch of changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub changes: Vec<Change>,
}

impl Transaction {
    /// Wrap `changes` with a fresh id
    pub fn new(changes: Vec<Change>) -> Self {
        Self {
            id: TransactionId::new(),
            changes,
        }
    }

    /// Build the transaction that undoes this one when applied after it
    ///
    /// `from` is the snapshot this transaction was applied to. The inverse is
    /// regenerated as a diff with the snapshots swapped, since a `set` can
    /// only be undone with the prior record.
    pub fn inverse(&self, from: &Snapshot) -> Transaction {
        Transaction::new(super::engine::invert(from, &self.changes))
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}
