//! Action/reducer layer
//!
//! Actions are the serializable messages that move state between holders.
//! [`reduce`] replays an action over a snapshot; [`ActionStore`] is a
//! single-writer state holder that reduces every dispatched action and owns a
//! queue for actions produced off the writer's path (sync rollbacks).
//!
//! Wire shapes:
//!
//! ```json
//! { "type": "ROAST.TX", "tx": [ { "action": "set", "table": "users", "id": 1, "record": {..} } ] }
//! { "type": "ROAST.SET", "db": { "users": [..] } }
//! { "type": "ROAST.INSERT", "table": "users", "record": {..} }
//! ```

use roast_core::{apply, diff, Change, Record, Snapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

pub const TX: &str = "ROAST.TX";
pub const SET: &str = "ROAST.SET";
pub const INSERT: &str = "ROAST.INSERT";
pub const UPDATE: &str = "ROAST.UPDATE";
pub const DELETE: &str = "ROAST.DELETE";

/// A state-changing message, tagged on `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Replay a change list
    #[serde(rename = "ROAST.TX")]
    Transaction { tx: Vec<Change> },

    /// Replace the whole state
    #[serde(rename = "ROAST.SET")]
    Set { db: Snapshot },

    #[serde(rename = "ROAST.INSERT")]
    Insert { table: String, record: Record },

    #[serde(rename = "ROAST.UPDATE")]
    Update {
        table: String,
        id: Value,
        record: Record,
    },

    #[serde(rename = "ROAST.DELETE")]
    Delete { table: String, id: Value },

    /// Any action not owned by this layer
    #[serde(other)]
    Other,
}

impl Action {
    /// The `type` tag, or `None` for foreign actions
    pub fn action_type(&self) -> Option<&'static str> {
        match self {
            Action::Transaction { .. } => Some(TX),
            Action::Set { .. } => Some(SET),
            Action::Insert { .. } => Some(INSERT),
            Action::Update { .. } => Some(UPDATE),
            Action::Delete { .. } => Some(DELETE),
            Action::Other => None,
        }
    }

    /// The change list this action carries, if it is a transaction
    pub fn changes(&self) -> Option<&[Change]> {
        match self {
            Action::Transaction { tx } => Some(tx.as_slice()),
            _ => None,
        }
    }
}

/// The command action equivalent to a single change
impl From<Change> for Action {
    fn from(change: Change) -> Self {
        match change {
            Change::Insert { table, record } => Action::Insert { table, record },
            Change::Set { table, id, record } => Action::Update { table, id, record },
            Change::Delete { table, id } => Action::Delete { table, id },
        }
    }
}

/// Compute the state after `action`
///
/// Foreign actions leave the state unchanged.
pub fn reduce(state: &Snapshot, action: &Action) -> Snapshot {
    match action {
        Action::Transaction { tx } => apply(state, tx),
        Action::Set { db } => db.clone(),
        Action::Insert { table, record } => apply(
            state,
            &[Change::Insert {
                table: table.clone(),
                record: record.clone(),
            }],
        ),
        Action::Update { table, id, record } => apply(
            state,
            &[Change::Set {
                table: table.clone(),
                id: id.clone(),
                record: record.clone(),
            }],
        ),
        Action::Delete { table, id } => apply(
            state,
            &[Change::Delete {
                table: table.clone(),
                id: id.clone(),
            }],
        ),
        Action::Other => state.clone(),
    }
}

/// Build the `ROAST.TX` action turning `from` into `to`
pub fn transaction_action(from: &Snapshot, to: &Snapshot) -> Action {
    Action::Transaction { tx: diff(from, to) }
}

/// Cloneable sender into an [`ActionStore`]'s pending queue
#[derive(Debug, Clone)]
pub struct ActionHandle {
    sender: mpsc::UnboundedSender<Action>,
}

impl ActionHandle {
    /// Queue `action` for the store's writer
    ///
    /// Returns false if the store has been dropped.
    pub fn enqueue(&self, action: Action) -> bool {
        self.sender.send(action).is_ok()
    }
}

/// Single-writer holder of the current snapshot
#[derive(Debug)]
pub struct ActionStore {
    state: Snapshot,
    sender: mpsc::UnboundedSender<Action>,
    pending: mpsc::UnboundedReceiver<Action>,
}

impl ActionStore {
    pub fn new(initial: Snapshot) -> Self {
        let (sender, pending) = mpsc::unbounded_channel();
        Self {
            state: initial,
            sender,
            pending,
        }
    }

    pub fn state(&self) -> &Snapshot {
        &self.state
    }

    /// Reduce `action` into the current state
    pub fn dispatch(&mut self, action: Action) -> &Snapshot {
        tracing::debug!(action_type = ?action.action_type(), "dispatching action");
        self.state = reduce(&self.state, &action);
        &self.state
    }

    /// A sender for actions produced outside the writer (sync tasks)
    pub fn handle(&self) -> ActionHandle {
        ActionHandle {
            sender: self.sender.clone(),
        }
    }

    /// Dispatch every queued action, returning how many ran
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(action) = self.pending.try_recv() {
            self.dispatch(action);
            processed += 1;
        }
        processed
    }

    /// Wait for the next queued action and dispatch it
    pub async fn dispatch_next(&mut self) -> Option<&Snapshot> {
        let action = self.pending.recv().await?;
        Some(self.dispatch(action))
    }
}

impl Default for ActionStore {
    fn default() -> Self {
        Self::new(Snapshot::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_foreign_action_leaves_state() {
        let action: Action = serde_json::from_value(json!({"type": "other"})).unwrap();
        assert_eq!(action, Action::Other);

        let state = Snapshot::new().with_table("users", vec![row(json!({"id": 1}))]);
        assert_eq!(reduce(&state, &action), state);
    }

    #[test]
    fn test_set_replaces_state() {
        let action: Action =
            serde_json::from_value(json!({"type": "ROAST.SET", "db": {"users": [{"id": 1}]}}))
                .unwrap();
        let next = reduce(&Snapshot::new(), &action);
        assert_eq!(next.rows("users"), &[row(json!({"id": 1}))]);
    }

    #[test]
    fn test_transaction_action_wire_shape() {
        let to = Snapshot::new().with_table("users", vec![row(json!({"id": 1}))]);
        let action = transaction_action(&Snapshot::new(), &to);
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "type": "ROAST.TX",
                "tx": [{"action": "insert", "table": "users", "record": {"id": 1}}]
            })
        );
    }

    #[test]
    fn test_change_converts_to_command_action() {
        let action = Action::from(Change::Set {
            table: "users".to_string(),
            id: json!(1),
            record: row(json!({"id": 1})),
        });
        assert_eq!(action.action_type(), Some(UPDATE));
    }

    #[test]
    fn test_process_pending_drains_queue() {
        let mut store = ActionStore::default();
        let handle = store.handle();
        assert!(handle.enqueue(Action::Insert {
            table: "users".to_string(),
            record: row(json!({"id": 1})),
        }));
        assert!(handle.enqueue(Action::Delete {
            table: "users".to_string(),
            id: json!(1),
        }));

        assert_eq!(store.process_pending(), 2);
        assert!(store.state().rows("users").is_empty());
        assert_eq!(store.process_pending(), 0);
    }

    #[test]
    fn test_enqueue_after_store_dropped() {
        let store = ActionStore::default();
        let handle = store.handle();
        drop(store);
        assert!(!handle.enqueue(Action::Other));
    }
}
