//! Stateful repo
//!
//! [`StatefulRepo`] owns the current snapshot and a listener registry. Every
//! write becomes a single-change [`Transaction`] committed through
//! [`StatefulRepo::transaction`], which swaps the snapshot and then notifies
//! listeners in registration order.
//!
//! ## Logging
//! - `log_op_start!` at entry of each write
//! - `log_op_end!` on success
//! - `log_op_error!` on failure

use std::time::Instant;

use roast_core::errors::Result;
use roast_core::{
    apply, invert, log_op_end, log_op_error, log_op_start, Change, Command, Predicate, Record,
    Repo, Schema, Snapshot, Transaction,
};
use roast_core_types::SubscriptionId;
use serde_json::Value;

use crate::listeners::ListenerRegistry;

#[derive(Debug)]
pub struct StatefulRepo {
    repo: Repo,
    current: Snapshot,
    listeners: ListenerRegistry,
}

impl StatefulRepo {
    /// A repo over `schema` starting from an empty snapshot
    pub fn new(schema: Schema) -> Self {
        Self::with_snapshot(Repo::new(schema), Snapshot::new())
    }

    pub fn with_snapshot(repo: Repo, snapshot: Snapshot) -> Self {
        Self {
            repo,
            current: snapshot,
            listeners: ListenerRegistry::new(),
        }
    }

    /// The current snapshot
    pub fn snapshot(&self) -> &Snapshot {
        &self.current
    }

    /// The pure repo this wraps
    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    /// # Errors
    /// See [`Repo::get`].
    pub fn get(&self, table: &str, id: &Value) -> Result<Record> {
        self.repo.get(&self.current, table, id)
    }

    /// # Errors
    /// See [`Repo::all`].
    pub fn all(&self, table: &str, predicate: Option<Predicate<'_>>) -> Result<Vec<Record>> {
        self.repo.all(&self.current, table, predicate)
    }

    /// # Errors
    /// See [`Repo::one`].
    pub fn one(&self, table: &str, predicate: Option<Predicate<'_>>) -> Result<Record> {
        self.repo.one(&self.current, table, predicate)
    }

    /// Insert a record and commit it
    ///
    /// # Errors
    /// See [`Repo::insert`]. Nothing is committed on error.
    pub fn insert(&mut self, table: &str, record: Record) -> Result<Record> {
        self.execute(Command::Insert {
            table: table.to_string(),
            record,
        })
    }

    /// Merge `values` into the row with `id` and commit it
    ///
    /// # Errors
    /// See [`Repo::update`]. Nothing is committed on error.
    pub fn update(&mut self, table: &str, id: &Value, values: Record) -> Result<Record> {
        self.execute(Command::Update {
            table: table.to_string(),
            id: id.clone(),
            values,
        })
    }

    /// Remove the row with `id` and commit it
    ///
    /// # Errors
    /// See [`Repo::delete`]. Nothing is committed on error.
    pub fn delete(&mut self, table: &str, id: &Value) -> Result<Record> {
        self.execute(Command::Delete {
            table: table.to_string(),
            id: id.clone(),
        })
    }

    /// Plan `command` against the current snapshot and commit its change
    ///
    /// # Errors
    /// See [`Repo::plan`].
    pub fn execute(&mut self, command: Command) -> Result<Record> {
        let op = command.op();
        log_op_start!(op, table = command.table());
        let start = Instant::now();

        let (change, record) = self.repo.plan(&self.current, &command).map_err(|e| {
            log_op_error!(
                op,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                table = command.table()
            );
            e
        })?;

        let tx = self.transaction(vec![change]);

        log_op_end!(
            op,
            duration_ms = start.elapsed().as_millis() as u64,
            table = command.table(),
            tx_id = tx.id.as_str()
        );
        Ok(record)
    }

    /// Commit `changes` as one transaction and notify listeners
    ///
    /// This is the single commit path: every write, including rollbacks,
    /// goes through here.
    pub fn transaction(&mut self, changes: Vec<Change>) -> Transaction {
        let tx = Transaction::new(changes);
        self.current = apply(&self.current, &tx.changes);
        tracing::debug!(
            tx_id = tx.id.as_str(),
            change_count = tx.len(),
            listener_count = self.listeners.len(),
            "committed transaction"
        );
        self.listeners.notify(&tx);
        tx
    }

    /// Apply a transaction without notifying listeners
    ///
    /// Used to replay transactions received from elsewhere.
    pub fn apply_transaction(&mut self, tx: &Transaction) {
        self.current = apply(&self.current, &tx.changes);
    }

    /// Undo `tx`, which was committed on top of `from`
    ///
    /// The inverse is committed through [`StatefulRepo::transaction`], so
    /// listeners observe the rollback like any other write.
    pub fn revert(&mut self, tx: &Transaction, from: &Snapshot) -> Transaction {
        tracing::debug!(tx_id = tx.id.as_str(), "reverting transaction");
        self.transaction(invert(from, &tx.changes))
    }

    /// Register a listener for committed transactions
    pub fn add_transaction_listener<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&Transaction) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    /// Unregister a listener; unknown ids are ignored
    pub fn remove_transaction_listener(&mut self, id: &SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roast_core::schema::{ColumnDefault, ColumnSchema, TableSchema};
    use serde_json::json;

    fn repo() -> StatefulRepo {
        StatefulRepo::new(
            Schema::new().table(
                "users",
                TableSchema::new()
                    .column(
                        "id",
                        ColumnSchema::integer()
                            .not_null()
                            .with_default(ColumnDefault::auto_increment()),
                    )
                    .column("firstName", ColumnSchema::string().not_null()),
            ),
        )
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_failed_write_commits_nothing() {
        let mut repo = repo();
        let before = repo.snapshot().clone();
        assert!(repo.insert("users", record(json!({}))).is_err());
        assert_eq!(repo.snapshot(), &before);
        assert!(!repo.snapshot().has_table("users"));
    }

    #[test]
    fn test_apply_transaction_replays_without_notifying() {
        let mut source = repo();
        let tx = source.transaction(vec![Change::Insert {
            table: "users".to_string(),
            record: record(json!({"id": 1, "firstName": "a"})),
        }]);

        let mut replica = repo();
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = std::sync::Arc::clone(&calls);
        replica.add_transaction_listener(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        replica.apply_transaction(&tx);

        assert_eq!(replica.snapshot(), source.snapshot());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
