//! Command action creators
//!
//! Each creator computes its result with the pure [`Repo`] against the
//! store's state, dispatches the matching command action and returns the new
//! state together with the affected record. When a sync adapter is attached,
//! every write is also handed to [`sync_transaction`]; outstanding attempts can
//! be awaited with [`ActionCreators::settle`].

use std::sync::{Arc, Mutex};

use roast_core::errors::Result;
use roast_core::{Command, Record, Repo, Snapshot};
use serde_json::Value;

use crate::actions::{Action, ActionStore};
use crate::errors::SyncError;
use crate::sync::{sync_transaction, SyncAdapter, SyncOutcome, SyncTicket};

pub struct ActionCreators {
    repo: Repo,
    adapter: Option<Arc<dyn SyncAdapter>>,
    in_flight: Mutex<Vec<SyncTicket>>,
}

impl ActionCreators {
    pub fn new(repo: Repo) -> Self {
        Self {
            repo,
            adapter: None,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Synchronize every write through `adapter`
    ///
    /// Writes must then be issued from within a tokio runtime.
    pub fn with_sync(mut self, adapter: Arc<dyn SyncAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// # Errors
    /// See [`Repo::insert`]. Nothing is dispatched on error.
    pub fn insert(
        &self,
        store: &mut ActionStore,
        table: &str,
        record: Record,
    ) -> Result<(Snapshot, Record)> {
        self.run(
            store,
            Command::Insert {
                table: table.to_string(),
                record,
            },
        )
    }

    /// # Errors
    /// See [`Repo::update`]. Nothing is dispatched on error.
    pub fn update(
        &self,
        store: &mut ActionStore,
        table: &str,
        id: &Value,
        values: Record,
    ) -> Result<(Snapshot, Record)> {
        self.run(
            store,
            Command::Update {
                table: table.to_string(),
                id: id.clone(),
                values,
            },
        )
    }

    /// # Errors
    /// See [`Repo::delete`]. Nothing is dispatched on error.
    pub fn delete(
        &self,
        store: &mut ActionStore,
        table: &str,
        id: &Value,
    ) -> Result<(Snapshot, Record)> {
        self.run(
            store,
            Command::Delete {
                table: table.to_string(),
                id: id.clone(),
            },
        )
    }

    fn run(&self, store: &mut ActionStore, command: Command) -> Result<(Snapshot, Record)> {
        let from = store.state().clone();
        let (change, record) = self.repo.plan(&from, &command)?;
        let to = store.dispatch(Action::from(change)).clone();

        if let Some(adapter) = &self.adapter {
            let ticket = sync_transaction(Arc::clone(adapter), store.handle(), &from, &to);
            self.in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(ticket);
        }

        Ok((to, record))
    }

    /// Number of sync attempts not yet awaited
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .map(|tickets| tickets.len())
            .unwrap_or_default()
    }

    /// Await every outstanding sync attempt, in issue order
    pub async fn settle(&self) -> Vec<std::result::Result<SyncOutcome, SyncError>> {
        let tickets = std::mem::take(
            &mut *self
                .in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        futures::future::join_all(tickets.into_iter().map(SyncTicket::outcome)).await
    }
}

impl std::fmt::Debug for ActionCreators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionCreators")
            .field("repo", &self.repo)
            .field("synced", &self.adapter.is_some())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
