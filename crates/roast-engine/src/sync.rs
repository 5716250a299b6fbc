//! Optimistic synchronization protocol
//!
//! The caller commits locally first, then hands the transaction to a
//! [`SyncAdapter`]. [`sync_transaction`] returns the optimistic action at once
//! and runs a single sync attempt on a spawned task. If the attempt fails, the
//! inverse action is queued into the [`ActionStore`](crate::ActionStore)
//! through its [`ActionHandle`], so the rollback takes the same dispatch path
//! as every other write.
//!
//! There is no retry, no timeout and no cancellation. Concurrent optimistic
//! updates are not serialized against each other.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use roast_core::{log_op_end, log_op_error, log_op_start, Snapshot};
use tokio::task::JoinHandle;

use crate::actions::{transaction_action, Action, ActionHandle};
use crate::errors::SyncError;

/// Remote persistence for transaction actions
#[async_trait]
pub trait SyncAdapter: Send + Sync {
    /// Attempt to persist `action` remotely
    ///
    /// # Errors
    /// Any error triggers a local rollback.
    async fn sync(&self, action: &Action) -> Result<(), SyncError>;
}

/// How a sync attempt ended
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The adapter accepted the transaction
    Synced,
    /// The adapter failed and the inverse action was queued
    RolledBack { error: SyncError },
    /// The adapter failed but the store was gone, so nothing was queued
    RollbackDropped { error: SyncError },
}

/// Handle to one in-flight sync attempt
#[derive(Debug)]
pub struct SyncTicket {
    /// The optimistic transaction action
    pub action: Action,
    task: JoinHandle<SyncOutcome>,
}

impl SyncTicket {
    /// Wait for the sync attempt to finish
    ///
    /// # Errors
    /// `TaskFailed` if the sync task panicked or was aborted by the runtime.
    pub async fn outcome(self) -> Result<SyncOutcome, SyncError> {
        self.task.await.map_err(|e| SyncError::TaskFailed {
            message: e.to_string(),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start synchronizing the transaction that turned `from` into `to`
///
/// Must be called within a tokio runtime.
pub fn sync_transaction(
    adapter: Arc<dyn SyncAdapter>,
    handle: ActionHandle,
    from: &Snapshot,
    to: &Snapshot,
) -> SyncTicket {
    let action = transaction_action(from, to);
    let rollback = transaction_action(to, from);
    let pending = action.clone();

    let task = tokio::spawn(async move {
        let change_count = pending.changes().map_or(0, |changes| changes.len());
        log_op_start!("sync", change_count = change_count);
        let start = Instant::now();

        match adapter.sync(&pending).await {
            Ok(()) => {
                log_op_end!("sync", duration_ms = start.elapsed().as_millis() as u64);
                SyncOutcome::Synced
            }
            Err(error) => {
                log_op_error!(
                    "sync",
                    error.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                if handle.enqueue(rollback) {
                    tracing::debug!(change_count, "queued rollback transaction");
                    SyncOutcome::RolledBack { error }
                } else {
                    tracing::warn!(change_count, "action store dropped, rollback discarded");
                    SyncOutcome::RollbackDropped { error }
                }
            }
        }
    });

    SyncTicket { action, task }
}
