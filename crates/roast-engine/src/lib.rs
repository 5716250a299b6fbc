//! Roast Engine - Orchestration layer
//!
//! Wraps the pure kernel in `roast-core` with the stateful pieces:
//! - [`StatefulRepo`]: owns the current snapshot and notifies listeners
//! - [`ActionStore`] and [`reduce`]: action-driven state replay
//! - [`ActionCreators`]: command helpers that dispatch actions
//! - [`sync_transaction`]: optimistic commit with rollback on sync failure

pub mod action_creators;
pub mod actions;
pub mod errors;
pub mod listeners;
pub mod repo;
pub mod sync;

pub use action_creators::ActionCreators;
pub use actions::{reduce, transaction_action, Action, ActionHandle, ActionStore};
pub use errors::SyncError;
pub use listeners::ListenerRegistry;
pub use repo::StatefulRepo;
pub use sync::{sync_transaction, SyncAdapter, SyncOutcome, SyncTicket};
