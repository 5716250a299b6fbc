//! Core types shared across Roast crates
//!
//! This crate provides foundational types used by the transaction kernel,
//! the orchestration layer and the logging facility:
//!
//! - **Identifiers**: TransactionId, SubscriptionId
//! - **Schema constants**: Canonical field keys and event names

pub mod ids;
pub mod schema;

pub use ids::{SubscriptionId, TransactionId};
