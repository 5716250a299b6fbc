//! Snapshot diff engine.
//!
//! Computes the minimal change list turning one [`Snapshot`](crate::snapshot::Snapshot)
//! into another, under whole-record replacement semantics.
//!
//! ## Entry point
//!
//! ```
//! use roast_core::diff::diff;
//! use roast_core::{apply, Snapshot};
//! use serde_json::json;
//!
//! let row = json!({"id": 1, "name": "Mitch"}).as_object().cloned().unwrap();
//! let from = Snapshot::new();
//! let to = from.with_table("users", vec![row]);
//!
//! let changes = diff(&from, &to);
//! assert_eq!(apply(&from, &changes), to);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: tables are visited in `from` order, then tables only in
//!   `to`; within a table ids are visited in `from` row order, then ids only
//!   in `to` in `to` row order.
//! - **Minimality**: at most one change per distinct row id; equal rows emit
//!   nothing, so `diff(a, a)` is empty.
//! - **Round trip**: `apply(a, diff(a, b)) == b` under structural equality.

pub mod engine;
pub mod model;

pub use engine::{diff, invert};
pub use model::{Change, Transaction};
