//! Roast Core - schema-validated in-memory record store kernel
//!
//! This crate provides the pure building blocks of Roast:
//! - Schema description, column validation and defaulting
//! - Immutable snapshots of named tables
//! - The transaction engine: `diff`, `apply` and `invert` over snapshots
//! - A pure repo exposing `get/all/one/insert/update/delete`
//! - The canonical error and logging facilities
//!
//! Stateful wrappers, listeners and synchronization live in `roast-engine`.

pub mod apply;
pub mod commands;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod rules;
pub mod schema;
pub mod snapshot;

pub use roast_core_types as core_types;

// Re-export commonly used types
pub use apply::apply;
pub use commands::Command;
pub use diff::{diff, invert, Change, Transaction};
pub use errors::{ExError, ExErrorKind, Result, RoastError, ValidationErrors};
pub use model::{Record, ID_COLUMN};
pub use ops::{Predicate, Repo};
pub use schema::{ColumnDefault, ColumnSchema, ColumnType, GeneratorRegistry, Schema, TableSchema};
pub use snapshot::Snapshot;
