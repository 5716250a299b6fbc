use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using RoastError
pub type Result<T> = std::result::Result<T, RoastError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and external API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup
    UnknownTable,
    NotFound,
    AmbiguousResult,

    // Validation
    ValidationFailed,
    InvalidSchema,

    // Integration
    Serialization,
    SyncFailed,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownTable => "ERR_UNKNOWN_TABLE",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AmbiguousResult => "ERR_AMBIGUOUS_RESULT",
            ExErrorKind::ValidationFailed => "ERR_VALIDATION_FAILED",
            ExErrorKind::InvalidSchema => "ERR_INVALID_SCHEMA",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::SyncFailed => "ERR_SYNC_FAILED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context for
/// debugging. Built from domain errors via `From<RoastError>`.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    record_id: Option<String>,
    count: Option<usize>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            record_id: None,
            count: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add record id context
    pub fn with_record_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    /// Add a row count (used by AmbiguousResult)
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the record id context, if any
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// Get the row count context, if any
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ExError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(id) = &self.record_id {
            write!(f, " (record_id: {})", id)?;
        }
        if let Some(count) = self.count {
            write!(f, " (count: {})", count)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Per-column validation errors, keyed by column name
///
/// Each column maps to the ordered list of messages produced for it. An empty
/// mapping means the record is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record the errors for one column; empty lists are dropped
    pub fn insert(&mut self, column: impl Into<String>, errors: Vec<String>) {
        if !errors.is_empty() {
            self.0.insert(column.into(), errors);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Errors for a single column, if it has any
    pub fn get(&self, column: &str) -> Option<&[String]> {
        self.0.get(column).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

/// Error taxonomy for Roast operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoastError {
    /// Referenced table is absent from the schema
    #[error("table does not exist: '{table}'")]
    UnknownTable { table: String },

    /// No row with the requested id
    #[error("record not found: '{table}:{id}'")]
    RecordNotFound { table: String, id: String },

    /// Validation produced at least one column error
    #[error("record invalid in '{table}': {errors}")]
    ValidationFailed {
        table: String,
        errors: ValidationErrors,
    },

    /// `one` matched zero or several rows
    #[error("expected exactly one record in '{table}', but found {count}")]
    AmbiguousResult { table: String, count: usize },

    /// Schema definition could not be turned into a Schema
    #[error("invalid schema: {reason}")]
    InvalidSchema { reason: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for RoastError {
    fn from(err: serde_json::Error) -> Self {
        RoastError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<RoastError> for ExError {
    fn from(err: RoastError) -> Self {
        let message = err.to_string();
        match err {
            RoastError::UnknownTable { table } => ExError::new(ExErrorKind::UnknownTable)
                .with_table(table)
                .with_message(message),

            RoastError::RecordNotFound { table, id } => ExError::new(ExErrorKind::NotFound)
                .with_table(table)
                .with_record_id(id)
                .with_message(message),

            RoastError::ValidationFailed { table, .. } => {
                ExError::new(ExErrorKind::ValidationFailed)
                    .with_table(table)
                    .with_message(message)
            }

            RoastError::AmbiguousResult { table, count } => {
                ExError::new(ExErrorKind::AmbiguousResult)
                    .with_table(table)
                    .with_count(count)
                    .with_message(message)
            }

            RoastError::InvalidSchema { .. } => {
                ExError::new(ExErrorKind::InvalidSchema).with_message(message)
            }

            RoastError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}
