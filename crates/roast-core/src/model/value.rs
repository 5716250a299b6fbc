//! Record and column value helpers
//!
//! Column values are plain JSON scalars. A record is a JSON object keyed by
//! column name; every stored record carries an `id` column.

use serde_json::{Map, Value};

/// Name of the identity column
pub const ID_COLUMN: &str = "id";

/// A single row: column name to value
pub type Record = Map<String, Value>;

/// True when a column value is absent or null
pub fn is_nil(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// The record's `id` value, if set and not null
pub fn record_id(record: &Record) -> Option<&Value> {
    record.get(ID_COLUMN).filter(|v| !v.is_null())
}

/// Canonical hashable key for an id value
///
/// `Value` is not `Hash`; the compact JSON text is, and two ids render to the
/// same text exactly when they compare equal.
pub fn id_key(id: &Value) -> String {
    id.to_string()
}

/// True for JSON integers and for finite floats without a fractional part
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n
            .as_f64()
            .map(|f| f.is_finite() && f.fract() == 0.0)
            .unwrap_or(false),
        _ => false,
    }
}

/// Render an id for error messages (`7`, `abc`)
pub fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
