//! Built-in computed defaults and the named generator registry

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::DefaultFn;
use crate::model::value::is_integer;
use crate::model::{record_id, Record};

pub const AUTO_INCREMENT: &str = "auto_increment";
pub const UUID: &str = "uuid";

/// Next integer id: one past the largest integer id in `rows`, else 1
///
/// Every id the validator accepts as an integer counts, including whole
/// floats and `u64` ids. Past `u64::MAX` there is no next id and `null` is
/// returned, which the id presence rule rejects.
pub fn auto_increment(rows: &[Record]) -> Value {
    let Some(max) = rows
        .iter()
        .filter_map(|row| record_id(row).and_then(integer_id))
        .max()
    else {
        return Value::from(1);
    };

    let next = max.checked_add(1);
    if let Some(n) = next.and_then(|n| i64::try_from(n).ok()) {
        Value::from(n)
    } else if let Some(n) = next.and_then(|n| u64::try_from(n).ok()) {
        Value::from(n)
    } else {
        tracing::debug!(%max, "auto increment exhausted");
        Value::Null
    }
}

/// Integer value of an id, widened so every accepted id fits
fn integer_id(id: &Value) -> Option<i128> {
    if !is_integer(id) {
        return None;
    }
    id.as_i64()
        .map(i128::from)
        .or_else(|| id.as_u64().map(i128::from))
        // whole finite float; `as` saturates out-of-range values
        .or_else(|| id.as_f64().map(|f| f as i128))
}

/// Random UUIDv4, independent of existing rows
pub fn uuid_v4(_rows: &[Record]) -> Value {
    Value::String(Uuid::new_v4().to_string())
}

/// Named default providers referenced from schema definitions
#[derive(Clone)]
pub struct GeneratorRegistry {
    generators: IndexMap<String, DefaultFn>,
}

impl GeneratorRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            generators: IndexMap::new(),
        }
    }

    /// `auto_increment` and `uuid`, plus the camel-case `autoIncrement` alias
    pub fn with_builtins() -> Self {
        Self::empty()
            .register(AUTO_INCREMENT, auto_increment)
            .register("autoIncrement", auto_increment)
            .register(UUID, uuid_v4)
    }

    /// Add a provider under `name`, replacing any previous one
    pub fn register<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Record]) -> Value + Send + Sync + 'static,
    {
        self.generators.insert(name.into(), Arc::new(f));
        self
    }

    pub fn get(&self, name: &str) -> Option<DefaultFn> {
        self.generators.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.generators.keys()).finish()
    }
}
