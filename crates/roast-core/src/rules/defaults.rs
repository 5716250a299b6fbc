//! Column default filling, run before validation

use crate::model::{is_nil, Record};
use crate::schema::TableSchema;

/// Fill nil columns that declare a default
///
/// `rows` is the table's current content and is handed to computed defaults
/// (auto-increment, generated ids). Columns with a non-nil value are left
/// untouched. Runs before validation, so a default can satisfy a
/// non-nullable column.
pub fn apply_defaults(table: &TableSchema, rows: &[Record], record: Record) -> Record {
    let mut result = record;
    for (name, column) in table.columns() {
        let Some(default) = &column.default else {
            continue;
        };
        if is_nil(result.get(name)) {
            let value = default.resolve(rows);
            tracing::debug!(column = name, %value, "applied column default");
            result.insert(name.to_string(), value);
        }
    }
    result
}
