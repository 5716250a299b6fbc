//! Column and identity validation rules

use serde_json::Value;

use crate::errors::ValidationErrors;
use crate::model::value::is_integer;
use crate::model::{is_nil, record_id, Record, ID_COLUMN};
use crate::schema::{ColumnSchema, ColumnType, TableSchema};

pub const MUST_BE_PRESENT: &str = "must be present";
pub const MUST_BE_STRING: &str = "must be a string";
pub const MUST_BE_INTEGER: &str = "must be an integer";
pub const MUST_BE_NUMBER: &str = "must be a number";
pub const MUST_BE_UNIQUE: &str = "must be unique";

/// Validate a record against a table's column schema
///
/// Every declared column is checked independently; columns the schema does
/// not declare are ignored. Returns an empty mapping when the record is valid.
pub fn validate(table: &TableSchema, record: &Record) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for (name, column) in table.columns() {
        errors.insert(name, column_errors(column, record.get(name)));
    }
    errors
}

/// Errors for a single column value, in rule order
///
/// Nil values only ever fail the presence rule; type rules accept nil.
pub fn column_errors(column: &ColumnSchema, value: Option<&Value>) -> Vec<String> {
    let mut errors = Vec::new();

    let value = match value {
        Some(v) if !is_nil(Some(v)) => v,
        _ => {
            if !column.nullable {
                errors.push(MUST_BE_PRESENT.to_string());
            }
            return errors;
        }
    };

    match column.column_type {
        ColumnType::String if !value.is_string() => errors.push(MUST_BE_STRING.to_string()),
        ColumnType::Integer if !is_integer(value) => errors.push(MUST_BE_INTEGER.to_string()),
        ColumnType::Number if !value.is_number() => errors.push(MUST_BE_NUMBER.to_string()),
        _ => {}
    }

    errors
}

/// Check the `id` column against the rows already stored in the table
///
/// Every stored record needs a non-null id that no other row carries,
/// whatever the schema declares for the column. `replacing` is the id of the
/// row being updated, which is excluded from the uniqueness check. Column
/// errors already reported for `id` take precedence.
pub fn validate_identity(
    errors: &mut ValidationErrors,
    rows: &[Record],
    record: &Record,
    replacing: Option<&Value>,
) {
    if errors.get(ID_COLUMN).is_some() {
        return;
    }

    let Some(id) = record_id(record) else {
        errors.insert(ID_COLUMN, vec![MUST_BE_PRESENT.to_string()]);
        return;
    };

    let taken = rows
        .iter()
        .filter_map(record_id)
        .filter(|existing| Some(*existing) != replacing)
        .any(|existing| existing == id);
    if taken {
        errors.insert(ID_COLUMN, vec![MUST_BE_UNIQUE.to_string()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> TableSchema {
        TableSchema::new()
            .column("id", ColumnSchema::integer().not_null())
            .column("firstName", ColumnSchema::string().not_null())
            .column("lastName", ColumnSchema::string())
            .column("score", ColumnSchema::number())
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_record_has_no_errors() {
        let errors = validate(&users(), &record(json!({"id": 1, "firstName": "Mitch"})));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_required_columns() {
        let errors = validate(&users(), &record(json!({})));
        assert_eq!(errors.get("id"), Some(&[MUST_BE_PRESENT.to_string()][..]));
        assert_eq!(errors.get("firstName"), Some(&[MUST_BE_PRESENT.to_string()][..]));
        assert!(errors.get("lastName").is_none());
    }

    #[test]
    fn test_explicit_null_counts_as_missing() {
        let errors = validate(&users(), &record(json!({"id": 1, "firstName": null})));
        assert_eq!(errors.get("firstName"), Some(&[MUST_BE_PRESENT.to_string()][..]));
    }

    #[test]
    fn test_type_rules() {
        let errors = validate(
            &users(),
            &record(json!({"id": 1.5, "firstName": 3, "lastName": true, "score": "high"})),
        );
        assert_eq!(errors.get("id"), Some(&[MUST_BE_INTEGER.to_string()][..]));
        assert_eq!(errors.get("firstName"), Some(&[MUST_BE_STRING.to_string()][..]));
        assert_eq!(errors.get("lastName"), Some(&[MUST_BE_STRING.to_string()][..]));
        assert_eq!(errors.get("score"), Some(&[MUST_BE_NUMBER.to_string()][..]));
    }

    #[test]
    fn test_integer_column_accepts_whole_floats_and_number_accepts_ints() {
        let errors = validate(
            &users(),
            &record(json!({"id": 2.0, "firstName": "a", "score": 10})),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_identity_requires_id_even_when_undeclared() {
        let mut errors = ValidationErrors::new();
        validate_identity(&mut errors, &[], &record(json!({"body": "x"})), None);
        assert_eq!(errors.get("id"), Some(&[MUST_BE_PRESENT.to_string()][..]));
    }

    #[test]
    fn test_identity_rejects_taken_id() {
        let rows = vec![record(json!({"id": 1})), record(json!({"id": 2}))];
        let mut errors = ValidationErrors::new();
        validate_identity(&mut errors, &rows, &record(json!({"id": 2})), None);
        assert_eq!(errors.get("id"), Some(&[MUST_BE_UNIQUE.to_string()][..]));
    }

    #[test]
    fn test_identity_allows_row_to_keep_its_own_id() {
        let rows = vec![record(json!({"id": 1})), record(json!({"id": 2}))];
        let mut errors = ValidationErrors::new();
        validate_identity(&mut errors, &rows, &record(json!({"id": 2})), Some(&json!(2)));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_identity_defers_to_column_errors() {
        let mut errors = validate(&users(), &record(json!({"id": "x", "firstName": "a"})));
        validate_identity(&mut errors, &[], &record(json!({"id": "x"})), None);
        assert_eq!(errors.get("id"), Some(&[MUST_BE_INTEGER.to_string()][..]));
    }

    #[test]
    fn test_undeclared_columns_are_ignored() {
        let errors = validate(
            &users(),
            &record(json!({"id": 1, "firstName": "a", "nickname": 42})),
        );
        assert!(errors.is_empty());
    }
}
