use roast_core::schema::{ColumnDefault, ColumnSchema, Schema, TableSchema};
use roast_core::{Record, Repo, Snapshot};
use serde_json::Value;

/// Users (auto-increment id, required firstName, age defaulting to 0) and
/// comments (uuid id, required body, integer userId)
#[allow(dead_code)]
pub fn test_schema() -> Schema {
    Schema::new()
        .table(
            "users",
            TableSchema::new()
                .column(
                    "id",
                    ColumnSchema::integer()
                        .not_null()
                        .with_default(ColumnDefault::auto_increment()),
                )
                .column("firstName", ColumnSchema::string().not_null())
                .column("lastName", ColumnSchema::string())
                .column("age", ColumnSchema::integer().default_value(0)),
        )
        .table(
            "comments",
            TableSchema::new()
                .column(
                    "id",
                    ColumnSchema::string()
                        .not_null()
                        .with_default(ColumnDefault::uuid()),
                )
                .column("body", ColumnSchema::string().not_null())
                .column("userId", ColumnSchema::integer()),
        )
}

#[allow(dead_code)]
pub fn test_repo() -> Repo {
    Repo::new(test_schema())
}

/// Build a record from a `json!` object literal
#[allow(dead_code)]
pub fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

/// Insert each record in turn, returning the final snapshot
#[allow(dead_code)]
pub fn seed(repo: &Repo, table: &str, records: Vec<Value>) -> Snapshot {
    records.into_iter().fold(Snapshot::new(), |db, value| {
        repo.insert(&db, table, record(value)).unwrap().0
    })
}
