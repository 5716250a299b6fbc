use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use roast_core::schema::{ColumnDefault, ColumnSchema, Schema, TableSchema};
use roast_core::Record;
use roast_engine::{Action, SyncAdapter, SyncError};
use serde_json::Value;

/// Users table with auto-increment id, required firstName and age defaulting to 0
#[allow(dead_code)]
pub fn users_schema() -> Schema {
    Schema::new().table(
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
}

#[allow(dead_code)]
pub fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

/// Adapter that records every action and then succeeds or fails
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingAdapter {
    pub reject_with: Option<String>,
    pub seen: Mutex<Vec<Action>>,
}

#[allow(dead_code)]
impl RecordingAdapter {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reject_with: Some(reason.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<Action> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncAdapter for RecordingAdapter {
    async fn sync(&self, action: &Action) -> Result<(), SyncError> {
        self.seen.lock().unwrap().push(action.clone());
        match &self.reject_with {
            Some(reason) => Err(SyncError::Rejected {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}
