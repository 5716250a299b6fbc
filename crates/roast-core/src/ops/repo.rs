//! Pure query/command layer
//!
//! [`Repo`] holds only a schema. Every operation takes the snapshot to act
//! on; writes return the next snapshot together with the affected record and
//! never touch the input.

use std::sync::Arc;

use serde_json::Value;

use crate::apply::apply_change;
use crate::commands::Command;
use crate::diff::Change;
use crate::errors::{Result, RoastError};
use crate::model::value::display_id;
use crate::model::{Record, ID_COLUMN};
use crate::rules::{apply_defaults, validate, validate_identity};
use crate::schema::Schema;
use crate::snapshot::Snapshot;

/// Row filter for [`Repo::all`] and [`Repo::one`]
pub type Predicate<'a> = &'a dyn Fn(&Record) -> bool;

#[derive(Debug, Clone)]
pub struct Repo {
    schema: Arc<Schema>,
}

impl Repo {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    pub fn from_shared(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Fetch a copy of the row with `id`
    ///
    /// # Errors
    /// * `UnknownTable` - `table` is not in the schema
    /// * `RecordNotFound` - no row has `id`
    pub fn get(&self, db: &Snapshot, table: &str, id: &Value) -> Result<Record> {
        self.schema.require_table(table)?;
        db.find(table, id)
            .cloned()
            .ok_or_else(|| RoastError::RecordNotFound {
                table: table.to_string(),
                id: display_id(id),
            })
    }

    /// Rows of `table` in stored order, optionally filtered
    ///
    /// # Errors
    /// * `UnknownTable` - `table` is not in the schema
    pub fn all(
        &self,
        db: &Snapshot,
        table: &str,
        predicate: Option<Predicate<'_>>,
    ) -> Result<Vec<Record>> {
        self.schema.require_table(table)?;
        let rows = db.rows(table);
        Ok(match predicate {
            Some(keep) => rows.iter().filter(|row| keep(row)).cloned().collect(),
            None => rows.to_vec(),
        })
    }

    /// The single row matching `predicate`
    ///
    /// # Errors
    /// * `UnknownTable` - `table` is not in the schema
    /// * `AmbiguousResult` - zero or several rows matched
    pub fn one(
        &self,
        db: &Snapshot,
        table: &str,
        predicate: Option<Predicate<'_>>,
    ) -> Result<Record> {
        let mut rows = self.all(db, table, predicate)?;
        if rows.len() != 1 {
            return Err(RoastError::AmbiguousResult {
                table: table.to_string(),
                count: rows.len(),
            });
        }
        Ok(rows.remove(0))
    }

    /// Insert `record`, returning the next snapshot and the stored record
    ///
    /// # Errors
    /// * `UnknownTable` - `table` is not in the schema
    /// * `ValidationFailed` - the defaulted record breaks a column rule, or
    ///   its id is missing or already taken
    pub fn insert(&self, db: &Snapshot, table: &str, record: Record) -> Result<(Snapshot, Record)> {
        self.execute(
            db,
            &Command::Insert {
                table: table.to_string(),
                record,
            },
        )
    }

    /// Shallow-merge `values` over the row with `id`
    ///
    /// Defaults are reapplied after the merge, so a column set to null falls
    /// back to its default.
    ///
    /// # Errors
    /// * `UnknownTable` - `table` is not in the schema
    /// * `RecordNotFound` - no row has `id`
    /// * `ValidationFailed` - the merged record breaks a column rule, or
    ///   its id is missing or taken by another row
    pub fn update(
        &self,
        db: &Snapshot,
        table: &str,
        id: &Value,
        values: Record,
    ) -> Result<(Snapshot, Record)> {
        self.execute(
            db,
            &Command::Update {
                table: table.to_string(),
                id: id.clone(),
                values,
            },
        )
    }

    /// Remove the row with `id`, returning the next snapshot and the removed row
    ///
    /// # Errors
    /// * `UnknownTable` - `table` is not in the schema
    /// * `RecordNotFound` - no row has `id`
    pub fn delete(&self, db: &Snapshot, table: &str, id: &Value) -> Result<(Snapshot, Record)> {
        self.execute(
            db,
            &Command::Delete {
                table: table.to_string(),
                id: id.clone(),
            },
        )
    }

    /// Run a command against `db`
    ///
    /// # Errors
    /// Same as [`Repo::plan`].
    pub fn execute(&self, db: &Snapshot, command: &Command) -> Result<(Snapshot, Record)> {
        let (change, record) = self.plan(db, command)?;
        let mut next = db.clone();
        apply_change(&mut next, &change);
        Ok((next, record))
    }

    /// Resolve a command into the single change it implies
    ///
    /// Returns the change and the record it affects (inserted, updated or
    /// removed). Nothing is applied.
    ///
    /// # Errors
    /// * `UnknownTable` - checked before anything else
    /// * `RecordNotFound` - update/delete target is missing
    /// * `ValidationFailed` - insert/update record is invalid
    pub fn plan(&self, db: &Snapshot, command: &Command) -> Result<(Change, Record)> {
        let table = command.table();
        let table_schema = self.schema.require_table(table)?;

        match command {
            Command::Insert { record, .. } => {
                let rows = db.rows(table);
                let record = apply_defaults(table_schema, rows, record.clone());
                self.check(table, rows, &record, None)?;
                tracing::debug!(table, "planned insert");
                Ok((
                    Change::Insert {
                        table: table.to_string(),
                        record: record.clone(),
                    },
                    record,
                ))
            }

            Command::Update { id, values, .. } => {
                let mut record = self.get(db, table, id)?;
                for (column, value) in values {
                    record.insert(column.clone(), value.clone());
                }
                let rows = db.rows(table);
                let record = apply_defaults(table_schema, rows, record);
                self.check(table, rows, &record, Some(id))?;
                tracing::debug!(table, %id, "planned update");
                Ok((
                    Change::Set {
                        table: table.to_string(),
                        id: id.clone(),
                        record: record.clone(),
                    },
                    record,
                ))
            }

            Command::Delete { id, .. } => {
                let record = self.get(db, table, id)?;
                tracing::debug!(table, %id, "planned delete");
                Ok((
                    Change::Delete {
                        table: table.to_string(),
                        id: id.clone(),
                    },
                    record,
                ))
            }
        }
    }

    /// Column rules, then id presence and uniqueness against `rows`
    fn check(
        &self,
        table: &str,
        rows: &[Record],
        record: &Record,
        replacing: Option<&Value>,
    ) -> Result<()> {
        let table_schema = self.schema.require_table(table)?;
        let mut errors = validate(table_schema, record);
        validate_identity(&mut errors, rows, record, replacing);
        if errors.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            table,
            id = ?record.get(ID_COLUMN),
            invalid_columns = errors.len(),
            "record failed validation"
        );
        Err(RoastError::ValidationFailed {
            table: table.to_string(),
            errors,
        })
    }
}
