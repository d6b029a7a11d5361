//! Task snapshot store and SQLite implementation.
//!
//! # Responsibility
//! - Persist the whole task list as one document under a fixed storage key.
//! - Hand callers an immutable snapshot for the duration of a computation.
//!
//! # Invariants
//! - Write paths validate every task before touching storage.
//! - A document that is not a JSON array is rejected as `InvalidData`.
//! - Records are decoded one by one: a malformed recurrence rule is
//!   clamped, and a record that still fails is logged and skipped.
//! - A missing storage key reads as an empty task list.
//! - `update_tasks` holds the write lock from read to write, so concurrent
//!   processes cannot overwrite each other's changes.

use crate::db::DbError;
use crate::model::recurrence::Recurrence;
use crate::model::task::{Task, TaskId, TaskValidationError};
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized task list.
pub const TASKS_STORAGE_KEY: &str = "lazytask.tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for task store operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Snapshot-style persistence contract for the task list.
pub trait TaskStore {
    /// Reads every stored task.
    fn load_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Replaces the stored task list atomically.
    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()>;
    /// Read-modify-write under one exclusive write lock.
    ///
    /// `apply` edits the loaded list in place; the list is saved only when
    /// it returns `Ok`. An error leaves storage untouched.
    fn update_tasks<T>(&self, apply: impl FnOnce(&mut Vec<Task>) -> RepoResult<T>) -> RepoResult<T>;
}

impl<S: TaskStore> TaskStore for &S {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        (**self).load_tasks()
    }

    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        (**self).save_tasks(tasks)
    }

    fn update_tasks<T>(&self, apply: impl FnOnce(&mut Vec<Task>) -> RepoResult<T>) -> RepoResult<T> {
        (**self).update_tasks(apply)
    }
}

/// SQLite-backed task store over the `kv_store` table.
pub struct SqliteTaskStore<'conn> {
    conn: &'conn Connection,
    key: String,
}

impl<'conn> SqliteTaskStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_key(conn, TASKS_STORAGE_KEY)
    }

    /// Uses a custom storage key, e.g. for isolated profiles.
    pub fn with_key(conn: &'conn Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }
}

impl TaskStore for SqliteTaskStore<'_> {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(document) = stored else {
            return Ok(Vec::new());
        };

        decode_document(&self.key, &document)
    }

    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        for task in tasks {
            task.validate()?;
        }

        let document = serde_json::to_string(tasks)
            .map_err(|err| RepoError::InvalidData(format!("failed to encode tasks: {err}")))?;

        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), document],
        )?;

        info!(
            "event=tasks_save module=repo status=ok task_count={}",
            tasks.len()
        );
        Ok(())
    }

    fn update_tasks<T>(&self, apply: impl FnOnce(&mut Vec<Task>) -> RepoResult<T>) -> RepoResult<T> {
        // Dropping the transaction without commit rolls back.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut tasks = self.load_tasks()?;
        let output = apply(&mut tasks)?;
        self.save_tasks(&tasks)?;
        tx.commit()?;
        Ok(output)
    }
}

fn decode_document(key: &str, document: &str) -> RepoResult<Vec<Task>> {
    let records: Vec<Value> = serde_json::from_str(document).map_err(|err| {
        error!(
            "event=tasks_load module=repo status=error error_code=corrupt_document line={} column={}",
            err.line(),
            err.column()
        );
        RepoError::InvalidData(format!("kv_store[`{key}`]: {err}"))
    })?;

    let mut tasks = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match decode_record(record) {
            Ok(task) => tasks.push(task),
            Err(err) => warn!(
                "event=tasks_load module=repo status=skipped record_index={index} error={err}"
            ),
        }
    }
    Ok(tasks)
}

/// Decodes one stored task, clamping an out-of-range recurrence rule first.
fn decode_record(mut record: Value) -> Result<Task, serde_json::Error> {
    if let Some(rule) = record.get_mut("recurrence") {
        if let Ok(parsed) = serde_json::from_value::<Recurrence>(rule.clone()) {
            if parsed.validate().is_err() {
                *rule = serde_json::to_value(parsed.normalized())?;
            }
        }
    }
    serde_json::from_value(record)
}
