use crate::domain::models::SUBMISSION_MARKER_KEY;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::storage::open_database;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SUBMITTED_VALUE: &str = "true";

/// Durable "a booking was already submitted" flag.
pub trait SubmissionMarkerStore: Send + Sync {
    fn is_submitted(&self) -> Result<bool, InfraError>;
    fn mark_submitted(&self) -> Result<(), InfraError>;
    fn clear(&self) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct SqliteSubmissionMarkerStore {
    db_path: PathBuf,
}

impl SqliteSubmissionMarkerStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, InfraError> {
        open_database(&self.db_path)
    }
}

impl SubmissionMarkerStore for SqliteSubmissionMarkerStore {
    fn is_submitted(&self) -> Result<bool, InfraError> {
        let connection = self.connect()?;
        let value: Option<String> = connection
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![SUBMISSION_MARKER_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.as_deref() == Some(SUBMITTED_VALUE))
    }

    fn mark_submitted(&self) -> Result<(), InfraError> {
        let connection = self.connect()?;
        connection.execute(
            "INSERT INTO kv_store (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![SUBMISSION_MARKER_KEY, SUBMITTED_VALUE],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<(), InfraError> {
        let connection = self.connect()?;
        connection.execute(
            "DELETE FROM kv_store WHERE key = ?1",
            params![SUBMISSION_MARKER_KEY],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemorySubmissionMarkerStore {
    submitted: Mutex<bool>,
}

impl InMemorySubmissionMarkerStore {
    fn with_flag<T>(&self, apply: impl FnOnce(&mut bool) -> T) -> Result<T, InfraError> {
        let mut guard = self
            .submitted
            .lock()
            .map_err(|error| InfraError::Store(format!("in-memory lock poisoned: {error}")))?;
        Ok(apply(&mut guard))
    }
}

impl SubmissionMarkerStore for InMemorySubmissionMarkerStore {
    fn is_submitted(&self) -> Result<bool, InfraError> {
        self.with_flag(|flag| *flag)
    }

    fn mark_submitted(&self) -> Result<(), InfraError> {
        self.with_flag(|flag| *flag = true)
    }

    fn clear(&self) -> Result<(), InfraError> {
        self.with_flag(|flag| *flag = false)
    }
}
