use crate::domain::error::DomainError;
use crate::domain::validation::ValidationReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("{0}")]
    Http(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Failed to create booking: {status} {reason}. {detail}")]
    BookingRejected {
        status: u16,
        reason: String,
        detail: String,
    },
    #[error("form validation failed for {} field(s)", .0.all_errors.len())]
    Validation(ValidationReport),
    #[error("store error: {0}")]
    Store(String),
}
