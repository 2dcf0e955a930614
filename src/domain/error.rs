use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("invalid clock time '{0}': expected h:mm AM/PM")]
    InvalidClockTime(String),
    #[error("invalid calendar date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("local time {local} does not exist in {timezone}")]
    NonexistentLocalTime {
        local: NaiveDateTime,
        timezone: String,
    },
    #[error("slot interval must be greater than zero")]
    InvalidInterval,
    #[error("Name, email, and start time are required fields")]
    MissingRequiredFields,
    #[error("Invalid start time format: {0}")]
    InvalidStartTime(String),
}
