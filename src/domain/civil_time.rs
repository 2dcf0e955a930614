//! Conversions between civil wall-clock time in a named timezone and
//! absolute instants.
//!
//! `civil_to_instant` re-renders a guess in the target zone and shifts it by
//! the remaining civil delta until the rendering matches. Offsets are
//! piecewise constant, so it settles after one or two steps for every civil
//! time that exists.

use crate::domain::error::DomainError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

const MAX_OFFSET_ITERATIONS: usize = 20;

pub const DISPLAY_TIME_FORMAT: &str = "%-I:%M %p";
pub const SCHEDULE_TIME_FORMAT: &str = "%I:%M %p";

pub fn parse_timezone(id: &str) -> Result<Tz, DomainError> {
    id.trim()
        .parse::<Tz>()
        .map_err(|_| DomainError::UnknownTimezone(id.trim().to_string()))
}

/// Parses `h:mm AM/PM` as well as the zero-padded `hh:mm AM/PM` form.
pub fn parse_clock_label(label: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(label.trim(), SCHEDULE_TIME_FORMAT)
        .map_err(|_| DomainError::InvalidClockTime(label.trim().to_string()))
}

pub fn civil_date(year: i32, month0: u32, day: u32) -> Result<NaiveDate, DomainError> {
    NaiveDate::from_ymd_opt(year, month0 + 1, day).ok_or(DomainError::InvalidDate {
        year,
        month: month0 + 1,
        day,
    })
}

/// Finds the instant whose rendering in `timezone` equals `local`.
///
/// Returns `NonexistentLocalTime` for civil times skipped by a forward
/// transition. For civil times repeated by a backward transition the first
/// matching instant reached by the search is returned.
pub fn civil_to_instant(local: NaiveDateTime, timezone: Tz) -> Result<DateTime<Utc>, DomainError> {
    let mut guess = Utc.from_utc_datetime(&local);

    for _ in 0..MAX_OFFSET_ITERATIONS {
        let rendered = guess.with_timezone(&timezone).naive_local();
        let delta = local - rendered;
        if delta == Duration::zero() {
            return Ok(guess);
        }
        guess = guess + delta;
    }

    Err(DomainError::NonexistentLocalTime {
        local,
        timezone: timezone.name().to_string(),
    })
}

pub fn civil_date_to_instant(
    date: NaiveDate,
    time: NaiveTime,
    timezone: Tz,
) -> Result<DateTime<Utc>, DomainError> {
    civil_to_instant(date.and_time(time), timezone)
}

/// `±HH:MM` offset of `timezone` at `instant`.
pub fn offset_string(instant: DateTime<Utc>, timezone: Tz) -> String {
    let local = instant.with_timezone(&timezone).naive_local();
    let total_minutes = (local - instant.naive_utc()).num_minutes();
    let sign = if total_minutes >= 0 { '+' } else { '-' };
    let minutes = total_minutes.abs();
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn format_rfc3339(instant: DateTime<Utc>, timezone: Tz) -> String {
    let local = instant.with_timezone(&timezone);
    format!(
        "{}{}",
        local.format("%Y-%m-%dT%H:%M:%S"),
        offset_string(instant, timezone)
    )
}

pub fn format_display_time(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant
        .with_timezone(&timezone)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

/// Today's civil date as observed in `timezone`.
pub fn today_in(now: DateTime<Utc>, timezone: Tz) -> NaiveDate {
    now.with_timezone(&timezone).date_naive()
}
