use crate::domain::civil_time::{
    civil_date_to_instant, format_display_time, parse_clock_label, parse_timezone, today_in,
    SCHEDULE_TIME_FORMAT,
};
use crate::domain::error::DomainError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_TIMEZONE: &str = "Africa/Cairo";
pub const DEFAULT_SCHEDULE_START: &str = "12:00 PM";
pub const DEFAULT_SCHEDULE_END: &str = "05:00 PM";
pub const DEFAULT_INTERVAL_MINUTES: u32 = 15;

/// Fallback working-hours schedule, expressed as wall-clock labels in the
/// base timezone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotSchedule {
    pub base_timezone: String,
    pub start: String,
    pub end: String,
    pub interval_minutes: u32,
}

impl Default for SlotSchedule {
    fn default() -> Self {
        Self {
            base_timezone: DEFAULT_BASE_TIMEZONE.to_string(),
            start: DEFAULT_SCHEDULE_START.to_string(),
            end: DEFAULT_SCHEDULE_END.to_string(),
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

impl SlotSchedule {
    pub fn base(&self) -> Result<Tz, DomainError> {
        parse_timezone(&self.base_timezone)
    }

    pub fn labels(&self) -> Result<Vec<String>, DomainError> {
        generate_slots(&self.start, &self.end, self.interval_minutes)
    }

    /// Fallback labels rendered for `display`, anchored to today in the base
    /// timezone. Labels that cannot be converted are dropped.
    pub fn display_labels(
        &self,
        display: Tz,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, DomainError> {
        let base = self.base()?;
        let labels = self.labels()?;
        Ok(labels
            .iter()
            .filter_map(|label| match to_display_timezone(label, base, display, now) {
                Ok(converted) => Some(converted),
                Err(error) => {
                    tracing::warn!(%error, label = %label, "skipping fallback slot");
                    None
                }
            })
            .collect())
    }
}

/// Every `interval_minutes` step from `start_label` to `end_label` inclusive,
/// formatted `hh:mm AM/PM`.
pub fn generate_slots(
    start_label: &str,
    end_label: &str,
    interval_minutes: u32,
) -> Result<Vec<String>, DomainError> {
    if interval_minutes == 0 {
        return Err(DomainError::InvalidInterval);
    }

    let start = parse_clock_label(start_label)?;
    let end = parse_clock_label(end_label)?;
    let step = Duration::minutes(i64::from(interval_minutes));

    let mut slots = Vec::new();
    let mut offset = Duration::zero();
    loop {
        let (current, wrapped_seconds) = start.overflowing_add_signed(offset);
        if wrapped_seconds != 0 || current > end {
            break;
        }
        slots.push(current.format(SCHEDULE_TIME_FORMAT).to_string());
        offset = offset + step;
    }
    Ok(slots)
}

/// Re-renders a base-timezone wall-clock label in `display`, using today's
/// date in the base timezone as the anchor.
pub fn to_display_timezone(
    label: &str,
    base: Tz,
    display: Tz,
    now: DateTime<Utc>,
) -> Result<String, DomainError> {
    if base == display {
        return Ok(label.to_string());
    }

    let time = parse_clock_label(label)?;
    let instant = civil_date_to_instant(today_in(now, base), time, base)?;
    Ok(format_display_time(instant, display))
}

/// Inverse of [`to_display_timezone`], anchored to the selected date.
pub fn from_display_timezone(
    label: &str,
    display: Tz,
    base: Tz,
    date: NaiveDate,
) -> Result<String, DomainError> {
    if base == display {
        return Ok(label.to_string());
    }

    let time = parse_clock_label(label)?;
    let instant = civil_date_to_instant(date, time, display)?;
    Ok(format_display_time(instant, base))
}
