use crate::domain::civil_time::parse_timezone;
use crate::domain::slot_schedule::{
    generate_slots, SlotSchedule, DEFAULT_BASE_TIMEZONE, DEFAULT_INTERVAL_MINUTES,
    DEFAULT_SCHEDULE_END, DEFAULT_SCHEDULE_START,
};
use crate::infrastructure::error::InfraError;
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use url::Url;

pub const BOOKING_JSON: &str = "booking.json";
pub const DEFAULT_API_BASE_URL: &str = "https://calender-stellervision-production.up.railway.app/api";
pub const DEFAULT_DISPLAY_TIMEZONES: [&str; 3] = ["Africa/Cairo", "Asia/Dubai", "Asia/Riyadh"];

const API_BASE_URL_KEYS: [&str; 1] = ["BOOKING_API_BASE_URL"];
const DEFAULT_TIMEZONE_KEYS: [&str; 1] = ["BOOKING_DEFAULT_TIMEZONE"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingConfigFile {
    api_base_url: String,
    base_timezone: String,
    default_timezone: String,
    display_timezones: Vec<String>,
    schedule: ScheduleFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleFile {
    start: String,
    end: String,
    interval_minutes: u32,
}

/// Validated booking configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfig {
    pub api_base_url: Url,
    pub base_timezone: Tz,
    pub default_timezone: Tz,
    pub display_timezones: Vec<Tz>,
    pub schedule: SlotSchedule,
}

fn default_file() -> serde_json::Value {
    serde_json::json!({
        "schema": 1,
        "apiBaseUrl": DEFAULT_API_BASE_URL,
        "baseTimezone": DEFAULT_BASE_TIMEZONE,
        "defaultTimezone": DEFAULT_BASE_TIMEZONE,
        "displayTimezones": DEFAULT_DISPLAY_TIMEZONES,
        "schedule": {
            "start": DEFAULT_SCHEDULE_START,
            "end": DEFAULT_SCHEDULE_END,
            "intervalMinutes": DEFAULT_INTERVAL_MINUTES
        }
    })
}

pub fn ensure_default_config(config_dir: &Path) -> Result<(), InfraError> {
    let path = config_dir.join(BOOKING_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&default_file())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_booking_config(config_dir: &Path) -> Result<BookingConfig, InfraError> {
    load_booking_config_with_lookup(config_dir, |key| std::env::var(key).ok())
}

pub fn load_booking_config_with_lookup<F>(
    config_dir: &Path,
    lookup: F,
) -> Result<BookingConfig, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = config_dir.join(BOOKING_JSON);
    let mut file: BookingConfigFile = serde_json::from_value(read_config(&path)?)?;

    if let Some(api_base_url) = optional_lookup_value(&lookup, &API_BASE_URL_KEYS) {
        file.api_base_url = api_base_url;
    }
    if let Some(default_timezone) = optional_lookup_value(&lookup, &DEFAULT_TIMEZONE_KEYS) {
        file.default_timezone = default_timezone;
    }

    let config = validate(file)?;
    tracing::debug!(
        api_base_url = %config.api_base_url,
        default_timezone = config.default_timezone.name(),
        "loaded booking config"
    );
    Ok(config)
}

fn validate(file: BookingConfigFile) -> Result<BookingConfig, InfraError> {
    let api_base_url = parse_api_base_url(&file.api_base_url)?;
    let base_timezone = config_timezone(&file.base_timezone, "baseTimezone")?;
    let default_timezone = config_timezone(&file.default_timezone, "defaultTimezone")?;

    let display_timezones = file
        .display_timezones
        .iter()
        .map(|timezone| config_timezone(timezone, "displayTimezones"))
        .collect::<Result<Vec<_>, _>>()?;
    if display_timezones.is_empty() {
        return Err(InfraError::InvalidConfig(
            "displayTimezones must not be empty".to_string(),
        ));
    }
    if !display_timezones.contains(&default_timezone) {
        return Err(InfraError::InvalidConfig(format!(
            "defaultTimezone {} is not one of displayTimezones",
            default_timezone.name()
        )));
    }

    let labels = generate_slots(
        &file.schedule.start,
        &file.schedule.end,
        file.schedule.interval_minutes,
    )
    .map_err(|error| InfraError::InvalidConfig(format!("invalid schedule: {error}")))?;
    if labels.is_empty() {
        return Err(InfraError::InvalidConfig(
            "schedule start must not be after schedule end".to_string(),
        ));
    }

    Ok(BookingConfig {
        api_base_url,
        base_timezone,
        default_timezone,
        display_timezones,
        schedule: SlotSchedule {
            base_timezone: base_timezone.name().to_string(),
            start: file.schedule.start.trim().to_string(),
            end: file.schedule.end.trim().to_string(),
            interval_minutes: file.schedule.interval_minutes,
        },
    })
}

fn parse_api_base_url(raw: &str) -> Result<Url, InfraError> {
    let url = Url::parse(raw.trim()).map_err(|error| {
        InfraError::InvalidConfig(format!("invalid apiBaseUrl '{raw}': {error}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(InfraError::InvalidConfig(format!(
            "apiBaseUrl must be an http(s) base URL: {raw}"
        )));
    }
    Ok(url)
}

fn config_timezone(raw: &str, field: &str) -> Result<Tz, InfraError> {
    parse_timezone(raw).map_err(|error| InfraError::InvalidConfig(format!("{field}: {error}")))
}

fn optional_lookup_value<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    for key in keys {
        if let Some(value) = lookup(key) {
            let normalized = value.trim();
            if !normalized.is_empty() {
                return Some(normalized.to_string());
            }
        }
    }
    None
}
