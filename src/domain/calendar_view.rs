use crate::domain::civil_time::{format_display_time, parse_clock_label};
use crate::domain::models::{MonthCursor, SelectedDate, SubmissionStatus, ViewState};
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_LABELS: [&str; 7] = ["SAT", "SUN", "MON", "TUE", "WED", "THU", "FRI"];

/// Month grid laid out Saturday-first: leading `None` cells pad the first
/// week, then days `1..=days_in_month`.
pub fn month_grid(cursor: MonthCursor) -> Vec<Option<u32>> {
    let Some(first) = cursor.first_day() else {
        return Vec::new();
    };
    let leading = (first.weekday().num_days_from_sunday() + 1) % 7;

    let mut cells: Vec<Option<u32>> = (0..leading).map(|_| None).collect();
    cells.extend((1..=cursor.days_in_month()).map(Some));
    cells
}

pub fn month_name(month0: u32) -> &'static str {
    MONTH_NAMES[month0 as usize % 12]
}

/// Upper-case month heading shown above the grid.
pub fn month_heading(cursor: MonthCursor) -> String {
    month_name(cursor.month0).to_uppercase()
}

pub fn step_title(view_state: ViewState, submission: &SubmissionStatus) -> &'static str {
    match view_state {
        ViewState::Opening | ViewState::DaySelection => "SELECT A DAY",
        ViewState::TimeSelection => "SELECT A TIME",
        ViewState::DetailsForm if *submission == SubmissionStatus::Succeeded => "SUCCESS",
        ViewState::DetailsForm => "FILL THE FORM",
        ViewState::Closed => "",
    }
}

/// `"1:00pm, Monday, January 12, 2026"`. Empty when the date or time label
/// cannot be read.
pub fn selected_date_time_label(date: &SelectedDate, time_label: &str) -> String {
    let (Some(civil_date), Ok(time)) = (date.date(), parse_clock_label(time_label)) else {
        return String::new();
    };

    let (is_pm, hour12) = time.hour12();
    format!(
        "{}:{:02}{}, {}, {} {}, {}",
        hour12,
        time.minute(),
        if is_pm { "pm" } else { "am" },
        civil_date.format("%A"),
        month_name(date.month0),
        date.day,
        date.year
    )
}

/// `"Africa/Cairo"` becomes `"Africa / Cairo"`.
pub fn timezone_display_name(timezone: &str) -> String {
    timezone.split('/').collect::<Vec<_>>().join(" / ")
}

/// Picker entry such as `"Asia / Dubai (3:00 PM)"`.
pub fn timezone_option_label(timezone: Tz, now: DateTime<Utc>) -> String {
    format!(
        "{} ({})",
        timezone_display_name(timezone.name()),
        current_time_in(timezone, now)
    )
}

pub fn current_time_in(timezone: Tz, now: DateTime<Utc>) -> String {
    format_display_time(now, timezone)
}
