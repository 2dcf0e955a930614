//! The booking flow as a pure reducer over [`CalendarState`].
//!
//! Every action either produces the next state or, when its preconditions do
//! not hold, returns the input state untouched.

use crate::domain::civil_time::{
    civil_date_to_instant, format_rfc3339, parse_clock_label, parse_timezone,
};
use crate::domain::error::DomainError;
use crate::domain::models::{
    AdditionalField, AdditionalFields, AvailabilityIndex, FieldErrors, FieldName, FormData,
    FormField, MonthCursor, SelectedDate, SubmissionStatus, TimeSlot, ViewState,
};
use crate::domain::validation::{validate_field, ValidationReport};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, SecondsFormat, Utc};
use std::collections::BTreeSet;

/// Months past the current one that can be browsed.
pub const MONTH_WINDOW: i32 = 2;
/// Days after today (inclusive) that cannot be booked in the current month.
pub const BOOKING_LEAD_DAYS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarState {
    pub view_state: ViewState,
    pub cursor: MonthCursor,
    pub selected_date: Option<SelectedDate>,
    pub selected_time: Option<String>,
    /// Active display timezone.
    pub timezone: String,
    pub form_data: FormData,
    pub additional_fields: AdditionalFields,
    pub field_errors: FieldErrors,
    pub available_days: AvailabilityIndex,
    pub day_slots: Vec<TimeSlot>,
    /// Timezone the current `day_slots` were fetched with.
    pub day_slots_timezone: Option<String>,
    pub submission: SubmissionStatus,
    pub banner: Option<String>,
}

impl CalendarState {
    pub fn new(today: NaiveDate, timezone: &str) -> Self {
        Self {
            view_state: ViewState::Closed,
            cursor: MonthCursor::containing(today),
            selected_date: None,
            selected_time: None,
            timezone: timezone.to_string(),
            form_data: FormData {
                timezone: timezone.to_string(),
                ..FormData::default()
            },
            additional_fields: AdditionalFields::default(),
            field_errors: FieldErrors::new(),
            available_days: AvailabilityIndex::default(),
            day_slots: Vec::new(),
            day_slots_timezone: None,
            submission: SubmissionStatus::Idle,
            banner: None,
        }
    }

    pub fn field_value(&self, field: FieldName) -> &str {
        match field {
            FieldName::Name => self.form_data.get(FormField::Name),
            FieldName::Email => self.form_data.get(FormField::Email),
            FieldName::Description => self.form_data.get(FormField::Description),
            FieldName::StartTime => self.form_data.get(FormField::StartTime),
            FieldName::Timezone => self.form_data.get(FormField::Timezone),
            FieldName::BusinessStage => self.additional_fields.get(AdditionalField::BusinessStage),
            FieldName::WebsiteNeed => self.additional_fields.get(AdditionalField::WebsiteNeed),
            FieldName::SalesConversion => {
                self.additional_fields.get(AdditionalField::SalesConversion)
            }
            FieldName::InstagramId => self.additional_fields.get(AdditionalField::InstagramId),
            FieldName::DecisionMaker => self.additional_fields.get(AdditionalField::DecisionMaker),
            FieldName::PhoneNumber => self.additional_fields.get(AdditionalField::PhoneNumber),
            FieldName::Website => self.additional_fields.get(AdditionalField::Website),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthDirection {
    Previous,
    Next,
}

/// How a confirmed time maps to an absolute start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmedSlot {
    /// A slot returned by the availability service, with the timezone it was
    /// fetched for.
    Live {
        start: DateTime<FixedOffset>,
        timezone: String,
    },
    /// A wall-clock label on the selected date in `timezone`.
    WallClock { label: String, timezone: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarAction {
    OpenCalendar,
    CloseCalendar,
    SelectDay { day: u32, month0: u32, year: i32 },
    SelectTime(String),
    ConfirmTime { resolved: Option<ConfirmedSlot> },
    GoBack,
    NavigateMonth(MonthDirection),
    UpdateFormField { field: FormField, value: String },
    UpdateAdditionalField { field: AdditionalField, value: String },
    UpdateTimezone(String),
    FieldBlurred(FieldName),
    AvailableDaysLoaded(AvailabilityIndex),
    DaySlotsLoaded { timezone: String, slots: Vec<TimeSlot> },
    DaySlotsCleared,
    SubmissionRejected(ValidationReport),
    SubmissionStarted,
    SubmissionFailed(String),
    SubmissionSucceeded,
    BannerDismissed,
}

pub fn reduce(state: CalendarState, action: CalendarAction, today: NaiveDate) -> CalendarState {
    match action {
        CalendarAction::OpenCalendar => open(state, today),
        CalendarAction::CloseCalendar => CalendarState {
            view_state: ViewState::Closed,
            selected_date: None,
            selected_time: None,
            ..state
        },
        CalendarAction::SelectDay { day, month0, year } => {
            select_day(state, day, month0, year, today)
        }
        CalendarAction::SelectTime(label) => select_time(state, label),
        CalendarAction::ConfirmTime { resolved } => confirm_time(state, resolved),
        CalendarAction::GoBack => go_back(state),
        CalendarAction::NavigateMonth(direction) => navigate_month(state, direction, today),
        CalendarAction::UpdateFormField { field, value } => {
            let mut next = state;
            next.form_data.set(field, value);
            next.field_errors.remove(&field.field_name());
            next
        }
        CalendarAction::UpdateAdditionalField { field, value } => {
            let mut next = state;
            next.additional_fields.set(field, value);
            next.field_errors.remove(&field.field_name());
            next
        }
        CalendarAction::UpdateTimezone(timezone) => {
            let mut next = state;
            next.form_data.timezone = timezone.clone();
            next.timezone = timezone;
            next.field_errors.remove(&FieldName::Timezone);
            next
        }
        CalendarAction::FieldBlurred(field) => {
            let mut next = state;
            match validate_field(field, next.field_value(field)) {
                Some(message) => {
                    next.field_errors.insert(field, message);
                }
                None => {
                    next.field_errors.remove(&field);
                }
            }
            next
        }
        CalendarAction::AvailableDaysLoaded(index) => CalendarState {
            available_days: index,
            ..state
        },
        CalendarAction::DaySlotsLoaded { timezone, slots } => CalendarState {
            day_slots: slots.into_iter().filter(TimeSlot::is_available).collect(),
            day_slots_timezone: Some(timezone),
            ..state
        },
        CalendarAction::DaySlotsCleared => CalendarState {
            day_slots: Vec::new(),
            day_slots_timezone: None,
            ..state
        },
        CalendarAction::SubmissionRejected(report) => CalendarState {
            field_errors: report.visible_errors.clone(),
            banner: report.hidden_field_banner(),
            submission: SubmissionStatus::Idle,
            ..state
        },
        CalendarAction::SubmissionStarted => CalendarState {
            submission: SubmissionStatus::Submitting,
            banner: None,
            ..state
        },
        CalendarAction::SubmissionFailed(message) => CalendarState {
            banner: Some(message.clone()),
            submission: SubmissionStatus::Failed(message),
            ..state
        },
        CalendarAction::SubmissionSucceeded => CalendarState {
            submission: SubmissionStatus::Succeeded,
            banner: None,
            ..state
        },
        CalendarAction::BannerDismissed => {
            let submission = match state.submission {
                SubmissionStatus::Failed(_) => SubmissionStatus::Idle,
                other => other,
            };
            CalendarState {
                banner: None,
                submission,
                ..state
            }
        }
    }
}

fn open(state: CalendarState, today: NaiveDate) -> CalendarState {
    if !matches!(state.view_state, ViewState::Closed | ViewState::Opening) {
        return state;
    }
    let current = MonthCursor::containing(today);
    let cursor = state.cursor.clamp(current, advance(current, MONTH_WINDOW));
    CalendarState {
        view_state: ViewState::DaySelection,
        cursor,
        ..state
    }
}

fn select_day(
    state: CalendarState,
    day: u32,
    month0: u32,
    year: i32,
    today: NaiveDate,
) -> CalendarState {
    if state.view_state != ViewState::DaySelection
        || state.cursor != (MonthCursor { year, month0 })
        || is_day_disabled(&state, day, today)
    {
        return state;
    }
    CalendarState {
        view_state: ViewState::TimeSelection,
        selected_date: Some(SelectedDate::new(day, month0, year)),
        selected_time: None,
        day_slots: Vec::new(),
        day_slots_timezone: None,
        ..state
    }
}

fn select_time(state: CalendarState, label: String) -> CalendarState {
    if state.view_state != ViewState::TimeSelection {
        return state;
    }
    let selected_time = if state.selected_time.as_deref() == Some(label.as_str()) {
        None
    } else {
        Some(label)
    };
    CalendarState {
        selected_time,
        ..state
    }
}

fn confirm_time(state: CalendarState, resolved: Option<ConfirmedSlot>) -> CalendarState {
    if state.view_state != ViewState::TimeSelection {
        return state;
    }
    let (Some(selected_date), Some(selected_time)) = (&state.selected_date, &state.selected_time)
    else {
        return state;
    };

    let resolved = resolved.unwrap_or_else(|| ConfirmedSlot::WallClock {
        label: selected_time.clone(),
        timezone: state.timezone.clone(),
    });

    let resolution = resolve_start(selected_date, &resolved, &state.timezone);
    let (instant, start_time, timezone) = match resolution {
        Ok(resolution) => resolution,
        Err(error) => {
            tracing::warn!(%error, ?resolved, "could not resolve confirmed time slot");
            return state;
        }
    };

    let mut next = state;
    if let Some(selected) = next.selected_date.as_mut() {
        selected.start_time = Some(instant);
    }
    next.form_data.start_time = start_time;
    next.form_data.timezone = timezone;
    next.field_errors.remove(&FieldName::StartTime);
    next.field_errors.remove(&FieldName::Timezone);
    next.view_state = ViewState::DetailsForm;
    next
}

fn resolve_start(
    selected_date: &SelectedDate,
    resolved: &ConfirmedSlot,
    display_timezone: &str,
) -> Result<(DateTime<Utc>, String, String), DomainError> {
    match resolved {
        ConfirmedSlot::Live { start, timezone } => Ok((
            start.with_timezone(&Utc),
            start.to_rfc3339_opts(SecondsFormat::Secs, false),
            timezone.clone(),
        )),
        ConfirmedSlot::WallClock { label, timezone } => {
            let slot_timezone = parse_timezone(timezone)?;
            let display = parse_timezone(display_timezone)?;
            let date = selected_date.date().ok_or(DomainError::InvalidDate {
                year: selected_date.year,
                month: selected_date.month0 + 1,
                day: selected_date.day,
            })?;
            let instant = civil_date_to_instant(date, parse_clock_label(label)?, slot_timezone)?;
            Ok((
                instant,
                format_rfc3339(instant, display),
                display.name().to_string(),
            ))
        }
    }
}

fn go_back(state: CalendarState) -> CalendarState {
    match state.view_state {
        ViewState::TimeSelection => CalendarState {
            view_state: ViewState::DaySelection,
            selected_time: None,
            ..state
        },
        ViewState::DetailsForm => CalendarState {
            view_state: ViewState::TimeSelection,
            ..state
        },
        _ => state,
    }
}

fn navigate_month(
    state: CalendarState,
    direction: MonthDirection,
    today: NaiveDate,
) -> CalendarState {
    if state.view_state != ViewState::DaySelection {
        return state;
    }
    let offset = state.cursor.months_since(MonthCursor::containing(today));
    let cursor = match direction {
        MonthDirection::Previous if offset > 0 => state.cursor.prev(),
        MonthDirection::Next if offset < MONTH_WINDOW => state.cursor.next(),
        _ => return state,
    };
    CalendarState { cursor, ..state }
}

fn advance(cursor: MonthCursor, months: i32) -> MonthCursor {
    (0..months).fold(cursor, |current, _| current.next())
}

pub fn is_month_in_window(cursor: MonthCursor, today: NaiveDate) -> bool {
    (0..=MONTH_WINDOW).contains(&cursor.months_since(MonthCursor::containing(today)))
}

/// Whether `day` of the cursor month can not be picked.
pub fn is_day_disabled(state: &CalendarState, day: u32, today: NaiveDate) -> bool {
    let cursor = state.cursor;
    if !is_month_in_window(cursor, today) {
        return true;
    }
    if day == 0 || day > cursor.days_in_month() {
        return true;
    }
    if !state.available_days.is_available(cursor.year, cursor.month0, day) {
        return true;
    }
    // Covers both past days and the lead time.
    cursor == MonthCursor::containing(today) && day <= today.day() + BOOKING_LEAD_DAYS
}

pub fn can_navigate(state: &CalendarState, direction: MonthDirection, today: NaiveDate) -> bool {
    let offset = state.cursor.months_since(MonthCursor::containing(today));
    match direction {
        MonthDirection::Previous => offset > 0,
        MonthDirection::Next => offset < MONTH_WINDOW,
    }
}

/// Years whose availability must be loaded to render `viewed`.
pub fn years_to_fetch(viewed: MonthCursor, today: NaiveDate) -> BTreeSet<i32> {
    let mut years = BTreeSet::from([today.year(), viewed.year]);
    if (viewed.year == today.year() && viewed.month0 >= 10) || viewed.year > today.year() {
        years.insert(viewed.year + 1);
    }
    years
}
