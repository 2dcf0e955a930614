use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const SUBMISSION_MARKER_KEY: &str = "calendar_booking_submitted";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum ViewState {
    #[default]
    Closed = 0,
    Opening = 1,
    DaySelection = 2,
    TimeSelection = 3,
    DetailsForm = 4,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCursor {
    pub year: i32,
    /// Zero-based month (January = 0).
    pub month0: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month0: u32) -> Self {
        Self {
            year: year + (month0 / 12) as i32,
            month0: month0 % 12,
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn next(self) -> Self {
        if self.month0 == 11 {
            Self {
                year: self.year + 1,
                month0: 0,
            }
        } else {
            Self {
                year: self.year,
                month0: self.month0 + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month0 == 0 {
            Self {
                year: self.year - 1,
                month0: 11,
            }
        } else {
            Self {
                year: self.year,
                month0: self.month0 - 1,
            }
        }
    }

    /// Signed number of months from `origin` to `self`.
    pub fn months_since(self, origin: MonthCursor) -> i32 {
        (self.year - origin.year) * 12 + (self.month0 as i32 - origin.month0 as i32)
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1)
    }

    pub fn days_in_month(self) -> u32 {
        let Some(first) = self.first_day() else {
            return 0;
        };
        let next = self.next();
        next.first_day()
            .map(|next_first| (next_first - first).num_days() as u32)
            .unwrap_or(31)
    }

    pub fn abbreviation(self) -> &'static str {
        MONTH_ABBREVIATIONS[self.month0 as usize % 12]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedDate {
    pub day: u32,
    /// Zero-based month of the calendar cursor at selection time.
    pub month0: u32,
    pub year: i32,
    /// Absolute start of the confirmed slot; set on time confirmation.
    pub start_time: Option<DateTime<Utc>>,
}

impl SelectedDate {
    pub fn new(day: u32, month0: u32, year: i32) -> Self {
        Self {
            day,
            month0,
            year,
            start_time: None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, self.day)
    }
}

/// One `(year, month)` row returned by the availability service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailableDaysEntry {
    pub year: i32,
    pub month: String,
    #[serde(rename = "availableDays", default)]
    pub available_days: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityIndex {
    months: BTreeMap<(i32, u32), BTreeSet<u32>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub skipped_months: Vec<String>,
    pub conflicting_keys: Vec<(i32, u32)>,
}

impl AvailabilityIndex {
    /// Builds the index from one fetch cycle. Duplicate `(year, month)` rows
    /// are unioned; rows with an unknown month abbreviation are skipped.
    pub fn from_entries(entries: &[AvailableDaysEntry]) -> (Self, MergeReport) {
        let mut months: BTreeMap<(i32, u32), BTreeSet<u32>> = BTreeMap::new();
        let mut skipped_months = Vec::new();
        let mut conflicting_keys = Vec::new();

        for entry in entries {
            let Some(month0) = month0_from_abbreviation(&entry.month) else {
                skipped_months.push(entry.month.clone());
                continue;
            };
            let days: BTreeSet<u32> = entry
                .available_days
                .iter()
                .copied()
                .filter(|day| (1..=31).contains(day))
                .collect();
            let key = (entry.year, month0);
            match months.get_mut(&key) {
                Some(existing) => {
                    if *existing != days && !conflicting_keys.contains(&key) {
                        conflicting_keys.push(key);
                    }
                    existing.extend(days);
                }
                None => {
                    months.insert(key, days);
                }
            }
        }

        (
            Self { months },
            MergeReport {
                skipped_months,
                conflicting_keys,
            },
        )
    }

    pub fn is_available(&self, year: i32, month0: u32, day: u32) -> bool {
        self.months
            .get(&(year, month0))
            .is_some_and(|days| days.contains(&day))
    }

    pub fn days_for(&self, cursor: MonthCursor) -> Option<&BTreeSet<u32>> {
        self.months.get(&(cursor.year, cursor.month0))
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }
}

pub fn month0_from_abbreviation(value: &str) -> Option<u32> {
    let value = value.trim();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(value))
        .map(|index| index as u32)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub status: SlotStatus,
}

impl TimeSlot {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayAvailability {
    pub date: String,
    pub timezone: String,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub description: String,
    /// RFC3339 with numeric offset, written when a time is confirmed.
    pub start_time: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AdditionalFields {
    pub business_stage: String,
    pub website_need: String,
    pub sales_conversion: String,
    pub instagram_id: String,
    pub decision_maker: String,
    pub phone_number: String,
    pub website: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Name,
    Email,
    Description,
    StartTime,
    Timezone,
    BusinessStage,
    WebsiteNeed,
    SalesConversion,
    InstagramId,
    DecisionMaker,
    PhoneNumber,
    Website,
}

impl FieldName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Description => "description",
            Self::StartTime => "startTime",
            Self::Timezone => "timezone",
            Self::BusinessStage => "businessStage",
            Self::WebsiteNeed => "websiteNeed",
            Self::SalesConversion => "salesConversion",
            Self::InstagramId => "instagramId",
            Self::DecisionMaker => "decisionMaker",
            Self::PhoneNumber => "phoneNumber",
            Self::Website => "website",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Description => "Description",
            Self::StartTime => "Start time",
            Self::Timezone => "Timezone",
            Self::BusinessStage => "Business stage",
            Self::WebsiteNeed => "Website need",
            Self::SalesConversion => "Sales conversion",
            Self::InstagramId => "Instagram ID",
            Self::DecisionMaker => "Decision maker",
            Self::PhoneNumber => "Phone number",
            Self::Website => "Website",
        }
    }

    /// Fields filled by the calendar itself rather than typed by the user.
    pub fn is_hidden(self) -> bool {
        matches!(self, Self::StartTime | Self::Timezone)
    }

    pub fn parse(value: &str) -> Option<Self> {
        ALL_FIELDS
            .iter()
            .copied()
            .find(|field| field.as_str() == value.trim())
    }
}

pub const ALL_FIELDS: [FieldName; 12] = [
    FieldName::Name,
    FieldName::Email,
    FieldName::Description,
    FieldName::StartTime,
    FieldName::Timezone,
    FieldName::BusinessStage,
    FieldName::WebsiteNeed,
    FieldName::SalesConversion,
    FieldName::InstagramId,
    FieldName::DecisionMaker,
    FieldName::PhoneNumber,
    FieldName::Website,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Description,
    StartTime,
    Timezone,
}

impl FormField {
    pub fn field_name(self) -> FieldName {
        match self {
            Self::Name => FieldName::Name,
            Self::Email => FieldName::Email,
            Self::Description => FieldName::Description,
            Self::StartTime => FieldName::StartTime,
            Self::Timezone => FieldName::Timezone,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AdditionalField {
    BusinessStage,
    WebsiteNeed,
    SalesConversion,
    InstagramId,
    DecisionMaker,
    PhoneNumber,
    Website,
}

impl AdditionalField {
    pub fn field_name(self) -> FieldName {
        match self {
            Self::BusinessStage => FieldName::BusinessStage,
            Self::WebsiteNeed => FieldName::WebsiteNeed,
            Self::SalesConversion => FieldName::SalesConversion,
            Self::InstagramId => FieldName::InstagramId,
            Self::DecisionMaker => FieldName::DecisionMaker,
            Self::PhoneNumber => FieldName::PhoneNumber,
            Self::Website => FieldName::Website,
        }
    }
}

impl FormData {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Description => &self.description,
            FormField::StartTime => &self.start_time,
            FormField::Timezone => &self.timezone,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Email => self.email = value,
            FormField::Description => self.description = value,
            FormField::StartTime => self.start_time = value,
            FormField::Timezone => self.timezone = value,
        }
    }
}

impl AdditionalFields {
    pub fn get(&self, field: AdditionalField) -> &str {
        match field {
            AdditionalField::BusinessStage => &self.business_stage,
            AdditionalField::WebsiteNeed => &self.website_need,
            AdditionalField::SalesConversion => &self.sales_conversion,
            AdditionalField::InstagramId => &self.instagram_id,
            AdditionalField::DecisionMaker => &self.decision_maker,
            AdditionalField::PhoneNumber => &self.phone_number,
            AdditionalField::Website => &self.website,
        }
    }

    pub fn set(&mut self, field: AdditionalField, value: String) {
        match field {
            AdditionalField::BusinessStage => self.business_stage = value,
            AdditionalField::WebsiteNeed => self.website_need = value,
            AdditionalField::SalesConversion => self.sales_conversion = value,
            AdditionalField::InstagramId => self.instagram_id = value,
            AdditionalField::DecisionMaker => self.decision_maker = value,
            AdditionalField::PhoneNumber => self.phone_number = value,
            AdditionalField::Website => self.website = value,
        }
    }
}

pub type FieldErrors = BTreeMap<FieldName, String>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Failed(String),
    Succeeded,
}

/// Body accepted by `POST /bookings/create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingPayload {
    pub name: String,
    pub email: String,
    pub slot_start_time: String,
    pub description: String,
    pub timezone: String,
}
