use crate::domain::models::{AdditionalFields, FieldErrors, FieldName, FormData};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s'-]{2,50}$").expect("valid regex"));
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
static START_TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{3})?([+-]\d{2}:\d{2}|Z)$")
        .expect("valid regex")
});
static TIMEZONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_/+-]*$").expect("valid regex"));
static SALES_CONVERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0|[1-9]\d*)(\.\d+)?$").expect("valid regex"));
static INSTAGRAM_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?[a-zA-Z0-9._]{1,30}$").expect("valid regex"));
static PHONE_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("valid regex"));
static WEBSITE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)?([\da-z.-]+)\.([a-z.]{2,6})([/\w .-]*)*/?$")
        .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: FieldName,
    pub message: String,
}

/// Outcome of validating the whole form.
///
/// `all_errors` keeps rule order and includes the hidden fields;
/// `visible_errors` only holds fields the user can edit directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    pub visible_errors: FieldErrors,
    pub all_errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.all_errors.is_empty()
    }

    pub fn error_for(&self, field: FieldName) -> Option<&str> {
        self.all_errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Form-level message for failures of programmatically filled fields.
    pub fn hidden_field_banner(&self) -> Option<String> {
        let hidden: Vec<String> = self
            .all_errors
            .iter()
            .filter(|error| error.field.is_hidden())
            .map(|error| format!("{}: {}", error.field.label(), error.message))
            .collect();

        if hidden.is_empty() {
            return None;
        }

        Some(format!(
            "Form validation failed: {}. Please select a time slot again.",
            hidden.join("; ")
        ))
    }
}

fn shape_rule(field: FieldName) -> Option<(&'static LazyLock<Regex>, &'static str)> {
    match field {
        FieldName::Name => Some((
            &NAME_PATTERN,
            "Name must be 2-50 characters and contain only letters, numbers, spaces, hyphens, and apostrophes",
        )),
        FieldName::Email => Some((&EMAIL_PATTERN, "Please enter a valid email address")),
        FieldName::StartTime => Some((
            &START_TIME_PATTERN,
            "Start time is required and must be in valid format",
        )),
        FieldName::Timezone => Some((
            &TIMEZONE_PATTERN,
            "Timezone must be in valid format (e.g., Africa/Cairo or UTC)",
        )),
        FieldName::SalesConversion => Some((
            &SALES_CONVERSION_PATTERN,
            "Please enter a valid number (0 or positive)",
        )),
        FieldName::InstagramId => Some((
            &INSTAGRAM_ID_PATTERN,
            "Please enter a valid Instagram ID (1-30 characters)",
        )),
        FieldName::PhoneNumber => Some((
            &PHONE_NUMBER_PATTERN,
            "Please enter a valid phone number with country code",
        )),
        FieldName::Website => Some((
            &WEBSITE_PATTERN,
            "Please enter a valid website URL or leave blank",
        )),
        FieldName::BusinessStage
        | FieldName::WebsiteNeed
        | FieldName::DecisionMaker
        | FieldName::Description => None,
    }
}

fn is_required(field: FieldName) -> bool {
    !matches!(field, FieldName::Website | FieldName::Description)
}

fn required_message(field: FieldName) -> String {
    let name = field.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{} is required", first.to_ascii_uppercase(), chars.as_str()),
        None => "Field is required".to_string(),
    }
}

/// Checks one field. Returns the message to show, or `None` when valid.
pub fn validate_field(field: FieldName, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return is_required(field).then(|| required_message(field));
    }

    match shape_rule(field) {
        Some((pattern, message)) if !pattern.is_match(value) => Some(message.to_string()),
        _ => None,
    }
}

pub fn validate_all(form: &FormData, additional: &AdditionalFields) -> ValidationReport {
    let checks = [
        (FieldName::Name, form.name.as_str()),
        (FieldName::Email, form.email.as_str()),
        (FieldName::StartTime, form.start_time.as_str()),
        (FieldName::Timezone, form.timezone.as_str()),
        (FieldName::BusinessStage, additional.business_stage.as_str()),
        (FieldName::WebsiteNeed, additional.website_need.as_str()),
        (FieldName::SalesConversion, additional.sales_conversion.as_str()),
        (FieldName::InstagramId, additional.instagram_id.as_str()),
        (FieldName::DecisionMaker, additional.decision_maker.as_str()),
        (FieldName::PhoneNumber, additional.phone_number.as_str()),
        (FieldName::Website, additional.website.as_str()),
    ];

    let mut report = ValidationReport::default();
    for (field, value) in checks {
        let Some(message) = validate_field(field, value) else {
            continue;
        };
        if !field.is_hidden() {
            report.visible_errors.insert(field, message.clone());
        }
        report.all_errors.push(FieldError { field, message });
    }
    report
}
