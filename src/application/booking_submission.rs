use crate::domain::error::DomainError;
use crate::domain::models::{AdditionalFields, BookingPayload, FormData};
use crate::domain::validation::validate_all;
use crate::infrastructure::booking_client::BookingService;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::submission_store::SubmissionMarkerStore;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

const FALLBACK_TIMEZONE: &str = "UTC";
const SEPARATOR: &str = "────────────────────";

fn additional_information(additional: &AdditionalFields) -> String {
    format!(
        "Additional Information:\n{SEPARATOR}\n\
         Business Stage: {}\n\
         Website Need/Creation: {}\n\
         Last Month Sales & Conversion Rate: {}\n\
         Instagram ID: {}\n\
         Role: {}\n\
         Phone Number: {}\n\
         Website: {}\n",
        additional.business_stage.trim(),
        additional.website_need.trim(),
        additional.sales_conversion.trim(),
        additional.instagram_id.trim(),
        additional.decision_maker.trim(),
        additional.phone_number.trim(),
        additional.website.trim(),
    )
}

pub fn build_description(form: &FormData, additional: &AdditionalFields) -> String {
    let block = additional_information(additional);
    let free_text = form.description.trim();
    if free_text.is_empty() {
        block
    } else {
        format!("{free_text}\n\n{block}")
    }
}

/// Maps the confirmed form into the Booking Service request body.
pub fn build_payload(
    form: &FormData,
    additional: &AdditionalFields,
) -> Result<BookingPayload, DomainError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let start_time = form.start_time.trim();
    if name.is_empty() || email.is_empty() || start_time.is_empty() {
        return Err(DomainError::MissingRequiredFields);
    }

    let start = DateTime::parse_from_rfc3339(start_time)
        .map_err(|_| DomainError::InvalidStartTime(start_time.to_string()))?;
    let timezone = match form.timezone.trim() {
        "" => FALLBACK_TIMEZONE,
        timezone => timezone,
    };

    Ok(BookingPayload {
        name: name.to_string(),
        email: email.to_string(),
        slot_start_time: start
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        description: build_description(form, additional),
        timezone: timezone.to_string(),
    })
}

pub struct BookingSubmitter<B, S>
where
    B: BookingService,
    S: SubmissionMarkerStore,
{
    booking_service: Arc<B>,
    marker_store: Arc<S>,
}

impl<B, S> BookingSubmitter<B, S>
where
    B: BookingService,
    S: SubmissionMarkerStore,
{
    pub fn new(booking_service: Arc<B>, marker_store: Arc<S>) -> Self {
        Self {
            booking_service,
            marker_store,
        }
    }

    /// Validates, sends the booking and records the submitted marker.
    ///
    /// Nothing is sent when validation fails; the report comes back as
    /// [`InfraError::Validation`].
    pub async fn submit(
        &self,
        form: &FormData,
        additional: &AdditionalFields,
    ) -> Result<BookingPayload, InfraError> {
        let report = validate_all(form, additional);
        if !report.is_valid() {
            return Err(InfraError::Validation(report));
        }

        let payload = build_payload(form, additional)?;
        self.booking_service.create_booking(&payload).await?;
        tracing::info!(
            slot_start_time = %payload.slot_start_time,
            timezone = %payload.timezone,
            "booking created"
        );

        if let Err(error) = self.marker_store.mark_submitted() {
            tracing::warn!(%error, "failed to persist submission marker");
        }
        Ok(payload)
    }

    pub fn is_submitted(&self) -> Result<bool, InfraError> {
        self.marker_store.is_submitted()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::models::FieldName;
    use crate::domain::validation::FieldError;
    use crate::infrastructure::submission_store::InMemorySubmissionMarkerStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct FakeBookingService {
        pub calls: AtomicUsize,
        pub sent: Mutex<Vec<BookingPayload>>,
        pub reject_with: Mutex<Option<(u16, String)>>,
    }

    #[async_trait]
    impl BookingService for FakeBookingService {
        async fn create_booking(&self, payload: &BookingPayload) -> Result<(), InfraError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().expect("sent lock").push(payload.clone());
            if let Some((status, detail)) = self.reject_with.lock().expect("reject lock").clone() {
                return Err(InfraError::BookingRejected {
                    status,
                    reason: "Conflict".to_string(),
                    detail,
                });
            }
            Ok(())
        }
    }

    pub(crate) fn valid_form() -> (FormData, AdditionalFields) {
        (
            FormData {
                name: " Mona ".to_string(),
                email: "mona@example.com".to_string(),
                description: "  Need a new storefront  ".to_string(),
                start_time: "2026-01-10T11:00:00+02:00".to_string(),
                timezone: "Africa/Cairo".to_string(),
            },
            AdditionalFields {
                business_stage: "Growing".to_string(),
                website_need: "New website".to_string(),
                sales_conversion: "1500".to_string(),
                instagram_id: "@mona.shop".to_string(),
                decision_maker: "Owner".to_string(),
                phone_number: "+201001234567".to_string(),
                website: "mona.shop".to_string(),
            },
        )
    }

    #[test]
    fn payload_converts_start_to_utc_with_milliseconds() {
        let (form, additional) = valid_form();
        let payload = build_payload(&form, &additional).expect("valid payload");

        assert_eq!(payload.name, "Mona");
        assert_eq!(payload.slot_start_time, "2026-01-10T09:00:00.000Z");
        assert_eq!(payload.timezone, "Africa/Cairo");
        assert_eq!(
            payload.description,
            "Need a new storefront\n\n\
             Additional Information:\n\
             ────────────────────\n\
             Business Stage: Growing\n\
             Website Need/Creation: New website\n\
             Last Month Sales & Conversion Rate: 1500\n\
             Instagram ID: @mona.shop\n\
             Role: Owner\n\
             Phone Number: +201001234567\n\
             Website: mona.shop\n"
        );
    }

    #[test]
    fn payload_defaults_timezone_and_rejects_missing_fields() {
        let (mut form, additional) = valid_form();
        form.timezone = "  ".to_string();
        assert_eq!(
            build_payload(&form, &additional).expect("valid payload").timezone,
            "UTC"
        );

        form.email = String::new();
        assert_eq!(
            build_payload(&form, &additional),
            Err(DomainError::MissingRequiredFields)
        );

        let (mut form, additional) = valid_form();
        form.start_time = "tomorrow".to_string();
        assert_eq!(
            build_payload(&form, &additional),
            Err(DomainError::InvalidStartTime("tomorrow".to_string()))
        );
    }

    #[test]
    fn description_without_free_text_is_only_the_block() {
        let (mut form, additional) = valid_form();
        form.description = "   ".to_string();
        assert!(build_description(&form, &additional).starts_with("Additional Information:\n"));
    }

    #[tokio::test]
    async fn missing_business_stage_blocks_the_network_call() {
        let service = Arc::new(FakeBookingService::default());
        let markers = Arc::new(InMemorySubmissionMarkerStore::default());
        let submitter = BookingSubmitter::new(Arc::clone(&service), Arc::clone(&markers));
        let (form, mut additional) = valid_form();
        additional.business_stage = String::new();

        let result = submitter.submit(&form, &additional).await;

        let Err(InfraError::Validation(report)) = result else {
            panic!("expected validation failure");
        };
        assert!(report.all_errors.contains(&FieldError {
            field: FieldName::BusinessStage,
            message: "BusinessStage is required".to_string(),
        }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(!markers.is_submitted().expect("read marker"));
    }

    #[tokio::test]
    async fn successful_submission_persists_the_marker() {
        let service = Arc::new(FakeBookingService::default());
        let markers = Arc::new(InMemorySubmissionMarkerStore::default());
        let submitter = BookingSubmitter::new(Arc::clone(&service), Arc::clone(&markers));
        let (form, additional) = valid_form();

        let payload = submitter.submit(&form, &additional).await.expect("submitted");

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.sent.lock().expect("sent lock")[0], payload);
        assert!(submitter.is_submitted().expect("read marker"));
    }

    #[tokio::test]
    async fn rejected_submission_leaves_the_marker_unset() {
        let service = Arc::new(FakeBookingService::default());
        *service.reject_with.lock().expect("reject lock") = Some((409, "slot taken".to_string()));
        let markers = Arc::new(InMemorySubmissionMarkerStore::default());
        let submitter = BookingSubmitter::new(Arc::clone(&service), Arc::clone(&markers));
        let (form, additional) = valid_form();

        let result = submitter.submit(&form, &additional).await;

        assert!(matches!(result, Err(InfraError::BookingRejected { status: 409, .. })));
        assert!(!markers.is_submitted().expect("read marker"));
    }
}
