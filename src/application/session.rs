//! Page-level controller for the booking calendar.
//!
//! [`BookingSession`] owns the [`CalendarState`], runs every interaction
//! through the reducer and works out which availability fetches the new
//! state needs. Fetch results are applied only while their ticket is current,
//! so an older response can never overwrite a newer one.

use crate::application::availability_sync::{
    days_key, slots_key, AvailabilitySync, DaysFetch, DaysKey, FetchKind, PendingFetches,
    SlotsFetch, SlotsKey,
};
use crate::application::booking_submission::BookingSubmitter;
use crate::domain::calendar_state::{
    self, reduce, CalendarAction, CalendarState, ConfirmedSlot, MonthDirection,
};
use crate::domain::calendar_view::{
    month_grid, month_heading, selected_date_time_label, step_title, timezone_option_label,
};
use crate::domain::civil_time::{format_display_time, parse_timezone, today_in};
use crate::domain::error::DomainError;
use crate::domain::models::{AvailabilityIndex, AvailableDaysEntry, TimeSlot, ViewState};
use crate::domain::slot_schedule::{from_display_timezone, SlotSchedule};
use crate::infrastructure::availability_client::{AvailabilityGateway, FetchOutcome};
use crate::infrastructure::booking_client::BookingService;
use crate::infrastructure::config::BookingConfig;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::submission_store::SubmissionMarkerStore;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// Validation failed; field errors and the banner are in the state.
    Rejected,
    Failed(String),
}

/// A selectable display timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneOption {
    pub id: String,
    pub label: String,
}

pub struct BookingSession<G, B, S>
where
    G: AvailabilityGateway,
    B: BookingService,
    S: SubmissionMarkerStore,
{
    state: CalendarState,
    sync: AvailabilitySync,
    last_days_key: Option<DaysKey>,
    last_slots_key: Option<SlotsKey>,
    gateway: Arc<G>,
    submitter: BookingSubmitter<B, S>,
    base_timezone: Tz,
    display_timezones: Vec<Tz>,
    schedule: SlotSchedule,
    now_provider: NowProvider,
}

impl<G, B, S> BookingSession<G, B, S>
where
    G: AvailabilityGateway,
    B: BookingService,
    S: SubmissionMarkerStore,
{
    pub fn new(
        config: &BookingConfig,
        gateway: Arc<G>,
        booking_service: Arc<B>,
        marker_store: Arc<S>,
    ) -> Self {
        let default_timezone = config.default_timezone;
        let today = today_in(Utc::now(), default_timezone);
        Self {
            state: CalendarState::new(today, default_timezone.name()),
            sync: AvailabilitySync::new(),
            last_days_key: None,
            last_slots_key: None,
            gateway,
            submitter: BookingSubmitter::new(booking_service, marker_store),
            base_timezone: config.base_timezone,
            display_timezones: config.display_timezones.clone(),
            schedule: config.schedule.clone(),
            now_provider: Arc::new(Utc::now),
        }
    }

    /// Replaces the clock and restarts the state from the new `today`.
    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        let timezone = self.display_timezone();
        self.state = CalendarState::new(self.today(), timezone.name());
        self.last_days_key = None;
        self.last_slots_key = None;
        self
    }

    pub fn state(&self) -> &CalendarState {
        &self.state
    }

    fn now(&self) -> DateTime<Utc> {
        (self.now_provider)()
    }

    pub fn display_timezone(&self) -> Tz {
        parse_timezone(&self.state.timezone).unwrap_or(self.base_timezone)
    }

    /// Today's date in the active display timezone.
    pub fn today(&self) -> NaiveDate {
        today_in(self.now(), self.display_timezone())
    }

    /// Fetches required before the first render.
    pub fn start(&mut self) -> PendingFetches {
        self.schedule_fetches()
    }

    pub fn dispatch(&mut self, action: CalendarAction) -> PendingFetches {
        if let CalendarAction::UpdateTimezone(timezone) = &action {
            if let Err(error) = parse_timezone(timezone) {
                tracing::warn!(%error, "ignoring unknown display timezone");
                return PendingFetches::default();
            }
        }

        let entering_form = self.state.view_state != ViewState::DetailsForm;
        self.apply(action);
        if entering_form && self.state.view_state == ViewState::DetailsForm {
            self.restore_submission_marker();
        }
        self.schedule_fetches()
    }

    /// Dispatches `action` and awaits the fetches it triggers.
    pub async fn dispatch_and_refresh(&mut self, action: CalendarAction) {
        let pending = self.dispatch(action);
        self.run_pending(pending).await;
    }

    pub fn set_timezone(&mut self, timezone: &str) -> Result<PendingFetches, DomainError> {
        let timezone = parse_timezone(timezone)?;
        Ok(self.dispatch(CalendarAction::UpdateTimezone(timezone.name().to_string())))
    }

    /// Confirms the selected time label, preferring the matching live slot
    /// and otherwise mapping the label back to the base timezone.
    pub fn confirm_selected_time(&mut self) -> PendingFetches {
        let resolved = self
            .state
            .selected_time
            .clone()
            .and_then(|label| {
                self.matching_live_slot(&label)
                    .or_else(|| self.wall_clock_slot(&label))
            });
        self.dispatch(CalendarAction::ConfirmTime { resolved })
    }

    fn matching_live_slot(&self, label: &str) -> Option<ConfirmedSlot> {
        let display = self.display_timezone();
        let slot = self
            .state
            .day_slots
            .iter()
            .find(|slot| {
                format_display_time(slot.start_time.with_timezone(&Utc), display) == label
            })?;
        Some(ConfirmedSlot::Live {
            start: slot.start_time,
            timezone: self
                .state
                .day_slots_timezone
                .clone()
                .unwrap_or_else(|| self.state.timezone.clone()),
        })
    }

    fn wall_clock_slot(&self, label: &str) -> Option<ConfirmedSlot> {
        let date = self.state.selected_date.as_ref()?.date()?;
        match from_display_timezone(label, self.display_timezone(), self.base_timezone, date) {
            Ok(base_label) => Some(ConfirmedSlot::WallClock {
                label: base_label,
                timezone: self.base_timezone.name().to_string(),
            }),
            Err(error) => {
                tracing::warn!(%error, label, "could not map time label to base timezone");
                None
            }
        }
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        self.apply(CalendarAction::SubmissionStarted);
        let result = self
            .submitter
            .submit(&self.state.form_data, &self.state.additional_fields)
            .await;

        match result {
            Ok(_) => {
                self.apply(CalendarAction::SubmissionSucceeded);
                SubmitOutcome::Submitted
            }
            Err(InfraError::Validation(report)) => {
                tracing::debug!(errors = report.all_errors.len(), "booking form rejected");
                self.apply(CalendarAction::SubmissionRejected(report));
                SubmitOutcome::Rejected
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(%message, "booking submission failed");
                self.apply(CalendarAction::SubmissionFailed(message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Runs `pending` concurrently and applies whatever is still current.
    pub async fn run_pending(&mut self, pending: PendingFetches) {
        if pending.is_empty() {
            return;
        }
        let gateway = Arc::clone(&self.gateway);
        let days = async {
            match &pending.days {
                Some(fetch) => Some(fetch.run(&*gateway).await),
                None => None,
            }
        };
        let slots = async {
            match &pending.slots {
                Some(fetch) => Some(fetch.run(&*gateway).await),
                None => None,
            }
        };
        let (days_result, slots_result) = tokio::join!(days, slots);

        if let (Some(fetch), Some(result)) = (&pending.days, days_result) {
            self.apply_days_result(fetch, result);
        }
        if let (Some(fetch), Some(result)) = (&pending.slots, slots_result) {
            self.apply_slots_result(fetch, result);
        }
    }

    pub fn apply_days_result(
        &mut self,
        fetch: &DaysFetch,
        result: Result<FetchOutcome<Vec<AvailableDaysEntry>>, InfraError>,
    ) {
        if !self.sync.finish(&fetch.ticket) {
            tracing::debug!(
                generation = fetch.ticket.generation,
                "discarding stale available days"
            );
            return;
        }
        let entries = match result {
            Ok(FetchOutcome::Completed(entries)) => entries,
            Ok(FetchOutcome::Cancelled) => return,
            Err(error) => {
                tracing::warn!(%error, years = ?fetch.years, "failed to load available days");
                Vec::new()
            }
        };

        let (index, report) = AvailabilityIndex::from_entries(&entries);
        if !report.skipped_months.is_empty() {
            tracing::warn!(months = ?report.skipped_months, "skipped unknown month abbreviations");
        }
        if !report.conflicting_keys.is_empty() {
            tracing::warn!(keys = ?report.conflicting_keys, "merged conflicting availability rows");
        }
        self.apply(CalendarAction::AvailableDaysLoaded(index));
    }

    pub fn apply_slots_result(
        &mut self,
        fetch: &SlotsFetch,
        result: Result<FetchOutcome<Vec<TimeSlot>>, InfraError>,
    ) {
        if !self.sync.finish(&fetch.ticket) {
            tracing::debug!(generation = fetch.ticket.generation, "discarding stale day slots");
            return;
        }
        let slots = match result {
            Ok(FetchOutcome::Completed(slots)) => slots,
            Ok(FetchOutcome::Cancelled) => return,
            Err(error) => {
                tracing::warn!(%error, date = %fetch.date, "failed to load day slots");
                Vec::new()
            }
        };
        self.apply(CalendarAction::DaySlotsLoaded {
            timezone: fetch.timezone.clone(),
            slots,
        });
    }

    /// Time labels for the selected day: live slots when present, otherwise
    /// the fallback schedule, both in the display timezone.
    pub fn available_times(&self) -> Vec<String> {
        let display = self.display_timezone();
        if !self.state.day_slots.is_empty() {
            return self
                .state
                .day_slots
                .iter()
                .map(|slot| format_display_time(slot.start_time.with_timezone(&Utc), display))
                .collect();
        }
        match self.schedule.display_labels(display, self.now()) {
            Ok(labels) => labels,
            Err(error) => {
                tracing::warn!(%error, "fallback schedule is unusable");
                Vec::new()
            }
        }
    }

    pub fn is_day_disabled(&self, day: u32) -> bool {
        calendar_state::is_day_disabled(&self.state, day, self.today())
    }

    pub fn can_navigate(&self, direction: MonthDirection) -> bool {
        calendar_state::can_navigate(&self.state, direction, self.today())
    }

    pub fn calendar_grid(&self) -> Vec<Option<u32>> {
        month_grid(self.state.cursor)
    }

    pub fn month_heading(&self) -> String {
        month_heading(self.state.cursor)
    }

    pub fn title(&self) -> &'static str {
        step_title(self.state.view_state, &self.state.submission)
    }

    pub fn selected_label(&self) -> Option<String> {
        let date = self.state.selected_date.as_ref()?;
        let time = self.state.selected_time.as_deref()?;
        Some(selected_date_time_label(date, time)).filter(|label| !label.is_empty())
    }

    pub fn timezone_options(&self) -> Vec<TimezoneOption> {
        let now = self.now();
        self.display_timezones
            .iter()
            .map(|timezone| TimezoneOption {
                id: timezone.name().to_string(),
                label: timezone_option_label(*timezone, now),
            })
            .collect()
    }

    pub fn is_loading_days(&self) -> bool {
        self.sync.is_in_flight(FetchKind::Days)
    }

    pub fn is_loading_slots(&self) -> bool {
        self.sync.is_in_flight(FetchKind::Slots)
    }

    fn apply(&mut self, action: CalendarAction) {
        let today = self.today();
        self.state = reduce(self.state.clone(), action, today);
    }

    fn restore_submission_marker(&mut self) {
        match self.submitter.is_submitted() {
            Ok(true) => self.apply(CalendarAction::SubmissionSucceeded),
            Ok(false) => {}
            Err(error) => tracing::warn!(%error, "failed to read submission marker"),
        }
    }

    fn schedule_fetches(&mut self) -> PendingFetches {
        let mut pending = PendingFetches::default();

        let days = days_key(&self.state);
        if self.last_days_key.as_ref() != Some(&days) {
            let ticket = self.sync.begin(FetchKind::Days);
            pending.days = Some(DaysFetch::new(ticket, &days, self.today()));
            self.last_days_key = Some(days);
        }

        let slots = slots_key(&self.state);
        if slots != self.last_slots_key {
            match &slots {
                Some(key) => {
                    let ticket = self.sync.begin(FetchKind::Slots);
                    pending.slots = Some(SlotsFetch::new(ticket, key));
                }
                None => {
                    self.sync.cancel(FetchKind::Slots);
                    self.apply(CalendarAction::DaySlotsCleared);
                }
            }
            self.last_slots_key = slots;
        }

        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::booking_submission::tests::FakeBookingService;
    use crate::domain::models::{
        AdditionalField, FieldName, FormField, SlotStatus, SubmissionStatus,
    };
    use crate::infrastructure::submission_store::InMemorySubmissionMarkerStore;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;
    use url::Url;

    #[derive(Default)]
    struct FakeGateway {
        days: Vec<AvailableDaysEntry>,
        slots: Vec<TimeSlot>,
        fail_days: bool,
        fail_slots: bool,
        day_calls: AtomicUsize,
        slot_calls: AtomicUsize,
    }

    #[async_trait]
    impl AvailabilityGateway for FakeGateway {
        async fn fetch_available_days(
            &self,
            _years: &BTreeSet<i32>,
            _timezone: &str,
            _token: &CancellationToken,
        ) -> Result<FetchOutcome<Vec<AvailableDaysEntry>>, InfraError> {
            self.day_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_days {
                return Err(InfraError::Http(
                    "Failed to fetch available days for year 2026: 500 Internal Server Error"
                        .to_string(),
                ));
            }
            Ok(FetchOutcome::Completed(self.days.clone()))
        }

        async fn fetch_day_slots(
            &self,
            _date: NaiveDate,
            _timezone: &str,
            _token: &CancellationToken,
        ) -> Result<FetchOutcome<Vec<TimeSlot>>, InfraError> {
            self.slot_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_slots {
                return Err(InfraError::Http(
                    "Failed to fetch slots: 500 Internal Server Error".to_string(),
                ));
            }
            Ok(FetchOutcome::Completed(self.slots.clone()))
        }
    }

    type TestSession =
        BookingSession<FakeGateway, FakeBookingService, InMemorySubmissionMarkerStore>;

    fn config() -> BookingConfig {
        BookingConfig {
            api_base_url: Url::parse("http://127.0.0.1:9/api").expect("valid url"),
            base_timezone: chrono_tz::Africa::Cairo,
            default_timezone: chrono_tz::Africa::Cairo,
            display_timezones: vec![
                chrono_tz::Africa::Cairo,
                chrono_tz::Asia::Dubai,
                chrono_tz::Asia::Riyadh,
            ],
            schedule: SlotSchedule::default(),
        }
    }

    fn entry(year: i32, month: &str, days: &[u32]) -> AvailableDaysEntry {
        AvailableDaysEntry {
            year,
            month: month.to_string(),
            available_days: days.to_vec(),
        }
    }

    fn slot(start: &str, end: &str, status: SlotStatus) -> TimeSlot {
        TimeSlot {
            start_time: DateTime::parse_from_rfc3339(start).expect("valid start"),
            end_time: DateTime::parse_from_rfc3339(end).expect("valid end"),
            status,
        }
    }

    fn cairo_gateway() -> FakeGateway {
        FakeGateway {
            days: vec![entry(2026, "Jan", &[12, 14]), entry(2026, "Feb", &[3])],
            slots: vec![
                slot(
                    "2026-01-12T13:00:00.000+02:00",
                    "2026-01-12T13:15:00.000+02:00",
                    SlotStatus::Available,
                ),
                slot(
                    "2026-01-12T13:15:00.000+02:00",
                    "2026-01-12T13:30:00.000+02:00",
                    SlotStatus::Unavailable,
                ),
            ],
            ..FakeGateway::default()
        }
    }

    struct Harness {
        session: TestSession,
        gateway: Arc<FakeGateway>,
        service: Arc<FakeBookingService>,
        markers: Arc<InMemorySubmissionMarkerStore>,
    }

    fn harness(gateway: FakeGateway) -> Harness {
        let gateway = Arc::new(gateway);
        let service = Arc::new(FakeBookingService::default());
        let markers = Arc::new(InMemorySubmissionMarkerStore::default());
        let now = DateTime::parse_from_rfc3339("2026-01-02T08:00:00Z")
            .expect("valid now")
            .with_timezone(&Utc);
        let session = BookingSession::new(
            &config(),
            Arc::clone(&gateway),
            Arc::clone(&service),
            Arc::clone(&markers),
        )
        .with_now_provider(Arc::new(move || now));
        Harness {
            session,
            gateway,
            service,
            markers,
        }
    }

    async fn open_on_day(session: &mut TestSession, day: u32) {
        let pending = session.start();
        session.run_pending(pending).await;
        session.dispatch_and_refresh(CalendarAction::OpenCalendar).await;
        session
            .dispatch_and_refresh(CalendarAction::SelectDay {
                day,
                month0: 0,
                year: 2026,
            })
            .await;
    }

    fn fill_details(session: &mut TestSession) {
        for (field, value) in [
            (FormField::Name, "Mona"),
            (FormField::Email, "mona@example.com"),
        ] {
            session.dispatch(CalendarAction::UpdateFormField {
                field,
                value: value.to_string(),
            });
        }
        for (field, value) in [
            (AdditionalField::BusinessStage, "Growing"),
            (AdditionalField::WebsiteNeed, "New website"),
            (AdditionalField::SalesConversion, "1500"),
            (AdditionalField::InstagramId, "@mona.shop"),
            (AdditionalField::DecisionMaker, "Owner"),
            (AdditionalField::PhoneNumber, "+201001234567"),
        ] {
            session.dispatch(CalendarAction::UpdateAdditionalField {
                field,
                value: value.to_string(),
            });
        }
    }

    #[tokio::test]
    async fn cairo_booking_flows_from_day_to_payload() {
        let Harness {
            mut session,
            gateway,
            service,
            markers,
        } = harness(cairo_gateway());

        open_on_day(&mut session, 12).await;
        assert_eq!(session.state().view_state, ViewState::TimeSelection);
        assert_eq!(gateway.day_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.available_times(), vec!["1:00 PM".to_string()]);
        assert_eq!(session.title(), "SELECT A TIME");

        session.dispatch(CalendarAction::SelectTime("1:00 PM".to_string()));
        assert_eq!(
            session.selected_label().as_deref(),
            Some("1:00pm, Monday, January 12, 2026")
        );
        session.confirm_selected_time();

        assert_eq!(session.state().view_state, ViewState::DetailsForm);
        assert_eq!(session.state().form_data.start_time, "2026-01-12T13:00:00+02:00");
        assert_eq!(session.state().form_data.timezone, "Africa/Cairo");
        assert!(session.state().day_slots.is_empty());

        fill_details(&mut session);
        assert_eq!(session.submit().await, SubmitOutcome::Submitted);

        let sent = service.sent.lock().expect("sent lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].slot_start_time, "2026-01-12T11:00:00.000Z");
        assert_eq!(sent[0].timezone, "Africa/Cairo");
        assert!(markers.is_submitted().expect("read marker"));
        assert_eq!(session.title(), "SUCCESS");
    }

    #[tokio::test]
    async fn dubai_fallback_labels_confirm_in_the_display_timezone() {
        let Harness { mut session, .. } = harness(FakeGateway {
            fail_slots: true,
            ..cairo_gateway()
        });

        let pending = session.set_timezone("Asia/Dubai").expect("known timezone");
        session.run_pending(pending).await;
        open_on_day(&mut session, 12).await;

        let times = session.available_times();
        assert_eq!(times.len(), 21);
        assert_eq!(times.first().map(String::as_str), Some("2:00 PM"));

        session.dispatch(CalendarAction::SelectTime("3:00 PM".to_string()));
        session.confirm_selected_time();

        assert_eq!(session.state().form_data.start_time, "2026-01-12T15:00:00+04:00");
        assert_eq!(session.state().form_data.timezone, "Asia/Dubai");
    }

    #[tokio::test]
    async fn newer_days_fetch_wins_over_a_late_older_one() {
        let Harness { mut session, .. } = harness(cairo_gateway());

        let january = session.start().days.expect("initial days fetch");
        session.dispatch(CalendarAction::OpenCalendar);
        let february = session
            .dispatch(CalendarAction::NavigateMonth(MonthDirection::Next))
            .days
            .expect("days fetch for the next month");
        assert!(january.ticket.token.is_cancelled());

        session.apply_days_result(
            &february,
            Ok(FetchOutcome::Completed(vec![entry(2026, "Feb", &[3])])),
        );
        session.apply_days_result(
            &january,
            Ok(FetchOutcome::Completed(vec![entry(2026, "Jan", &[12])])),
        );

        let index = &session.state().available_days;
        assert!(index.is_available(2026, 1, 3));
        assert!(!index.is_available(2026, 0, 12));
        assert!(!session.is_loading_days());
    }

    #[tokio::test]
    async fn fetch_failures_degrade_to_empty_data() {
        let Harness { mut session, .. } = harness(FakeGateway {
            fail_days: true,
            ..FakeGateway::default()
        });

        let pending = session.start();
        session.run_pending(pending).await;
        session.dispatch_and_refresh(CalendarAction::OpenCalendar).await;

        assert!(session.state().available_days.is_empty());
        assert!((1..=31).all(|day| session.is_day_disabled(day)));
        assert_eq!(session.title(), "SELECT A DAY");
    }

    #[tokio::test]
    async fn leaving_time_selection_cancels_the_slot_fetch() {
        let Harness { mut session, .. } = harness(cairo_gateway());
        let pending = session.start();
        session.run_pending(pending).await;
        session.dispatch(CalendarAction::OpenCalendar);

        let slots = session
            .dispatch(CalendarAction::SelectDay {
                day: 12,
                month0: 0,
                year: 2026,
            })
            .slots
            .expect("slot fetch issued");
        assert!(session.is_loading_slots());

        session.dispatch(CalendarAction::GoBack);
        assert!(slots.ticket.token.is_cancelled());
        assert!(!session.is_loading_slots());

        session.apply_slots_result(&slots, Ok(FetchOutcome::Completed(cairo_gateway().slots)));
        assert!(session.state().day_slots.is_empty());
    }

    #[tokio::test]
    async fn persisted_marker_shows_success_on_the_form() {
        let Harness {
            mut session,
            markers,
            ..
        } = harness(cairo_gateway());
        markers.mark_submitted().expect("set marker");

        open_on_day(&mut session, 12).await;
        session.dispatch(CalendarAction::SelectTime("1:00 PM".to_string()));
        session.confirm_selected_time();

        assert_eq!(session.state().submission, SubmissionStatus::Succeeded);
        assert_eq!(session.title(), "SUCCESS");
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_without_a_network_call() {
        let Harness {
            mut session,
            service,
            ..
        } = harness(cairo_gateway());
        open_on_day(&mut session, 12).await;
        session.dispatch(CalendarAction::SelectTime("1:00 PM".to_string()));
        session.confirm_selected_time();
        fill_details(&mut session);
        session.dispatch(CalendarAction::UpdateAdditionalField {
            field: AdditionalField::BusinessStage,
            value: String::new(),
        });

        assert_eq!(session.submit().await, SubmitOutcome::Rejected);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            session
                .state()
                .field_errors
                .get(&FieldName::BusinessStage)
                .map(String::as_str),
            Some("BusinessStage is required")
        );
        assert_eq!(session.state().submission, SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn server_rejection_is_reported_in_the_banner() {
        let Harness {
            mut session,
            service,
            ..
        } = harness(cairo_gateway());
        *service.reject_with.lock().expect("reject lock") = Some((409, "slot taken".to_string()));
        open_on_day(&mut session, 12).await;
        session.dispatch(CalendarAction::SelectTime("1:00 PM".to_string()));
        session.confirm_selected_time();
        fill_details(&mut session);

        let outcome = session.submit().await;

        let expected = "Failed to create booking: 409 Conflict. slot taken".to_string();
        assert_eq!(outcome, SubmitOutcome::Failed(expected.clone()));
        assert_eq!(session.state().banner.as_deref(), Some(expected.as_str()));
        session.dispatch(CalendarAction::BannerDismissed);
        assert_eq!(session.state().submission, SubmissionStatus::Idle);
    }

    #[test]
    fn unknown_timezones_are_rejected() {
        let Harness { mut session, .. } = harness(cairo_gateway());
        assert!(matches!(
            session.set_timezone("Mars/Olympus"),
            Err(DomainError::UnknownTimezone(_))
        ));
        assert!(session
            .dispatch(CalendarAction::UpdateTimezone("Mars/Olympus".to_string()))
            .is_empty());
        assert_eq!(session.state().timezone, "Africa/Cairo");
    }

    #[test]
    fn timezone_options_show_the_current_local_time() {
        let Harness { session, .. } = harness(cairo_gateway());
        let options = session.timezone_options();
        assert_eq!(
            options,
            vec![
                TimezoneOption {
                    id: "Africa/Cairo".to_string(),
                    label: "Africa / Cairo (10:00 AM)".to_string(),
                },
                TimezoneOption {
                    id: "Asia/Dubai".to_string(),
                    label: "Asia / Dubai (12:00 PM)".to_string(),
                },
                TimezoneOption {
                    id: "Asia/Riyadh".to_string(),
                    label: "Asia / Riyadh (11:00 AM)".to_string(),
                },
            ]
        );
        assert_eq!(session.month_heading(), "JANUARY");
        assert_eq!(session.calendar_grid().len(), 36);
        assert!(!session.can_navigate(MonthDirection::Previous));
        assert!(session.can_navigate(MonthDirection::Next));
    }
}
