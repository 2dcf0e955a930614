use crate::domain::calendar_state::{years_to_fetch, CalendarState};
use crate::domain::models::{AvailableDaysEntry, MonthCursor, TimeSlot, ViewState};
use crate::infrastructure::availability_client::{AvailabilityGateway, FetchOutcome};
use crate::infrastructure::error::InfraError;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Days,
    Slots,
}

/// Identifies one issued fetch. Only the newest ticket per kind is current.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub kind: FetchKind,
    pub generation: u64,
    pub token: CancellationToken,
}

#[derive(Debug, Default)]
struct Lane {
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl Lane {
    fn supersede(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.generation += 1;
    }
}

/// Supersession bookkeeping for the day-availability and slot fetches.
#[derive(Debug, Default)]
pub struct AvailabilitySync {
    days: Lane,
    slots: Lane,
}

impl AvailabilitySync {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane(&self, kind: FetchKind) -> &Lane {
        match kind {
            FetchKind::Days => &self.days,
            FetchKind::Slots => &self.slots,
        }
    }

    fn lane_mut(&mut self, kind: FetchKind) -> &mut Lane {
        match kind {
            FetchKind::Days => &mut self.days,
            FetchKind::Slots => &mut self.slots,
        }
    }

    /// Cancels the in-flight fetch of `kind`, if any, and issues a new ticket.
    pub fn begin(&mut self, kind: FetchKind) -> FetchTicket {
        let lane = self.lane_mut(kind);
        let superseded = lane.in_flight.is_some();
        lane.supersede();
        let token = CancellationToken::new();
        lane.in_flight = Some(token.clone());
        if superseded {
            tracing::debug!(
                ?kind,
                generation = lane.generation,
                "superseded in-flight availability fetch"
            );
        }
        FetchTicket {
            kind,
            generation: lane.generation,
            token,
        }
    }

    /// Cancels the in-flight fetch of `kind` without issuing a replacement.
    pub fn cancel(&mut self, kind: FetchKind) {
        let lane = self.lane_mut(kind);
        if lane.in_flight.is_some() {
            tracing::debug!(?kind, "cancelled availability fetch");
        }
        lane.supersede();
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        let lane = self.lane(ticket.kind);
        lane.generation == ticket.generation && !ticket.token.is_cancelled()
    }

    /// Marks `ticket` as finished. Returns whether it was still current.
    pub fn finish(&mut self, ticket: &FetchTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.lane_mut(ticket.kind).in_flight = None;
        true
    }

    pub fn is_in_flight(&self, kind: FetchKind) -> bool {
        self.lane(kind).in_flight.is_some()
    }
}

/// The state that determines which days are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaysKey {
    pub cursor: MonthCursor,
    pub timezone: String,
}

/// The state that determines which slots are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotsKey {
    pub date: NaiveDate,
    pub timezone: String,
}

pub fn days_key(state: &CalendarState) -> DaysKey {
    DaysKey {
        cursor: state.cursor,
        timezone: state.timezone.clone(),
    }
}

pub fn slots_key(state: &CalendarState) -> Option<SlotsKey> {
    if state.view_state != ViewState::TimeSelection {
        return None;
    }
    let date = state.selected_date.as_ref()?.date()?;
    Some(SlotsKey {
        date,
        timezone: state.timezone.clone(),
    })
}

#[derive(Debug, Clone)]
pub struct DaysFetch {
    pub ticket: FetchTicket,
    pub years: BTreeSet<i32>,
    pub timezone: String,
}

impl DaysFetch {
    pub fn new(ticket: FetchTicket, key: &DaysKey, today: NaiveDate) -> Self {
        Self {
            ticket,
            years: years_to_fetch(key.cursor, today),
            timezone: key.timezone.clone(),
        }
    }

    pub async fn run<G>(
        &self,
        gateway: &G,
    ) -> Result<FetchOutcome<Vec<AvailableDaysEntry>>, InfraError>
    where
        G: AvailabilityGateway + ?Sized,
    {
        tracing::debug!(years = ?self.years, timezone = %self.timezone, "fetching available days");
        gateway
            .fetch_available_days(&self.years, &self.timezone, &self.ticket.token)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct SlotsFetch {
    pub ticket: FetchTicket,
    pub date: NaiveDate,
    pub timezone: String,
}

impl SlotsFetch {
    pub fn new(ticket: FetchTicket, key: &SlotsKey) -> Self {
        Self {
            ticket,
            date: key.date,
            timezone: key.timezone.clone(),
        }
    }

    pub async fn run<G>(&self, gateway: &G) -> Result<FetchOutcome<Vec<TimeSlot>>, InfraError>
    where
        G: AvailabilityGateway + ?Sized,
    {
        tracing::debug!(date = %self.date, timezone = %self.timezone, "fetching day slots");
        gateway
            .fetch_day_slots(self.date, &self.timezone, &self.ticket.token)
            .await
    }
}

/// Fetches a dispatch made necessary.
#[derive(Debug, Clone, Default)]
pub struct PendingFetches {
    pub days: Option<DaysFetch>,
    pub slots: Option<SlotsFetch>,
}

impl PendingFetches {
    pub fn is_empty(&self) -> bool {
        self.days.is_none() && self.slots.is_none()
    }
}
