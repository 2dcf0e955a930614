//! Booking calendar core: month and slot availability, the booking flow
//! state machine, form validation and booking submission.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::{bootstrap_workspace, BootstrapResult};
pub use application::session::{BookingSession, SubmitOutcome, TimezoneOption};
pub use domain::calendar_state::{CalendarAction, CalendarState, MonthDirection};
pub use infrastructure::availability_client::ReqwestAvailabilityClient;
pub use infrastructure::booking_client::ReqwestBookingClient;
pub use infrastructure::config::BookingConfig;
pub use infrastructure::error::InfraError;
pub use infrastructure::submission_store::SqliteSubmissionMarkerStore;
