pub mod calendar_state;
pub mod calendar_view;
pub mod civil_time;
pub mod error;
pub mod models;
pub mod slot_schedule;
pub mod validation;
