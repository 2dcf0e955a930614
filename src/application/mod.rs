pub mod availability_sync;
pub mod booking_submission;
pub mod bootstrap;
pub mod session;
