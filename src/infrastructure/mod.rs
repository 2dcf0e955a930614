pub mod availability_client;
pub mod booking_client;
pub mod config;
pub mod error;
#[cfg(test)]
pub(crate) mod loopback;
pub mod storage;
pub mod submission_store;
