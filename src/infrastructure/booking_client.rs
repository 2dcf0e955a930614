use crate::domain::models::BookingPayload;
use crate::infrastructure::availability_client::endpoint;
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use url::Url;

const ERROR_DETAIL_LIMIT: usize = 200;

#[async_trait]
pub trait BookingService: Send + Sync {
    async fn create_booking(&self, payload: &BookingPayload) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBookingClient {
    client: Client,
    base_url: Url,
}

impl ReqwestBookingClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

/// Pretty-prints JSON error bodies; other bodies are returned as-is.
fn error_detail(is_json: bool, body: &str) -> String {
    if is_json {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                return pretty;
            }
        }
    }
    body.to_string()
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

#[async_trait]
impl BookingService for ReqwestBookingClient {
    async fn create_booking(&self, payload: &BookingPayload) -> Result<(), InfraError> {
        let endpoint = endpoint(&self.base_url, &["bookings", "create"])?;
        let response = self
            .client
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|error| {
                InfraError::Http(format!("network error while creating booking: {error}"))
            })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));
        let body = response
            .text()
            .await
            .map_err(|error| {
                InfraError::Http(format!("failed reading booking response: {error}"))
            })?;

        if !status.is_success() {
            let detail = error_detail(is_json, &body);
            tracing::warn!(status = status.as_u16(), body = %detail, "booking rejected by server");
            return Err(InfraError::BookingRejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                detail: truncate_chars(&detail, ERROR_DETAIL_LIMIT),
            });
        }
        Ok(())
    }
}
