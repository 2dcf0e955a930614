use crate::domain::models::{AvailableDaysEntry, DayAvailability, TimeSlot};
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::collections::{BTreeMap, BTreeSet};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Result of a fetch that may be abandoned through its cancellation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Completed(T),
    Cancelled,
}

#[async_trait]
pub trait AvailabilityGateway: Send + Sync {
    /// Rows for every year in `years`, merged in ascending year order.
    async fn fetch_available_days(
        &self,
        years: &BTreeSet<i32>,
        timezone: &str,
        token: &CancellationToken,
    ) -> Result<FetchOutcome<Vec<AvailableDaysEntry>>, InfraError>;

    async fn fetch_day_slots(
        &self,
        date: NaiveDate,
        timezone: &str,
        token: &CancellationToken,
    ) -> Result<FetchOutcome<Vec<TimeSlot>>, InfraError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAvailabilityClient {
    client: Client,
    base_url: Url,
}

impl ReqwestAvailabilityClient {
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

    async fn fetch_year(
        client: Client,
        endpoint: Url,
        year: i32,
        timezone: String,
    ) -> Result<(i32, Vec<AvailableDaysEntry>), InfraError> {
        let response = client
            .get(endpoint)
            .query(&[("year", year.to_string()), ("timezone", timezone)])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| {
                InfraError::Http(format!("network error while fetching available days: {error}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            InfraError::Http(format!("failed reading available days response: {error}"))
        })?;

        if !status.is_success() {
            return Err(InfraError::Http(format!(
                "Failed to fetch available days for year {year}: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )));
        }

        let entries: Vec<AvailableDaysEntry> = serde_json::from_str(&body).map_err(|error| {
            InfraError::Http(format!("invalid available days payload: {error}; body={body}"))
        })?;
        Ok((year, entries))
    }

    async fn fetch_day(
        &self,
        date: NaiveDate,
        timezone: &str,
    ) -> Result<Vec<TimeSlot>, InfraError> {
        let endpoint = endpoint(&self.base_url, &["availability", "day"])?;
        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("date", date.format("%Y-%m-%d").to_string()),
                ("timezone", timezone.to_string()),
            ])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| {
                InfraError::Http(format!("network error while fetching day slots: {error}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            InfraError::Http(format!("failed reading day slots response: {error}"))
        })?;

        if !status.is_success() {
            return Err(InfraError::Http(format!(
                "Failed to fetch slots: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )));
        }

        let parsed: DayAvailability = serde_json::from_str(&body).map_err(|error| {
            InfraError::Http(format!("invalid day slots payload: {error}; body={body}"))
        })?;
        Ok(parsed.slots)
    }
}

/// `base_url` with `segments` appended as path segments.
pub(crate) fn endpoint(base_url: &Url, segments: &[&str]) -> Result<Url, InfraError> {
    let mut url = base_url.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| InfraError::InvalidConfig("api base URL cannot be a base".to_string()))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

#[async_trait]
impl AvailabilityGateway for ReqwestAvailabilityClient {
    async fn fetch_available_days(
        &self,
        years: &BTreeSet<i32>,
        timezone: &str,
        token: &CancellationToken,
    ) -> Result<FetchOutcome<Vec<AvailableDaysEntry>>, InfraError> {
        if token.is_cancelled() {
            return Ok(FetchOutcome::Cancelled);
        }
        if years.is_empty() {
            return Ok(FetchOutcome::Completed(Vec::new()));
        }

        let year_endpoint = endpoint(&self.base_url, &["availability", "year"])?;
        let mut tasks: JoinSet<Result<(i32, Vec<AvailableDaysEntry>), InfraError>> = JoinSet::new();
        for year in years {
            tasks.spawn(Self::fetch_year(
                self.client.clone(),
                year_endpoint.clone(),
                *year,
                timezone.to_string(),
            ));
        }

        let mut by_year = BTreeMap::new();
        loop {
            let joined = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tasks.abort_all();
                    return Ok(FetchOutcome::Cancelled);
                }
                joined = tasks.join_next() => joined,
            };
            let Some(join_result) = joined else {
                break;
            };
            let (year, entries) = join_result.map_err(|error| {
                InfraError::Http(format!("failed to join available days task: {error}"))
            })??;
            by_year.insert(year, entries);
        }

        Ok(FetchOutcome::Completed(
            by_year.into_values().flatten().collect(),
        ))
    }

    async fn fetch_day_slots(
        &self,
        date: NaiveDate,
        timezone: &str,
        token: &CancellationToken,
    ) -> Result<FetchOutcome<Vec<TimeSlot>>, InfraError> {
        if token.is_cancelled() {
            return Ok(FetchOutcome::Cancelled);
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => Ok(FetchOutcome::Cancelled),
            slots = self.fetch_day(date, timezone) => slots.map(FetchOutcome::Completed),
        }
    }
}
