//! HTTP client for the profile API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;

use gh_core::Row;

use crate::config::ApiConfig;
use crate::DataError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Envelope the backend wraps every dataset response in.
#[derive(Debug, Deserialize)]
struct DataPayload {
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
    #[serde(default)]
    data: Vec<Row>,
}

/// Anything that can produce the full row set. Lets the cache be tested
/// without a live backend.
#[async_trait]
pub trait RowFetcher: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<Row>, DataError>;
}

/// Client for the profile API's `/data` endpoint.
pub struct ProfileApiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ProfileApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, DataError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ghdash/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.data_endpoint(),
        })
    }

    /// Single request against the data endpoint.
    pub async fn fetch(&self) -> Result<Vec<Row>, DataError> {
        tracing::debug!(endpoint = %self.endpoint, "requesting dataset");

        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "dataset request failed");
            return Err(DataError::Status(status.as_u16()));
        }

        let payload: DataPayload = response.json().await?;
        tracing::info!(rows = payload.data.len(), "dataset received");
        Ok(payload.data)
    }

    /// Fetch with a couple of retries for transient failures. A non-success
    /// status is retried too; the backend occasionally 502s behind its proxy.
    pub async fn fetch_with_retry(&self) -> Result<Vec<Row>, DataError> {
        let mut last_error = None;
        for attempt in 0..=RETRY_ATTEMPTS {
            if attempt > 0 {
                tracing::debug!(attempt, "retrying dataset request");
                tokio::time::sleep(RETRY_DELAY * attempt).await;
            }
            match self.fetch().await {
                Ok(rows) => return Ok(rows),
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "dataset request attempt failed");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| DataError::Http("no attempts made".to_string())))
    }
}

#[async_trait]
impl RowFetcher for ProfileApiClient {
    async fn fetch_rows(&self) -> Result<Vec<Row>, DataError> {
        self.fetch_with_retry().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_envelope_decodes() {
        let payload: DataPayload = serde_json::from_value(json!({
            "message": "Data fetched successfully",
            "data": [
                { "Country": "France", "Followers": 12 },
                { "Country": "Japan" },
            ],
        }))
        .unwrap();
        assert_eq!(payload.data.len(), 2);
        assert_eq!(payload.data[0].country, "France");
        assert_eq!(payload.data[0].followers, 12);
    }

    #[test]
    fn payload_tolerates_missing_fields() {
        let payload: DataPayload = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(payload.data.is_empty());
    }
}
