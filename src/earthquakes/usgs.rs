//! USGS FDSN event service client.

use std::time::Duration;

use crate::config::{RetryConfig, UsgsConfig};
use crate::earthquakes::models::{DateRange, FeatureCollection};
use crate::observability::metrics;
use crate::resilience::retries::{is_retryable_error, is_retryable_status};
use crate::resilience::RetryPolicy;

/// Errors raised while querying the catalogue.
#[derive(Debug, thiserror::Error)]
pub enum UsgsError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("USGS returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl UsgsError {
    fn is_retryable(&self) -> bool {
        match self {
            UsgsError::Request(e) => is_retryable_error(e),
            UsgsError::Status { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map(is_retryable_status)
                .unwrap_or(false),
        }
    }
}

/// Client for the GeoJSON event query endpoint.
#[derive(Debug, Clone)]
pub struct UsgsClient {
    http: reqwest::Client,
    config: UsgsConfig,
    policy: RetryPolicy,
}

impl UsgsClient {
    pub fn new(config: UsgsConfig, retries: &RetryConfig, timeout: Duration) -> Result<Self, UsgsError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quake-finder/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            policy: RetryPolicy::from_config(retries),
        })
    }

    /// Fetch events in `range`, retrying transient failures with backoff.
    pub async fn fetch(&self, range: &DateRange) -> Result<FeatureCollection, UsgsError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.fetch_once(range).await {
                Ok(collection) => {
                    metrics::record_usgs_request("success");
                    tracing::debug!(
                        features = collection.features.len(),
                        attempts,
                        "Fetched earthquakes from USGS"
                    );
                    return Ok(collection);
                }
                Err(e) => {
                    let delay = if e.is_retryable() { self.policy.next_delay(attempts) } else { None };
                    match delay {
                        Some(delay) => {
                            metrics::record_usgs_request("retry");
                            tracing::info!(attempt = attempts, delay = ?delay, error = %e, "Retrying USGS request");
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            metrics::record_usgs_request("failure");
                            tracing::error!(attempt = attempts, error = %e, "USGS request failed");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    async fn fetch_once(&self, range: &DateRange) -> Result<FeatureCollection, UsgsError> {
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("starttime", range.start.to_string()),
                ("endtime", range.end.to_string()),
                ("minmagnitude", self.config.min_magnitude.to_string()),
                ("orderby", self.config.order_by.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UsgsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<FeatureCollection>().await?)
    }
}
