use super::types::{CalculateResponse, PricingOutcome};
use crate::errors::{ClientError, ClientResult};
use crate::request::PricingRequest;
use reqwest::Client;
use std::time::Duration;

pub const CALCULATE_PATH: &str = "/calculate";

/// Pricing service REST client. All methods return Result, never panic.
#[derive(Clone)]
pub struct PricingClient {
    client: Client,
    base_url: String,
}

impl PricingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .pool_max_idle_per_host(2)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client for an in-process stub service; ignores proxy settings.
    #[cfg(test)]
    pub fn local(base_url: &str) -> Self {
        Self::local_with_timeout(base_url, Duration::from_secs(5))
    }

    #[cfg(test)]
    pub fn local_with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .no_proxy()
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One POST per call. The body is parsed whatever the HTTP status:
    /// the service reports pricing failures as 400 with a JSON body.
    pub async fn calculate(&self, request: &PricingRequest) -> ClientResult<PricingOutcome> {
        let url = format!("{}{}", self.base_url, CALCULATE_PATH);

        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        let parsed: CalculateResponse = serde_json::from_str(&body).map_err(|e| {
            ClientError::Parse(format!("POST {CALCULATE_PATH} (HTTP {status}): {e}"))
        })?;

        tracing::debug!(status = status.as_u16(), success = ?parsed.success, "pricing response");

        parsed.into_outcome()
    }
}
