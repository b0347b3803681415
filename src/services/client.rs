//! Backend HTTP client
//!
//! Shared plumbing for the attendee and conference sources: timeouts, bearer
//! authentication, spacing between consecutive requests and retry with
//! exponential backoff. Client errors (4xx) are never retried.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::utils::errors::{ConsoleError, Result, SourceError};

/// HTTP client bound to one backend base URL
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    config: ApiConfig,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl ApiClient {
    /// Create a new ApiClient instance
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("ConfDesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConsoleError::Http)?;

        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path relative to the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// GET a JSON document, retrying transient failures
    pub async fn get_json(
        &self,
        source_name: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value> {
        let url = self.endpoint(path)?;
        let attempts = self.config.max_retries.max(1);
        let mut attempt = 0;

        loop {
            self.wait_for_slot().await;
            debug!(source = source_name, url = %url, attempt = attempt + 1, "Making backend request");

            let error = match self.send_once(source_name, &url, params).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            attempt += 1;
            if !error.is_retryable() || attempt >= attempts {
                return Err(error.into());
            }

            let delay = self.backoff_delay(attempt - 1);
            warn!(
                source = source_name,
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Backend request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Delay before retry number `retry` (0-based): `base * 2^retry`
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.config.retry_base_delay().saturating_mul(factor)
    }

    async fn send_once(
        &self,
        source_name: &str,
        url: &Url,
        params: &[(&str, String)],
    ) -> std::result::Result<Value, SourceError> {
        let mut request = self.client.get(url.clone()).query(params);
        if let Some(ref token) = self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(source_name, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::HttpStatus {
                source_name: source_name.to_string(),
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::InvalidResponse {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })
    }

    /// Keep at least `min_request_interval` between consecutive requests
    async fn wait_for_slot(&self) {
        let interval = self.config.min_request_interval();
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

fn map_transport_error(source_name: &str, error: &reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout {
            source_name: source_name.to_string(),
        }
    } else {
        SourceError::Unavailable {
            source_name: source_name.to_string(),
            message: error.to_string(),
        }
    }
}

/// Pull a human-readable message out of a backend error body
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        value
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| {
                value
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
    });

    message.unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}
