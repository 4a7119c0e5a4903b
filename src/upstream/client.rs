//! HTTP client for protected upstream calls.

use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::ResponseMode;

/// Failure of a single upstream call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Request failed with status code {0}")]
    Status(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Invalid upstream response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_decode() {
            UpstreamError::Decode(e)
        } else {
            UpstreamError::Transport(e)
        }
    }
}

/// Shared client used by every endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    inner: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("breaker-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(UpstreamError::Transport)?;
        Ok(Self { inner })
    }

    /// GET `url` and shape the response according to `mode`.
    pub async fn fetch(&self, url: &str, mode: ResponseMode) -> Result<Value, UpstreamError> {
        let response = self.inner.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        match mode {
            ResponseMode::Status => Ok(json!({ "status": status.as_u16() })),
            ResponseMode::Body => Ok(response.json::<Value>().await?),
        }
    }
}
