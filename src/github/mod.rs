use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use http::header::{ACCEPT, AUTHORIZATION};
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde_json::value::RawValue;
use tracing::debug;
use url::Url;

use crate::repository::TargetRef;

mod branch_protection;
#[cfg(test)]
pub mod fake;
pub mod types;

/// Media type pinned on every request.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// What came back from a request that completed at the transport level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response: DNS, connect, TLS, timeout...
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("request to {target} did not complete: {message}")]
pub struct TransportError {
    pub target: String,
    pub message: String,
}

/// Seam between the protector and the network.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait ProtectionTransport: Send + Sync {
    async fn put_protection(
        &self,
        target: &TargetRef,
        payload: &RawValue,
    ) -> Result<TransportResponse, TransportError>;
}

pub struct Github {
    client: Octocrab,
}

impl Github {
    /// Builds a client authenticated with a personal access token.
    ///
    /// The token goes out as `Authorization: token <credential>`, not as
    /// octocrab's `Bearer` auth. Retries are off.
    pub fn new(api_url: &Url, token: &str, timeout: Duration) -> Result<Self> {
        debug!("Building GitHub client for {}", api_url);

        let client = Octocrab::builder()
            .base_uri(api_url.as_str())
            .map_err(|e| anyhow!("Invalid GitHub API URL {}: {}", api_url, e))?
            .add_retry_config(RetryConfig::None)
            .add_header(AUTHORIZATION, format!("token {token}"))
            .add_header(ACCEPT, GITHUB_ACCEPT.to_string())
            .set_connect_timeout(Some(timeout))
            .set_read_timeout(Some(timeout))
            .set_write_timeout(Some(timeout))
            .build()
            .map_err(|e| anyhow!("Failed to create GitHub client: {}", e))?;

        Ok(Github { client })
    }
}
