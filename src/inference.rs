//! Health probing of the external inference server.
//!
//! The server is treated as an opaque HTTP service; the only contract relied
//! on here is that `GET {server_url}health` answers 200 while it is healthy.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::errors::{CoreError, CoreResult};

pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy { reason: String },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    fn unhealthy(reason: impl Into<String>) -> Self {
        HealthStatus::Unhealthy {
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct InferenceClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl Default for InferenceClient {
    fn default() -> Self {
        Self::new(DEFAULT_HEALTH_TIMEOUT)
    }
}

impl InferenceClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// Probe `server_url`. Whichever of the request and the timeout settles
    /// first decides the status; the losing future is dropped, which aborts
    /// an in-flight request.
    pub async fn health(&self, server_url: &str) -> HealthStatus {
        let url = match health_url(server_url) {
            Ok(url) => url,
            Err(e) => return HealthStatus::unhealthy(e.message()),
        };

        debug!("Probing inference server at {}", url);
        let request = self.http.get(url.clone()).send();

        tokio::select! {
            response = request => match response {
                Ok(response) if response.status() == reqwest::StatusCode::OK => {
                    HealthStatus::Healthy
                }
                Ok(response) => {
                    warn!("Inference server {} answered {}", url, response.status());
                    HealthStatus::unhealthy(format!("Server answered {}", response.status()))
                }
                Err(e) => {
                    warn!("Inference server {} unreachable: {}", url, e);
                    HealthStatus::unhealthy(format!("Server unreachable: {}", e))
                }
            },
            _ = tokio::time::sleep(self.timeout) => {
                warn!("Inference server {} did not answer within {:?}", url, self.timeout);
                HealthStatus::unhealthy(format!(
                    "No answer within {} ms",
                    self.timeout.as_millis()
                ))
            }
        }
    }
}

/// `{server_url}health`, with a trailing `/` added to the base when missing
pub fn health_url(server_url: &str) -> CoreResult<Url> {
    let base = if server_url.ends_with('/') {
        server_url.to_string()
    } else {
        format!("{}/", server_url)
    };

    Url::parse(&base)
        .and_then(|base| base.join("health"))
        .map_err(|e| {
            CoreError::validation(format!("Invalid inference server URL '{}'", server_url))
                .with_field("url", server_url)
                .with_source(e)
        })
}

/// Turn a degraded status into an error for operations that need the server
pub fn require_healthy(status: &HealthStatus) -> CoreResult<()> {
    match status {
        HealthStatus::Healthy => Ok(()),
        HealthStatus::Unhealthy { reason } => Err(CoreError::unavailable(format!(
            "Inference server unavailable: {}",
            reason
        ))),
    }
}
