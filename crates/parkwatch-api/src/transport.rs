// Shared transport configuration for building reqwest::Client instances.
//
// Every request to the monitoring backend carries JSON content headers and
// a fixed timeout; this module keeps that builder logic in one place.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::error::Error;

/// Default request timeout used by the dashboard backend.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("parkwatch/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// `Content-Type: application/json` and `Accept: application/json` are
    /// installed as default headers so every request carries them.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Build(e.to_string()))
    }
}
