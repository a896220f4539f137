// ── Core error types ──
//
// User-facing errors from parkwatch-core. Consumers never see reqwest
// errors or JSON parse failures directly; the `From<parkwatch_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach monitoring API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Monitoring API timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {what}")]
    NotFound { what: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Export failed: {message}")]
    Export { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The single human-readable string views show in their error banner.
    ///
    /// Backend messages are passed through untouched (e.g. "Alert not
    /// found"); everything else uses the `Display` form.
    pub fn display_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::NotFound { what: message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, when the error came from a backend response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<parkwatch_api::Error> for CoreError {
    fn from(err: parkwatch_api::Error) -> Self {
        match err {
            // Timeouts already arrive as `Error::Timeout` with the configured limit.
            parkwatch_api::Error::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            parkwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid API URL: {e}"),
            },
            parkwatch_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            parkwatch_api::Error::Build(message) => CoreError::Config { message },
            parkwatch_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            parkwatch_api::Error::NotFound { path } => CoreError::NotFound { what: path },
            parkwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_passes_through() {
        let err = CoreError::from(parkwatch_api::Error::Http {
            status: 404,
            message: "Alert not found".into(),
        });
        assert_eq!(err.display_message(), "Alert not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn timeout_keeps_duration() {
        let err = CoreError::from(parkwatch_api::Error::Timeout { timeout_secs: 10 });
        assert_eq!(err.display_message(), "Monitoring API timed out after 10s");
    }

    #[test]
    fn missing_route_maps_to_not_found() {
        let err = CoreError::from(parkwatch_api::Error::NotFound {
            path: "/api/facilities/9/zones/".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
