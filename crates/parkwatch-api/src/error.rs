use thiserror::Error;

/// Top-level error type for the `parkwatch-api` crate.
///
/// Covers every failure mode of the monitoring backend's REST surface:
/// transport, HTTP status, and payload decoding. `parkwatch-core` maps
/// these into user-facing messages.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-2xx response. `message` prefers the backend's `{"error": "..."}`
    /// body, falling back to a truncated body preview.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 404 from the backend.
    #[error("Not found: {path}")]
    NotFound { path: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
