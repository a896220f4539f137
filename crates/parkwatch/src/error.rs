//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use parkwatch_config::ConfigError;
use parkwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the monitoring API at {url}")]
    #[diagnostic(
        code(parkwatch::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             URL: {url}\n\
             Override with --api-url or: parkwatch config set api_url <URL>"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(parkwatch::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {what}")]
    #[diagnostic(code(parkwatch::not_found))]
    NotFound { what: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(parkwatch::api_error))]
    Api { message: String, status: Option<u16> },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(parkwatch::validation))]
    Validation { field: String, reason: String },

    #[error("{operation} requires confirmation")]
    #[diagnostic(
        code(parkwatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { operation: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(parkwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: parkwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(parkwatch::config))]
    Config(ConfigError),

    // ── Export ───────────────────────────────────────────────────────
    #[error("Export failed: {message}")]
    #[diagnostic(code(parkwatch::export))]
    Export { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(parkwatch::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::Api { status: Some(404), .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::NotFound { what } => CliError::NotFound { what },
            CoreError::Api { message, status } => CliError::Api { message, status },
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Export { message } => CliError::Export { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_404_maps_to_not_found_exit_code() {
        let err = CliError::from(CoreError::Api {
            message: "Alert not found".into(),
            status: Some(404),
        });
        assert_eq!(err.to_string(), "Alert not found");
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn empty_selection_is_a_usage_error() {
        let err = CliError::from(CoreError::Validation {
            message: "No alerts selected".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn timeouts_have_their_own_code() {
        let err = CliError::from(CoreError::Timeout { timeout_secs: 10 });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
        assert_eq!(exit_code::SUCCESS, 0);
    }
}
