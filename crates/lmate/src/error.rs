//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use lmate_config::ConfigError;
use lmate_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(lmate::unreachable),
        help(
            "Check that the backend is running and the API root is correct.\n\
             Reason: {reason}\n\
             Try: lmate status --base-url http://<host>:<port>/api\n\
             Or drop --strict to fall back to mock data."
        )
    )]
    Unreachable { url: String, reason: String },

    #[error("Backend fell back to mock data for: {groups}")]
    #[diagnostic(
        code(lmate::mock_fallback),
        help(
            "--strict refuses synthetic data. Check the backend for these endpoints,\n\
             or drop --strict to accept mock values."
        )
    )]
    MockFallback { groups: String },

    #[error("Backend did not answer within {timeout_ms}ms")]
    #[diagnostic(
        code(lmate::timeout),
        help("Increase the bound with --timeout-ms or check backend responsiveness.")
    )]
    Timeout { timeout_ms: u64 },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(lmate::api_error))]
    ApiError { code: String, message: String },

    #[error("Backend rejected '{operation}' for device {serial}")]
    #[diagnostic(
        code(lmate::rejected),
        help("The backend answered with ok=false. Check the device state and retry.")
    )]
    Rejected { operation: String, serial: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lmate::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(lmate::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: lmate config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(lmate::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(lmate::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(lmate::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(lmate::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(lmate::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } | Self::MockFallback { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Rejected { .. } => exit_code::CONFLICT,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unreachable { url, reason } => CliError::Unreachable { url, reason },

            CoreError::Timeout { timeout_ms } => CliError::Timeout { timeout_ms },

            CoreError::Rejected { operation, serial } => CliError::Rejected { operation, serial },

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "decode".into(), |s| s.to_string()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let unreachable = CliError::from(CoreError::Unreachable {
            url: "http://127.0.0.1:1/api".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);

        let timeout = CliError::from(CoreError::Timeout { timeout_ms: 4000 });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let api = CliError::from(CoreError::Api {
            message: "boom".into(),
            status: Some(500),
        });
        assert_eq!(api.exit_code(), exit_code::GENERAL);
        assert_eq!(api.to_string(), "API error (500): boom");
    }

    #[test]
    fn mock_fallback_is_a_connection_error() {
        let err = CliError::MockFallback {
            groups: "dhcp, provisioning".into(),
        };
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
        assert_eq!(
            err.to_string(),
            "Backend fell back to mock data for: dhcp, provisioning"
        );
    }

    #[test]
    fn confirmation_is_a_usage_error() {
        let err = CliError::NonInteractiveRequiresYes {
            action: "factory reset".into(),
        };
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
