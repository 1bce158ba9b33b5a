// ── Core error types ──
//
// Errors from lmate-core. The polling path never produces these; they come
// from construction, strict probing, and acknowledged device operations.
// The `From<lmate_api::Error>` impl translates transport-layer errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Backend did not answer within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected by backend: {operation} for {serial}")]
    Rejected { operation: String, serial: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if the backend answered).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lmate_api::Error> for CoreError {
    fn from(err: lmate_api::Error) -> Self {
        match err {
            lmate_api::Error::Timeout { timeout_ms } => CoreError::Timeout { timeout_ms },
            other @ lmate_api::Error::Transport(_) if other.is_unreachable() => {
                CoreError::Unreachable {
                    url: other.url().map_or_else(String::new, ToString::to_string),
                    reason: other.to_string(),
                }
            }
            lmate_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid backend URL: {e}"),
            },
            lmate_api::Error::ClientBuild(message) => CoreError::Config { message },
            lmate_api::Error::Status { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            lmate_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("unexpected response shape: {message}"),
                status: None,
            },
            other @ lmate_api::Error::Transport(_) => CoreError::Api {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
