use thiserror::Error;

/// Top-level error type for the `lmate-api` crate.
///
/// Every variant is a reason for the resilient path to fall back to its
/// mock generator. Only the strict [`fetch`](crate::ApiClient::fetch)
/// surfaces these to callers; `lmate-core` maps them into `CoreError`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, reset, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The bounded wait elapsed before the response was decoded.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Building the underlying HTTP client failed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// Backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the bounded wait elapsed or the transport timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if the backend could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Request URL, when the failure happened on the wire.
    pub fn url(&self) -> Option<&url::Url> {
        match self {
            Self::Transport(e) => e.url(),
            _ => None,
        }
    }

    /// HTTP status code, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn status_errors_expose_code() {
        let err = Error::Status {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
    }

    #[test]
    fn timeout_is_flagged() {
        let err = Error::Timeout { timeout_ms: 4000 };
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Request timed out after 4000ms");
    }
}
