// Shared transport configuration for building reqwest::Client instances.
//
// The resilient client enforces its own bounded wait per call; the
// transport only carries the knobs reqwest needs up front.

use std::time::Duration;

use crate::error::Error;

/// Default bounded wait for a single backend call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4_000);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Bounded wait for one call, covering connect, send, and decode.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Accept self-signed backend certificates.
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("lmate/", env!("CARGO_PKG_VERSION")).into(),
            accept_invalid_certs: false,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Only the connect phase is bounded here; the full-call bound is
    /// applied by [`ApiClient`](crate::ApiClient) so that elapsing drops
    /// the in-flight request future.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .connect_timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }

    /// Override the bounded wait.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_four_seconds() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(4_000));
        assert!(config.user_agent.starts_with("lmate/"));
    }

    #[test]
    fn builds_client_with_custom_timeout() {
        let config = TransportConfig::default().with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert!(config.build_client().is_ok());
    }
}
