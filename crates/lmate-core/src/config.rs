// ── Runtime dashboard configuration ──
//
// Describes which backend and device to poll and how often. Never touches
// disk: the CLI resolves a profile and hands a `DashboardConfig` in.

use std::time::Duration;

use lmate_api::{DEFAULT_TIMEOUT, Environment, TransportConfig};
use url::Url;

use crate::series::MAX_SAMPLES;

pub const DEFAULT_PROVISIONING_INTERVAL: Duration = Duration::from_millis(3_000);
pub const DEFAULT_METRICS_INTERVAL: Duration = Duration::from_millis(1_000);

/// Configuration for polling a single device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// API root, e.g. `http://127.0.0.1:8080/api`.
    pub base_url: Url,
    /// Device serial sent as the `serial` query/body parameter.
    pub serial: String,
    /// Bounded wait per backend call.
    pub timeout: Duration,
    /// Provisioning/device cadence. Zero disables the task.
    pub provisioning_interval: Duration,
    /// Metrics cadence. Zero disables the task.
    pub metrics_interval: Duration,
    /// Capacity of each metric series.
    pub history_len: usize,
    /// Onboarding environment shown before the backend acknowledges one.
    pub environment: Environment,
    /// Accept self-signed backend certificates.
    pub accept_invalid_certs: bool,
}

impl DashboardConfig {
    /// Config for `serial` at `base_url` with default cadences and capacity.
    pub fn new(base_url: Url, serial: impl Into<String>) -> Self {
        Self {
            base_url,
            serial: serial.into(),
            timeout: DEFAULT_TIMEOUT,
            provisioning_interval: DEFAULT_PROVISIONING_INTERVAL,
            metrics_interval: DEFAULT_METRICS_INTERVAL,
            history_len: MAX_SAMPLES,
            environment: Environment::default(),
            accept_invalid_certs: false,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            accept_invalid_certs: self.accept_invalid_certs,
            ..TransportConfig::default()
        }
        .with_timeout(self.timeout)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_cadences() {
        let cfg = DashboardConfig::new(Url::parse("http://10.0.0.5/api").unwrap(), "S1");
        assert_eq!(cfg.timeout, Duration::from_millis(4_000));
        assert_eq!(cfg.provisioning_interval, Duration::from_millis(3_000));
        assert_eq!(cfg.metrics_interval, Duration::from_millis(1_000));
        assert_eq!(cfg.history_len, 30);
        assert_eq!(cfg.environment, Environment::Dev);
    }

    #[test]
    fn transport_carries_timeout() {
        let mut cfg = DashboardConfig::new(Url::parse("http://10.0.0.5/api").unwrap(), "S1");
        cfg.timeout = Duration::from_millis(250);
        cfg.accept_invalid_certs = true;
        let transport = cfg.transport();
        assert_eq!(transport.timeout, Duration::from_millis(250));
        assert!(transport.accept_invalid_certs);
    }
}
