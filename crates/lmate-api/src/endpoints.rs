// Endpoint wrappers
//
// One inherent method per backend path. Each takes the device serial and
// the mock generator to fall back to, so the live/mock duality stays a
// per-call strategy parameter.

use serde_json::json;
use url::form_urlencoded;

use crate::client::{ApiClient, Fetched, RequestOptions};
use crate::models::{
    DeviceHistory, DeviceListing, DhcpLease, Environment, EnvironmentAck, MetricKind,
    MetricReading, ObRecord, Provisioning, ResetAck, TriggerAck,
};

/// URL-encode a serial for use in a query string.
fn encode(serial: &str) -> String {
    form_urlencoded::byte_serialize(serial.as_bytes()).collect()
}

// ── Paths ────────────────────────────────────────────────────────────

pub fn dhcp_path(serial: &str) -> String {
    format!("/ztp/dhcp?serial={}", encode(serial))
}

pub fn ob_records_path(serial: &str) -> String {
    format!("/onboarding/ob-records?serial={}", encode(serial))
}

pub const SET_ENVIRONMENT_PATH: &str = "/onboarding/setOnboardingEnvironment";
pub const TRIGGER_PATH: &str = "/onboarding/trigger";
pub const FACTORY_RESET_PATH: &str = "/device/factory-reset";

pub fn list_device_path(serial: &str) -> String {
    format!("/device/listDeviceRedisV2?serial={}", encode(serial))
}

pub fn provisioning_path(serial: &str) -> String {
    format!("/device/deviceProvisioning?serial={}", encode(serial))
}

pub fn history_path(serial: &str) -> String {
    format!("/device/deviceHistory?serial={}", encode(serial))
}

pub fn metric_path(kind: MetricKind, serial: &str) -> String {
    format!("/metrics/{}?serial={}", kind.name(), encode(serial))
}

// ── Wrappers ─────────────────────────────────────────────────────────

impl ApiClient {
    /// Lease info from the zero-touch provisioning service.
    pub async fn dhcp(&self, serial: &str, mock: impl FnOnce() -> DhcpLease) -> Fetched<DhcpLease> {
        self.fetch_resilient(&dhcp_path(serial), &RequestOptions::default(), mock)
            .await
    }

    /// Onboarding record (status only).
    pub async fn ob_records(
        &self,
        serial: &str,
        mock: impl FnOnce() -> ObRecord,
    ) -> Fetched<ObRecord> {
        self.fetch_resilient(&ob_records_path(serial), &RequestOptions::default(), mock)
            .await
    }

    /// Select the onboarding environment.
    pub async fn set_onboarding_environment(
        &self,
        serial: &str,
        env: Environment,
        mock: impl FnOnce() -> EnvironmentAck,
    ) -> Fetched<EnvironmentAck> {
        let options = RequestOptions::post_json(json!({ "serial": serial, "env": env }));
        self.fetch_resilient(SET_ENVIRONMENT_PATH, &options, mock)
            .await
    }

    /// Start onboarding.
    pub async fn trigger_onboarding(
        &self,
        serial: &str,
        mock: impl FnOnce() -> TriggerAck,
    ) -> Fetched<TriggerAck> {
        let options = RequestOptions::post_json(json!({ "serial": serial }));
        self.fetch_resilient(TRIGGER_PATH, &options, mock).await
    }

    /// Reset the device to factory defaults.
    pub async fn factory_reset(
        &self,
        serial: &str,
        mock: impl FnOnce() -> ResetAck,
    ) -> Fetched<ResetAck> {
        let options = RequestOptions::post_json(json!({ "serial": serial }));
        self.fetch_resilient(FACTORY_RESET_PATH, &options, mock)
            .await
    }

    /// Device summary: activation flag and firmware versions.
    pub async fn list_device(
        &self,
        serial: &str,
        mock: impl FnOnce() -> DeviceListing,
    ) -> Fetched<DeviceListing> {
        self.fetch_resilient(&list_device_path(serial), &RequestOptions::default(), mock)
            .await
    }

    /// Firmware/provisioning progress.
    pub async fn device_provisioning(
        &self,
        serial: &str,
        mock: impl FnOnce() -> Provisioning,
    ) -> Fetched<Provisioning> {
        self.fetch_resilient(&provisioning_path(serial), &RequestOptions::default(), mock)
            .await
    }

    /// Device history events.
    pub async fn device_history(
        &self,
        serial: &str,
        mock: impl FnOnce() -> DeviceHistory,
    ) -> Fetched<DeviceHistory> {
        self.fetch_resilient(&history_path(serial), &RequestOptions::default(), mock)
            .await
    }

    /// One reading of a named metric.
    pub async fn metric(
        &self,
        kind: MetricKind,
        serial: &str,
        mock: impl FnOnce() -> MetricReading,
    ) -> Fetched<MetricReading> {
        self.fetch_resilient(&metric_path(kind, serial), &RequestOptions::default(), mock)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_is_query_encoded() {
        assert_eq!(dhcp_path("DEMO-123"), "/ztp/dhcp?serial=DEMO-123");
        assert_eq!(
            ob_records_path("A B&C"),
            "/onboarding/ob-records?serial=A+B%26C"
        );
    }

    #[test]
    fn metric_path_uses_backend_name() {
        assert_eq!(
            metric_path(MetricKind::Egress, "S1"),
            "/metrics/ethernet-bytes-sent-usage?serial=S1"
        );
        assert_eq!(metric_path(MetricKind::Latency, "S1"), "/metrics/ping?serial=S1");
    }
}
