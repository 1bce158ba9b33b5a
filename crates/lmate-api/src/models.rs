// Wire models for the L-Mate backend.
//
// Shapes mirror the JSON the backend emits (camelCase keys). Fields a
// backend may legitimately omit are optional so that a sparse body still
// decodes instead of tripping the mock fallback.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Onboarding ───────────────────────────────────────────────────────

/// DHCP lease reported by the zero-touch provisioning service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhcpLease {
    pub mac_address: Option<String>,
    /// Assigned address. A blank string on the wire means "not assigned".
    #[serde(default, deserialize_with = "blank_as_none")]
    pub ip: Option<IpAddr>,
    #[serde(default)]
    pub lease_start: Option<Timestamp>,
    #[serde(default)]
    pub lease_end: Option<Timestamp>,
}

impl DhcpLease {
    pub fn has_ip(&self) -> bool {
        self.ip.is_some()
    }
}

/// Onboarding workflow state, ordered `Pending < Running < Done`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OnboardingStatus {
    #[default]
    Pending,
    Running,
    Done,
}

/// Body of `/onboarding/ob-records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObRecord {
    pub status: OnboardingStatus,
}

/// Target environment for onboarding.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Dev,
    Qa,
    Prod,
}

/// Acknowledgement of `/onboarding/setOnboardingEnvironment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentAck {
    pub ok: bool,
    pub env: Environment,
    pub serial: String,
}

/// Acknowledgement of `/onboarding/trigger`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerAck {
    pub ok: bool,
    #[serde(default)]
    pub triggered_at: Option<Timestamp>,
    pub serial: String,
}

/// Acknowledgement of `/device/factory-reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetAck {
    pub ok: bool,
    pub serial: String,
}

// ── Device ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersions {
    pub current: String,
    pub latest: String,
}

/// Body of `/device/listDeviceRedisV2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceListing {
    pub active: bool,
    pub firmware: Option<FirmwareVersions>,
}

/// Body of `/device/deviceProvisioning`.
///
/// Overlay semantics: `current`/`latest` override only when non-null.
/// `progress`/`upgradeTime` override whenever the key is present, so an
/// explicit `null` clears the previous value while an absent key keeps it.
/// `upgradeTime` is kept verbatim when it is not a recognizable instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provisioning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub progress: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub upgrade_time: Option<Option<Timestamp>>,
}

/// Body of `/device/deviceHistory`. Event payloads are backend-defined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceHistory {
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

// ── Metrics ──────────────────────────────────────────────────────────

/// The seven metrics sampled on the fast cadence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
    strum::IntoStaticStr,
)]
pub enum MetricKind {
    #[strum(serialize = "ethernet-bytes-sent-usage")]
    #[serde(rename = "ethernet-bytes-sent-usage")]
    Egress,
    #[strum(serialize = "ethernet-bytes-rcvd-usage")]
    #[serde(rename = "ethernet-bytes-rcvd-usage")]
    Ingress,
    #[strum(serialize = "ping")]
    #[serde(rename = "ping")]
    Latency,
    #[strum(serialize = "cpu-usage")]
    #[serde(rename = "cpu-usage")]
    Cpu,
    #[strum(serialize = "memory-free")]
    #[serde(rename = "memory-free")]
    MemoryFree,
    #[strum(serialize = "optical-tx")]
    #[serde(rename = "optical-tx")]
    OpticalTx,
    #[strum(serialize = "optical-rx")]
    #[serde(rename = "optical-rx")]
    OpticalRx,
}

impl MetricKind {
    /// Backend path segment, e.g. `cpu-usage`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Inclusive range the mock generator draws from.
    pub fn mock_range(self) -> (i32, i32) {
        match self {
            Self::Egress => (100, 9_000),
            Self::Ingress => (200, 11_000),
            Self::Latency => (1, 50),
            Self::Cpu => (5, 95),
            Self::MemoryFree => (100, 8_000),
            Self::OpticalTx => (-10, -2),
            Self::OpticalRx => (-15, -5),
        }
    }

    /// Display unit for the metric.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Egress | Self::Ingress => "B",
            Self::Latency => "ms",
            Self::Cpu => "%",
            Self::MemoryFree => "MB",
            Self::OpticalTx | Self::OpticalRx => "dBm",
        }
    }
}

/// Timestamp as sent by the backend: epoch milliseconds (integral or
/// fractional) or free-form text such as ISO-8601 or a local clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(f64),
    Text(String),
}

impl Timestamp {
    /// The instant this names, when it names one.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            Self::EpochMillis(ms) if ms.is_finite() => {
                DateTime::from_timestamp_millis(ms.trunc() as i64)
            }
            Self::EpochMillis(_) => None,
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Text(dt.to_rfc3339())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.to_datetime(), self) {
            (Some(dt), _) => write!(f, "{}", dt.to_rfc3339()),
            (None, Self::EpochMillis(ms)) => write!(f, "{ms}"),
            (None, Self::Text(text)) => f.write_str(text),
        }
    }
}

/// Body of `/metrics/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub value: f64,
    #[serde(default)]
    pub ts: Option<Timestamp>,
}

// ── Serde helpers ────────────────────────────────────────────────────

/// Distinguish a present key (even `null`) from an absent one.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<IpAddr>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
