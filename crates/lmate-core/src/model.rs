// ── Device snapshot ──
//
// Everything the dashboard knows about one device: onboarding progress,
// activation, firmware, and the port/service plan. Replaced wholesale on
// every provisioning tick; see `DeviceSnapshot::merged`.

use chrono::{DateTime, Utc};
use lmate_api::{
    DeviceListing, DhcpLease, Environment, Fetched, ObRecord, OnboardingStatus, Provisioning,
    Source, Timestamp,
};
use serde::Serialize;

use lmate_api::mock::{MOCK_CURRENT_FIRMWARE, MOCK_LATEST_FIRMWARE};

// ── Onboarding ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Onboarding {
    pub dhcp: DhcpLease,
    pub status: OnboardingStatus,
    pub environment: Environment,
}

// ── Device ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Firmware {
    pub current: String,
    pub latest: String,
    /// Upgrade progress in percent; `None` when no upgrade is running.
    pub progress: Option<f64>,
    /// When the last upgrade completed, as reported by the backend.
    pub upgrade_time: Option<Timestamp>,
}

impl Default for Firmware {
    fn default() -> Self {
        Self {
            current: MOCK_CURRENT_FIRMWARE.into(),
            latest: MOCK_LATEST_FIRMWARE.into(),
            progress: None,
            upgrade_time: None,
        }
    }
}

impl Firmware {
    /// Shallow overlay: non-null versions replace, and any present
    /// progress/upgrade-time key replaces, even when `null`.
    pub fn overlaid(&self, prov: &Provisioning) -> Self {
        Self {
            current: prov.current.clone().unwrap_or_else(|| self.current.clone()),
            latest: prov.latest.clone().unwrap_or_else(|| self.latest.clone()),
            progress: prov.progress.unwrap_or(self.progress),
            upgrade_time: prov
                .upgrade_time
                .clone()
                .unwrap_or_else(|| self.upgrade_time.clone()),
        }
    }

    /// An upgrade is in flight while progress is reported.
    pub fn is_upgrading(&self) -> bool {
        self.progress.is_some()
    }

    pub fn is_outdated(&self) -> bool {
        self.current != self.latest
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdminState {
    Up,
    Down,
}

/// One planned port change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortConfig {
    pub name: String,
    pub speed: String,
    pub vlans: String,
    pub admin: AdminState,
    pub applied: bool,
}

/// One provisioned service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    pub id: String,
    pub bandwidth: String,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceState {
    pub active: bool,
    pub firmware: Firmware,
    pub port_config: Vec<PortConfig>,
    pub services: Vec<Service>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            active: false,
            firmware: Firmware::default(),
            port_config: vec![
                PortConfig {
                    name: "1/1".into(),
                    speed: "1 Gb".into(),
                    vlans: "10,20".into(),
                    admin: AdminState::Up,
                    applied: false,
                },
                PortConfig {
                    name: "1/2".into(),
                    speed: "10 Gb".into(),
                    vlans: "30".into(),
                    admin: AdminState::Down,
                    applied: false,
                },
            ],
            services: vec![
                Service {
                    id: "IOD-101".into(),
                    bandwidth: "1 Gb".into(),
                    applied: false,
                },
                Service {
                    id: "EOD-202".into(),
                    bandwidth: "100 Mb".into(),
                    applied: false,
                },
            ],
        }
    }
}

// ── Provenance ───────────────────────────────────────────────────────

/// Source of each field group as of the last provisioning tick.
/// `None` until the first tick lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub dhcp: Option<Source>,
    pub onboarding: Option<Source>,
    pub listing: Option<Source>,
    pub provisioning: Option<Source>,
}

impl Provenance {
    fn sources(&self) -> [Option<Source>; 4] {
        [self.dhcp, self.onboarding, self.listing, self.provisioning]
    }

    /// `true` once every group has been fetched live.
    pub fn all_live(&self) -> bool {
        self.sources().iter().all(|s| *s == Some(Source::Live))
    }

    /// `true` if any group in the last tick was synthesized.
    pub fn any_mock(&self) -> bool {
        self.sources().contains(&Some(Source::Mock))
    }

    /// Names of the groups synthesized in the last tick.
    pub fn mocked(&self) -> Vec<&'static str> {
        ["dhcp", "onboarding", "listing", "provisioning"]
            .into_iter()
            .zip(self.sources())
            .filter(|(_, source)| *source == Some(Source::Mock))
            .map(|(name, _)| name)
            .collect()
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub serial: String,
    pub onboarding: Onboarding,
    pub device: DeviceState,
    pub provenance: Provenance,
    /// Number of provisioning ticks applied.
    pub ticks: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The four fetch outcomes of one provisioning tick.
#[derive(Debug, Clone)]
pub struct ProvisioningTick {
    pub dhcp: Fetched<DhcpLease>,
    pub onboarding: Fetched<ObRecord>,
    pub listing: Fetched<DeviceListing>,
    pub provisioning: Fetched<Provisioning>,
}

impl DeviceSnapshot {
    /// Snapshot before any tick: no lease, onboarding pending, device
    /// inactive, nothing applied.
    pub fn initial(serial: impl Into<String>, environment: Environment) -> Self {
        Self {
            serial: serial.into(),
            onboarding: Onboarding {
                dhcp: DhcpLease::default(),
                status: OnboardingStatus::Pending,
                environment,
            },
            device: DeviceState::default(),
            provenance: Provenance::default(),
            ticks: 0,
            updated_at: None,
        }
    }

    /// Apply one tick: lease, status and activation replace outright,
    /// provisioning overlays the firmware. The environment and the
    /// port/service plan carry over.
    pub fn merged(&self, tick: ProvisioningTick) -> Self {
        Self {
            serial: self.serial.clone(),
            onboarding: Onboarding {
                dhcp: tick.dhcp.value,
                status: tick.onboarding.value.status,
                environment: self.onboarding.environment,
            },
            device: DeviceState {
                active: tick.listing.value.active,
                firmware: self.device.firmware.overlaid(&tick.provisioning.value),
                port_config: self.device.port_config.clone(),
                services: self.device.services.clone(),
            },
            provenance: Provenance {
                dhcp: Some(tick.dhcp.source),
                onboarding: Some(tick.onboarding.source),
                listing: Some(tick.listing.source),
                provisioning: Some(tick.provisioning.source),
            },
            ticks: self.ticks + 1,
            updated_at: Some(Utc::now()),
        }
    }

    pub fn with_environment(&self, environment: Environment) -> Self {
        let mut next = self.clone();
        next.onboarding.environment = environment;
        next
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::{IpAddr, Ipv4Addr};

    fn tick(prov: Provisioning) -> ProvisioningTick {
        ProvisioningTick {
            dhcp: Fetched::live(DhcpLease {
                ip: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7))),
                ..DhcpLease::default()
            }),
            onboarding: Fetched::mock(ObRecord {
                status: OnboardingStatus::Running,
            }),
            listing: Fetched::live(DeviceListing {
                active: true,
                firmware: None,
            }),
            provisioning: Fetched::live(prov),
        }
    }

    #[test]
    fn initial_snapshot_matches_fresh_device() {
        let snap = DeviceSnapshot::initial("S1", Environment::Qa);
        assert_eq!(snap.onboarding.status, OnboardingStatus::Pending);
        assert_eq!(snap.onboarding.environment, Environment::Qa);
        assert!(!snap.onboarding.dhcp.has_ip());
        assert!(!snap.device.active);
        assert_eq!(snap.device.firmware.current, "1.0.0");
        assert_eq!(snap.device.firmware.latest, "1.1.0");
        assert_eq!(snap.device.firmware.progress, None);
        assert_eq!(snap.device.services.len(), 2);
        assert_eq!(snap.device.port_config.len(), 2);
        assert!(snap.device.services.iter().all(|s| !s.applied));
        assert_eq!(snap.provenance, Provenance::default());
    }

    #[test]
    fn merge_replaces_onboarding_and_activation() {
        let snap =
            DeviceSnapshot::initial("S1", Environment::Prod).merged(tick(Provisioning::default()));
        assert!(snap.onboarding.dhcp.has_ip());
        assert_eq!(snap.onboarding.status, OnboardingStatus::Running);
        assert_eq!(snap.onboarding.environment, Environment::Prod);
        assert!(snap.device.active);
        assert_eq!(snap.ticks, 1);
        assert_eq!(snap.provenance.onboarding, Some(Source::Mock));
        assert!(snap.provenance.any_mock());
        assert!(!snap.provenance.all_live());
        assert_eq!(snap.provenance.mocked(), vec!["onboarding"]);
    }

    #[test]
    fn provisioning_overlays_firmware() {
        let mut base = DeviceSnapshot::initial("S1", Environment::Dev);
        base.device.firmware.progress = Some(40.0);

        // Absent keys keep the previous values.
        let kept = base.merged(tick(Provisioning {
            current: Some("1.0.5".into()),
            ..Provisioning::default()
        }));
        assert_eq!(kept.device.firmware.current, "1.0.5");
        assert_eq!(kept.device.firmware.latest, "1.1.0");
        assert_eq!(kept.device.firmware.progress, Some(40.0));

        // Explicit nulls clear.
        let cleared = base.merged(tick(Provisioning {
            progress: Some(None),
            upgrade_time: Some(None),
            ..Provisioning::default()
        }));
        assert_eq!(cleared.device.firmware.progress, None);
        assert_eq!(cleared.device.firmware.upgrade_time, None);
    }

    #[test]
    fn provisioning_keeps_free_form_upgrade_time() {
        let base = DeviceSnapshot::initial("S1", Environment::Dev);
        let next = base.merged(tick(Provisioning {
            upgrade_time: Some(Some(Timestamp::Text("10:30:00 AM".into()))),
            ..Provisioning::default()
        }));
        assert_eq!(
            next.device.firmware.upgrade_time,
            Some(Timestamp::Text("10:30:00 AM".into()))
        );
    }

    #[test]
    fn firmware_reports_upgrade_state() {
        let mut firmware = Firmware::default();
        assert!(firmware.is_outdated());
        assert!(!firmware.is_upgrading());

        firmware.progress = Some(35.0);
        assert!(firmware.is_upgrading());

        firmware.progress = None;
        firmware.current = firmware.latest.clone();
        assert!(!firmware.is_outdated());
    }

    #[test]
    fn merge_keeps_plan_and_environment() {
        let mut base =
            DeviceSnapshot::initial("S1", Environment::Dev).with_environment(Environment::Qa);
        base.device.services[0].applied = true;
        let next = base.merged(tick(Provisioning::default()));
        assert_eq!(next.onboarding.environment, Environment::Qa);
        assert!(next.device.services[0].applied);
    }

    #[test]
    fn snapshot_serializes_source_lowercase() {
        let snap =
            DeviceSnapshot::initial("S1", Environment::Dev).merged(tick(Provisioning::default()));
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["provenance"]["dhcp"], "live");
        assert_eq!(json["provenance"]["onboarding"], "mock");
        assert_eq!(json["onboarding"]["status"], "running");
    }
}
