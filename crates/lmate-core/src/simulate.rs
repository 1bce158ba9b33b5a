// ── Mock-path simulation ──
//
// Stateful mock generators for the provisioning tick. Each takes the
// previous snapshot's value and an RNG, so the dashboard only runs them
// after a fetch has already fallen back, and tests can seed them.
//
// Onboarding is monotonic: a mocked status never moves backwards.

use chrono::{DateTime, Utc};
use lmate_api::{
    DeviceListing, DhcpLease, FirmwareVersions, OnboardingStatus, Provisioning, Timestamp, mock,
};
use rand::Rng;

use crate::model::{DeviceSnapshot, Firmware, PortConfig, Service};

/// Probability that a running onboarding completes on a tick.
pub const ONBOARDING_DONE_PROBABILITY: f64 = 0.3;
/// Probability that a fully onboarded device activates on a tick.
pub const ACTIVATION_PROBABILITY: f64 = 0.3;
/// Probability that an idle device starts a firmware upgrade on a tick.
pub const UPGRADE_START_PROBABILITY: f64 = 0.1;
/// Per-tick progress increment while upgrading, inclusive.
pub const UPGRADE_STEP: (u8, u8) = (15, 25);
pub const SERVICE_APPLY_PROBABILITY: f64 = 0.2;
pub const PORT_APPLY_PROBABILITY: f64 = 0.15;

/// `pending → running` immediately, `running → done` with probability 0.3.
pub fn advance_onboarding<R: Rng + ?Sized>(
    rng: &mut R,
    status: OnboardingStatus,
) -> OnboardingStatus {
    match status {
        OnboardingStatus::Pending => OnboardingStatus::Running,
        OnboardingStatus::Running if rng.gen_bool(ONBOARDING_DONE_PROBABILITY) => {
            OnboardingStatus::Done
        }
        other => other,
    }
}

/// Activates with probability 0.3 once onboarding is done. Never
/// deactivates.
pub fn activation<R: Rng + ?Sized>(rng: &mut R, status: OnboardingStatus, active: bool) -> bool {
    active || (status == OnboardingStatus::Done && rng.gen_bool(ACTIVATION_PROBABILITY))
}

/// Mocked device listing continuing from `prev`.
pub fn device_listing<R: Rng + ?Sized>(rng: &mut R, prev: &DeviceSnapshot) -> DeviceListing {
    let firmware = &prev.device.firmware;
    DeviceListing {
        active: activation(rng, prev.onboarding.status, prev.device.active),
        firmware: Some(FirmwareVersions {
            current: firmware.current.clone(),
            latest: firmware.latest.clone(),
        }),
    }
}

/// Keep an assigned lease; otherwise draw a fresh one.
pub fn lease<R: Rng + ?Sized>(rng: &mut R, prev: &DhcpLease) -> DhcpLease {
    if prev.has_ip() {
        prev.clone()
    } else {
        mock::dhcp_lease_with(rng)
    }
}

/// Next firmware state as a full provisioning overlay.
///
/// Idle firmware starts an upgrade at 0% with probability 0.1. A running
/// upgrade advances 15-25% per tick; at 100% or more it clears the
/// progress, promotes `latest` to `current`, and stamps `now`.
pub fn advance_firmware<R: Rng + ?Sized>(
    rng: &mut R,
    firmware: &Firmware,
    now: DateTime<Utc>,
) -> Provisioning {
    let (lo, hi) = UPGRADE_STEP;
    let progress = match firmware.progress {
        None if rng.gen_bool(UPGRADE_START_PROBABILITY) => Some(0.0),
        None => None,
        Some(p) => Some(p + f64::from(rng.gen_range(lo..=hi))),
    };

    match progress {
        Some(p) if p >= 100.0 => Provisioning {
            current: Some(firmware.latest.clone()),
            latest: Some(firmware.latest.clone()),
            progress: Some(None),
            upgrade_time: Some(Some(Timestamp::from(now))),
        },
        _ => Provisioning {
            current: Some(firmware.current.clone()),
            latest: Some(firmware.latest.clone()),
            progress: Some(progress),
            upgrade_time: Some(firmware.upgrade_time.clone()),
        },
    }
}

/// Each pending service applies with probability 0.2. Applied stays applied.
pub fn settle_services<R: Rng + ?Sized>(rng: &mut R, services: &[Service]) -> Vec<Service> {
    services
        .iter()
        .map(|s| Service {
            applied: s.applied || rng.gen_bool(SERVICE_APPLY_PROBABILITY),
            ..s.clone()
        })
        .collect()
}

/// Each pending port change applies with probability 0.15.
pub fn settle_ports<R: Rng + ?Sized>(rng: &mut R, ports: &[PortConfig]) -> Vec<PortConfig> {
    ports
        .iter()
        .map(|p| PortConfig {
            applied: p.applied || rng.gen_bool(PORT_APPLY_PROBABILITY),
            ..p.clone()
        })
        .collect()
}
