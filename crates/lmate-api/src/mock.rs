//! Default mock generators, one per endpoint.
//!
//! Each produces a value structurally identical to the endpoint's success
//! payload. They are stateless; `lmate-core` layers stateful generators on
//! top for the polling loop. Every generator has an `*_with` form taking
//! the RNG so tests can seed it.

use std::fmt::Write as _;
use std::net::{IpAddr, Ipv4Addr};

use chrono::{Duration, Utc};
use rand::Rng;

use crate::models::{
    DeviceHistory, DeviceListing, DhcpLease, Environment, EnvironmentAck, FirmwareVersions,
    MetricKind, MetricReading, ObRecord, OnboardingStatus, Provisioning, ResetAck, Timestamp,
    TriggerAck,
};

pub const MOCK_CURRENT_FIRMWARE: &str = "1.0.0";
pub const MOCK_LATEST_FIRMWARE: &str = "1.1.0";

/// Random locally-plausible lease: `192.168.0.{2..=254}`, started 1-6h ago,
/// ending 1-48h from now.
pub fn dhcp_lease_with<R: Rng + ?Sized>(rng: &mut R) -> DhcpLease {
    let now = Utc::now();
    DhcpLease {
        mac_address: Some(mac_address_with(rng)),
        ip: Some(IpAddr::V4(Ipv4Addr::new(192, 168, 0, rng.gen_range(2..=254)))),
        lease_start: Some(Timestamp::from(now - Duration::hours(rng.gen_range(1..=6)))),
        lease_end: Some(Timestamp::from(now + Duration::hours(rng.gen_range(1..=48)))),
    }
}

pub fn dhcp_lease() -> DhcpLease {
    dhcp_lease_with(&mut rand::thread_rng())
}

/// Six random lowercase hex octets joined by `:`.
pub fn mac_address_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut mac = String::with_capacity(17);
    for i in 0..6 {
        if i > 0 {
            mac.push(':');
        }
        let _ = write!(mac, "{:02x}", rng.gen_range(0..=255_u8));
    }
    mac
}

/// Stateless default: a device nobody has started onboarding yet.
pub fn ob_record() -> ObRecord {
    ObRecord {
        status: OnboardingStatus::Pending,
    }
}

pub fn environment_ack(serial: &str, env: Environment) -> EnvironmentAck {
    EnvironmentAck {
        ok: true,
        env,
        serial: serial.to_owned(),
    }
}

pub fn trigger_ack(serial: &str) -> TriggerAck {
    TriggerAck {
        ok: true,
        triggered_at: Some(Timestamp::from(Utc::now())),
        serial: serial.to_owned(),
    }
}

pub fn reset_ack(serial: &str) -> ResetAck {
    ResetAck {
        ok: true,
        serial: serial.to_owned(),
    }
}

/// Active with probability 0.4, firmware `1.0.0` / `1.1.0`.
pub fn device_listing_with<R: Rng + ?Sized>(rng: &mut R) -> DeviceListing {
    DeviceListing {
        active: rng.gen_bool(0.4),
        firmware: Some(FirmwareVersions {
            current: MOCK_CURRENT_FIRMWARE.into(),
            latest: MOCK_LATEST_FIRMWARE.into(),
        }),
    }
}

pub fn device_listing() -> DeviceListing {
    device_listing_with(&mut rand::thread_rng())
}

/// Firmware `1.0.0` / `1.1.0`, progress uniform in 0-100, no upgrade time.
pub fn provisioning_with<R: Rng + ?Sized>(rng: &mut R) -> Provisioning {
    Provisioning {
        current: Some(MOCK_CURRENT_FIRMWARE.into()),
        latest: Some(MOCK_LATEST_FIRMWARE.into()),
        progress: Some(Some(f64::from(rng.gen_range(0..=100_u8)))),
        upgrade_time: Some(None),
    }
}

pub fn provisioning() -> Provisioning {
    provisioning_with(&mut rand::thread_rng())
}

pub fn device_history() -> DeviceHistory {
    DeviceHistory::default()
}

/// Integral value in the metric's mock range, stamped now.
pub fn metric_reading_with<R: Rng + ?Sized>(rng: &mut R, kind: MetricKind) -> MetricReading {
    let (lo, hi) = kind.mock_range();
    MetricReading {
        value: f64::from(rng.gen_range(lo..=hi)),
        ts: Some(Timestamp::from(Utc::now())),
    }
}

pub fn metric_reading(kind: MetricKind) -> MetricReading {
    metric_reading_with(&mut rand::thread_rng(), kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use strum::IntoEnumIterator;

    #[test]
    fn dhcp_lease_is_in_local_subnet() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let lease = dhcp_lease_with(&mut rng);
            let ip = lease.ip.expect("mock lease always has an ip").to_string();
            assert!(ip.starts_with("192.168.0."), "unexpected ip {ip}");
            let host: u8 = ip.rsplit('.').next().and_then(|h| h.parse().ok()).unwrap_or(0);
            assert!((2..=254).contains(&host));
            let start = lease.lease_start.as_ref().and_then(Timestamp::to_datetime);
            let end = lease.lease_end.as_ref().and_then(Timestamp::to_datetime);
            assert!(start.is_some() && start < end);
        }
    }

    #[test]
    fn mac_address_has_six_octets() {
        let mut rng = StdRng::seed_from_u64(1);
        let mac = mac_address_with(&mut rng);
        assert_eq!(mac.len(), 17);
        assert_eq!(mac.split(':').count(), 6);
        assert!(mac.split(':').all(|o| u8::from_str_radix(o, 16).is_ok()));
    }

    #[test]
    fn metric_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for kind in MetricKind::iter() {
            let (lo, hi) = kind.mock_range();
            for _ in 0..100 {
                let reading = metric_reading_with(&mut rng, kind);
                assert!(
                    reading.value >= f64::from(lo) && reading.value <= f64::from(hi),
                    "{kind}: {} outside {lo}..={hi}",
                    reading.value
                );
                assert_eq!(reading.value.fract(), 0.0);
            }
        }
    }

    #[test]
    fn optical_power_is_negative_dbm() {
        let mut rng = StdRng::seed_from_u64(3);
        for kind in [MetricKind::OpticalTx, MetricKind::OpticalRx] {
            let reading = metric_reading_with(&mut rng, kind);
            assert!(reading.value <= -2.0 && reading.value >= -15.0);
        }
    }

    #[test]
    fn provisioning_mock_overrides_every_field() {
        let mut rng = StdRng::seed_from_u64(9);
        let prov = provisioning_with(&mut rng);
        assert_eq!(prov.current.as_deref(), Some(MOCK_CURRENT_FIRMWARE));
        assert_eq!(prov.latest.as_deref(), Some(MOCK_LATEST_FIRMWARE));
        assert!(matches!(prov.progress, Some(Some(p)) if (0.0..=100.0).contains(&p)));
        assert_eq!(prov.upgrade_time, Some(None));
    }

    #[test]
    fn acks_echo_the_serial() {
        assert_eq!(reset_ack("S-1").serial, "S-1");
        assert!(trigger_ack("S-2").triggered_at.is_some());
        let ack = environment_ack("S-3", Environment::Qa);
        assert!(ack.ok);
        assert_eq!(ack.env, Environment::Qa);
    }
}
