//! Status command: one provisioning tick, then the snapshot and step rail.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use lmate_core::{
    Dashboard, DeviceSnapshot, Firmware, PortConfig, Service, StepIndicator, StepProgress,
    Timestamp,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Report ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub(crate) struct StatusReport<'a> {
    #[serde(flatten)]
    pub snapshot: &'a DeviceSnapshot,
    pub steps: StepProgress,
}

impl<'a> StatusReport<'a> {
    pub fn new(snapshot: &'a DeviceSnapshot) -> Self {
        Self {
            snapshot,
            steps: StepProgress::derive(snapshot),
        }
    }
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Service")]
    id: String,
    #[tabled(rename = "Bandwidth")]
    bandwidth: String,
    #[tabled(rename = "Applied")]
    applied: String,
}

impl From<&Service> for ServiceRow {
    fn from(s: &Service) -> Self {
        Self {
            id: s.id.clone(),
            bandwidth: s.bandwidth.clone(),
            applied: yes_no(s.applied).into(),
        }
    }
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    name: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "VLANs")]
    vlans: String,
    #[tabled(rename = "Admin")]
    admin: String,
    #[tabled(rename = "Applied")]
    applied: String,
}

impl From<&PortConfig> for PortRow {
    fn from(p: &PortConfig) -> Self {
        Self {
            name: p.name.clone(),
            speed: p.speed.clone(),
            vlans: p.vlans.clone(),
            admin: p.admin.to_string(),
            applied: yes_no(p.applied).into(),
        }
    }
}

fn stamp(at: Option<&Timestamp>) -> String {
    at.map_or_else(|| "-".into(), ToString::to_string)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

// ── Rendering ───────────────────────────────────────────────────────

/// One rail glyph per step: `✓` complete, `●` in progress, `○` pending.
pub(crate) fn rail(steps: &StepProgress, color: bool) -> String {
    steps
        .rail()
        .map(|(step, indicator)| {
            let glyph = match (indicator, color) {
                (StepIndicator::Complete, true) => "✓".green().to_string(),
                (StepIndicator::InProgress, true) => "●".cyan().to_string(),
                (StepIndicator::Pending, true) => "○".dimmed().to_string(),
                (StepIndicator::Complete, false) => "✓".into(),
                (StepIndicator::InProgress, false) => "●".into(),
                (StepIndicator::Pending, false) => "○".into(),
            };
            format!("{glyph} {}", step.label())
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub(crate) fn firmware_note(fw: &Firmware) -> String {
    if fw.is_upgrading() {
        let progress = fw.progress.unwrap_or_default();
        format!("(upgrading to {}: {progress:.0}%)", fw.latest)
    } else if fw.is_outdated() {
        format!("(update available: {})", fw.latest)
    } else {
        "(up to date)".into()
    }
}

fn detail(report: &StatusReport<'_>, color: bool) -> String {
    let snap = report.snapshot;
    let lease = &snap.onboarding.dhcp;
    let fw = &snap.device.firmware;
    let prov = &snap.provenance;

    let mut lines = vec![
        format!("Serial:       {}", snap.serial),
        format!("Environment:  {}", snap.onboarding.environment),
        format!(
            "Onboarding:   {} [{}]",
            snap.onboarding.status,
            output::provenance_label(prov.onboarding, color)
        ),
        format!(
            "IP:           {} [{}]",
            lease.ip.map_or_else(|| "-".into(), |ip| ip.to_string()),
            output::provenance_label(prov.dhcp, color)
        ),
        format!("MAC:          {}", lease.mac_address.as_deref().unwrap_or("-")),
        format!(
            "Lease:        {} .. {}",
            stamp(lease.lease_start.as_ref()),
            stamp(lease.lease_end.as_ref())
        ),
        format!(
            "Active:       {} [{}]",
            yes_no(snap.device.active),
            output::provenance_label(prov.listing, color)
        ),
        format!(
            "Firmware:     {} {} [{}]",
            fw.current,
            firmware_note(fw),
            output::provenance_label(prov.provisioning, color)
        ),
    ];
    if let Some(at) = &fw.upgrade_time {
        lines.push(format!("Upgraded at:  {at}"));
    }
    lines.push(String::new());
    lines.push(rail(&report.steps, color));

    let services: Vec<ServiceRow> = snap.device.services.iter().map(ServiceRow::from).collect();
    let ports: Vec<PortRow> = snap.device.port_config.iter().map(PortRow::from).collect();
    lines.push(String::new());
    lines.push(output::render_table(&services));
    lines.push(output::render_table(&ports));

    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = dashboard.refresh_provisioning().await;
    util::require_live(global, &snapshot.provenance.mocked())?;
    let report = StatusReport::new(&snapshot);
    let color = output::should_color(global.color_mode());

    let out = output::render_single(
        global.output_format(),
        &report,
        |r| detail(r, color),
        |r| r.snapshot.onboarding.status.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
