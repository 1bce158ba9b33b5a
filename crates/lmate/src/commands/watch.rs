//! Watch command: run both cadences and print every state change.

use std::future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use lmate_core::{Dashboard, DeviceSnapshot, MetricsHistory, StepProgress};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::metrics::{MetricSummary, mocked_metrics, summarize};
use super::util;
use super::status::{StatusReport, rail};

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum WatchEvent<'a> {
    Snapshot {
        #[serde(flatten)]
        report: StatusReport<'a>,
    },
    Metrics {
        ticks: u64,
        metrics: Vec<MetricSummary>,
    },
}

// ── Line rendering ──────────────────────────────────────────────────

fn snapshot_line(snap: &DeviceSnapshot, color: bool) -> String {
    let fw = &snap.device.firmware;
    let upgrade = fw
        .progress
        .map(|p| format!(" ({p:.0}%)"))
        .unwrap_or_default();
    format!(
        "[{}] provisioning #{}  status={} ip={} active={} fw={}->{}{}  {}",
        stamp(snap.updated_at),
        snap.ticks,
        snap.onboarding.status,
        snap.onboarding
            .dhcp
            .ip
            .map_or_else(|| "-".into(), |ip| ip.to_string()),
        snap.device.active,
        fw.current,
        fw.latest,
        upgrade,
        rail(&StepProgress::derive(snap), color),
    )
}

fn metrics_line(history: &MetricsHistory) -> String {
    let values = summarize(history)
        .iter()
        .map(|s| format!("{}={}{}", s.metric, s.latest, s.unit))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "[{}] metrics #{}  {values}  (live {}/{})",
        stamp(history.updated_at),
        history.ticks,
        history.live_count(),
        history.sources.len(),
    )
}

fn stamp(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    at.map_or_else(|| "--:--:--".into(), |t| t.format("%H:%M:%S").to_string())
}

/// Structured encoding of an event, or `None` for the text formats.
fn structured(format: &OutputFormat, event: &WatchEvent<'_>) -> Result<Option<String>, CliError> {
    Ok(match format {
        OutputFormat::Json | OutputFormat::JsonCompact => Some(serde_json::to_string(event)?),
        OutputFormat::Yaml => Some(format!("---\n{}", serde_yaml::to_string(event)?)),
        OutputFormat::Table | OutputFormat::Plain => None,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !global.quiet {
        eprintln!(
            "Watching {} at {} (Ctrl-C to stop)",
            dashboard.config().serial,
            dashboard.config().base_url
        );
    }

    dashboard.start().await;
    let result = watch_loop(dashboard, args, global).await;
    dashboard.stop().await;
    result
}

async fn watch_loop(
    dashboard: &Dashboard,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color_mode());
    let mut snapshot_rx = dashboard.subscribe_snapshot();
    let mut metrics_rx = dashboard.subscribe_metrics();
    snapshot_rx.borrow_and_update();
    metrics_rx.borrow_and_update();

    let deadline = args
        .duration
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let expired = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => future::pending().await,
        }
    };
    tokio::pin!(expired);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                tracing::debug!("interrupted");
                return Ok(());
            }
            () = &mut expired => return Ok(()),
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let snapshot = snapshot_rx.borrow_and_update().clone();
                util::require_live(global, &snapshot.provenance.mocked())?;
                let event = WatchEvent::Snapshot { report: StatusReport::new(&snapshot) };
                let line = structured(global.output_format(), &event)?
                    .unwrap_or_else(|| snapshot_line(&snapshot, color));
                output::print_output(&line, global.quiet);
            }
            changed = metrics_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let history = metrics_rx.borrow_and_update().clone();
                let metrics = summarize(&history);
                util::require_live(global, &mocked_metrics(&metrics))?;
                let event = WatchEvent::Metrics { ticks: history.ticks, metrics };
                let line = structured(global.output_format(), &event)?
                    .unwrap_or_else(|| metrics_line(&history));
                output::print_output(&line, global.quiet);
            }
        }
    }
}
