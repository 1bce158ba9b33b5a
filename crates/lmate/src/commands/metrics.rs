//! Metrics command: N metric ticks, then one row per metric.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use lmate_core::{Dashboard, MetricKind, MetricsHistory, Source};

use crate::cli::{GlobalOpts, MetricsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub(crate) struct MetricSummary {
    pub metric: MetricKind,
    pub latest: f64,
    pub unit: &'static str,
    pub samples: Vec<f64>,
    pub source: Option<Source>,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "Trend")]
    trend: String,
    #[tabled(rename = "Source")]
    source: String,
}

pub(crate) fn summarize(history: &MetricsHistory) -> Vec<MetricSummary> {
    MetricKind::iter()
        .map(|kind| {
            let series = history.series(kind);
            MetricSummary {
                metric: kind,
                latest: series.latest(),
                unit: kind.unit(),
                samples: series.values().collect(),
                source: history.sources.get(&kind).copied(),
            }
        })
        .collect()
}

/// Metrics whose latest reading was synthesized.
pub(crate) fn mocked_metrics(summaries: &[MetricSummary]) -> Vec<String> {
    summaries
        .iter()
        .filter(|s| s.source == Some(Source::Mock))
        .map(|s| s.metric.to_string())
        .collect()
}

fn row(summary: &MetricSummary, color: bool) -> MetricRow {
    MetricRow {
        metric: summary.metric.to_string(),
        latest: format!("{} {}", summary.latest, summary.unit),
        samples: summary.samples.len(),
        trend: output::sparkline(&summary.samples),
        source: output::provenance_label(summary.source, color),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: &MetricsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.ticks == 0 {
        return Err(CliError::Validation {
            field: "ticks".into(),
            reason: "must be at least 1".into(),
        });
    }

    let interval = dashboard.config().metrics_interval;
    let mut history = dashboard.refresh_metrics().await;
    for _ in 1..args.ticks {
        tokio::time::sleep(interval).await;
        history = dashboard.refresh_metrics().await;
    }
    tracing::debug!(
        ticks = history.ticks,
        live = history.live_count(),
        mock = history.mock_count(),
        "metrics sampled"
    );

    let summaries = summarize(&history);
    util::require_live(global, &mocked_metrics(&summaries))?;

    let color = output::should_color(global.color_mode());
    let out = output::render_list(
        global.output_format(),
        &summaries,
        |s| row(s, color),
        |s| format!("{}\t{}", s.metric, s.latest),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
