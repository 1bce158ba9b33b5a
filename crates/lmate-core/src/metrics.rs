// ── Metric history ──
//
// Seven bounded series, advanced together once per metrics tick. The
// whole history is replaced per tick so readers never observe a tick
// half-applied.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lmate_api::{Fetched, MetricKind, MetricReading, Source};
use serde::Serialize;

use crate::series::{MAX_SAMPLES, MetricSeries, Sample};

/// History of every metric plus where the latest readings came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsHistory {
    pub tx: MetricSeries,
    pub rx: MetricSeries,
    pub latency: MetricSeries,
    pub cpu: MetricSeries,
    pub mem: MetricSeries,
    pub optical_tx: MetricSeries,
    pub optical_rx: MetricSeries,
    /// Provenance of the most recent reading per metric.
    pub sources: BTreeMap<MetricKind, Source>,
    /// Number of ticks applied.
    pub ticks: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_SAMPLES)
    }
}

impl MetricsHistory {
    pub fn with_capacity(max_len: usize) -> Self {
        let series = MetricSeries::with_capacity(max_len);
        Self {
            tx: series.clone(),
            rx: series.clone(),
            latency: series.clone(),
            cpu: series.clone(),
            mem: series.clone(),
            optical_tx: series.clone(),
            optical_rx: series,
            sources: BTreeMap::new(),
            ticks: 0,
            updated_at: None,
        }
    }

    pub fn series(&self, kind: MetricKind) -> &MetricSeries {
        match kind {
            MetricKind::Egress => &self.tx,
            MetricKind::Ingress => &self.rx,
            MetricKind::Latency => &self.latency,
            MetricKind::Cpu => &self.cpu,
            MetricKind::MemoryFree => &self.mem,
            MetricKind::OpticalTx => &self.optical_tx,
            MetricKind::OpticalRx => &self.optical_rx,
        }
    }

    fn series_mut(&mut self, kind: MetricKind) -> &mut MetricSeries {
        match kind {
            MetricKind::Egress => &mut self.tx,
            MetricKind::Ingress => &mut self.rx,
            MetricKind::Latency => &mut self.latency,
            MetricKind::Cpu => &mut self.cpu,
            MetricKind::MemoryFree => &mut self.mem,
            MetricKind::OpticalTx => &mut self.optical_tx,
            MetricKind::OpticalRx => &mut self.optical_rx,
        }
    }

    /// A new history with one sample pushed per reading.
    pub fn pushed(&self, readings: &[(MetricKind, Fetched<MetricReading>)]) -> Self {
        let mut next = self.clone();
        for (kind, reading) in readings {
            let series = next.series_mut(*kind);
            *series = series.pushed(Sample::from(reading.value.value));
            next.sources.insert(*kind, reading.source);
        }
        next.ticks += 1;
        next.updated_at = Some(Utc::now());
        next
    }

    /// Number of metrics whose latest reading was live.
    pub fn live_count(&self) -> usize {
        self.sources.values().filter(|s| **s == Source::Live).count()
    }

    /// Number of metrics whose latest reading was synthesized.
    pub fn mock_count(&self) -> usize {
        self.sources.values().filter(|s| **s == Source::Mock).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::{EnumCount, IntoEnumIterator};

    fn reading(value: f64, source: Source) -> Fetched<MetricReading> {
        Fetched {
            value: MetricReading { value, ts: None },
            source,
        }
    }

    fn full_tick(value: f64, source: Source) -> Vec<(MetricKind, Fetched<MetricReading>)> {
        MetricKind::iter().map(|k| (k, reading(value, source))).collect()
    }

    #[test]
    fn every_series_advances_once_per_tick() {
        let history = MetricsHistory::default()
            .pushed(&full_tick(1.0, Source::Live))
            .pushed(&full_tick(2.0, Source::Mock));

        for kind in MetricKind::iter() {
            let series = history.series(kind);
            assert_eq!(series.values().collect::<Vec<_>>(), vec![1.0, 2.0], "{kind}");
        }
        assert_eq!(history.ticks, 2);
        assert_eq!(history.mock_count(), MetricKind::COUNT);
        assert_eq!(history.live_count(), 0);
    }

    #[test]
    fn pushed_leaves_previous_history_intact() {
        let before = MetricsHistory::with_capacity(3);
        let after = before.pushed(&[(MetricKind::Cpu, reading(50.0, Source::Live))]);

        assert!(before.cpu.is_empty());
        assert_eq!(after.cpu.latest(), 50.0);
        assert!(after.tx.is_empty());
        assert!(after.tx.ptr_eq(&before.tx));
        assert_eq!(after.sources.get(&MetricKind::Cpu), Some(&Source::Live));
    }

    #[test]
    fn capacity_applies_to_every_series() {
        let mut history = MetricsHistory::with_capacity(4);
        for i in 0..10 {
            history = history.pushed(&full_tick(f64::from(i), Source::Live));
        }
        for kind in MetricKind::iter() {
            assert_eq!(history.series(kind).len(), 4);
            assert_eq!(history.series(kind).latest(), 9.0);
        }
    }
}
