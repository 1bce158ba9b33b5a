// ── Bounded sample buffer ──
//
// Sparkline history for one metric. `push` is a pure function over a
// slice so a reactive reader can compare old and new series by identity;
// `MetricSeries` wraps the result in an `Arc<[Sample]>` for cheap sharing
// through watch channels.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Default capacity of a metric series.
pub const MAX_SAMPLES: usize = 30;

/// One observation. Ordering is position in the series, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub v: f64,
}

impl From<f64> for Sample {
    fn from(v: f64) -> Self {
        Self { v }
    }
}

/// Append `sample` and evict at most one element from the front if the
/// result exceeds `max_len`. The input is never modified.
///
/// Capacity is enforced per call: a series already longer than `max_len`
/// shrinks by one per push, not to `max_len` at once.
pub fn push(series: &[Sample], sample: Sample, max_len: usize) -> Vec<Sample> {
    let mut next = Vec::with_capacity(series.len() + 1);
    next.extend_from_slice(series);
    next.push(sample);
    if next.len() > max_len {
        next.remove(0);
    }
    next
}

/// Immutable, capacity-bounded history of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    samples: Arc<[Sample]>,
    #[serde(skip)]
    max_len: usize,
}

impl Default for MetricSeries {
    fn default() -> Self {
        Self::with_capacity(MAX_SAMPLES)
    }
}

impl MetricSeries {
    pub fn with_capacity(max_len: usize) -> Self {
        Self {
            samples: Arc::from(Vec::new()),
            max_len,
        }
    }

    /// A new series with `sample` appended. `self` is left untouched.
    pub fn pushed(&self, sample: Sample) -> Self {
        Self {
            samples: push(&self.samples, sample, self.max_len).into(),
            max_len: self.max_len,
        }
    }

    /// Newest value, or `0.0` for an empty series.
    pub fn latest(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.v)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.v)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_len
    }

    /// `true` if both series share the same backing allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}
