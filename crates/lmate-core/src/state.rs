// ── Reactive dashboard state ──
//
// Two watch channels, one per cadence. Each tick replaces the whole value,
// so subscribers see either the previous tick or the next one, never a
// partial merge.

use std::sync::Arc;

use lmate_api::Environment;
use tokio::sync::watch;

use crate::metrics::MetricsHistory;
use crate::model::DeviceSnapshot;

pub struct DashboardState {
    snapshot: watch::Sender<Arc<DeviceSnapshot>>,
    metrics: watch::Sender<Arc<MetricsHistory>>,
}

impl DashboardState {
    pub fn new(serial: &str, environment: Environment, history_len: usize) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(DeviceSnapshot::initial(serial, environment)));
        let (metrics, _) = watch::channel(Arc::new(MetricsHistory::with_capacity(history_len)));
        Self { snapshot, metrics }
    }

    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn metrics(&self) -> Arc<MetricsHistory> {
        self.metrics.borrow().clone()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Arc<DeviceSnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn subscribe_metrics(&self) -> watch::Receiver<Arc<MetricsHistory>> {
        self.metrics.subscribe()
    }

    /// Replace the snapshot with `f(current)`, returning the new value.
    pub(crate) fn update_snapshot(
        &self,
        f: impl FnOnce(&DeviceSnapshot) -> DeviceSnapshot,
    ) -> Arc<DeviceSnapshot> {
        let mut updated = None;
        self.snapshot.send_modify(|snap| {
            let next = Arc::new(f(snap));
            updated = Some(Arc::clone(&next));
            *snap = next;
        });
        updated.unwrap_or_else(|| self.snapshot())
    }

    /// Replace the metrics history with `f(current)`, returning the new value.
    pub(crate) fn update_metrics(
        &self,
        f: impl FnOnce(&MetricsHistory) -> MetricsHistory,
    ) -> Arc<MetricsHistory> {
        let mut updated = None;
        self.metrics.send_modify(|history| {
            let next = Arc::new(f(history));
            updated = Some(Arc::clone(&next));
            *history = next;
        });
        updated.unwrap_or_else(|| self.metrics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmate_api::OnboardingStatus;

    #[test]
    fn update_notifies_subscribers() {
        let state = DashboardState::new("S1", Environment::Dev, 30);
        let mut rx = state.subscribe_snapshot();
        assert!(!rx.has_changed().unwrap_or(true));

        let next = state.update_snapshot(|snap| {
            let mut next = snap.clone();
            next.onboarding.status = OnboardingStatus::Running;
            next
        });

        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(rx.borrow_and_update().onboarding.status, OnboardingStatus::Running);
        assert!(Arc::ptr_eq(&next, &state.snapshot()));
    }

    #[test]
    fn metrics_start_empty_with_configured_capacity() {
        let state = DashboardState::new("S1", Environment::Dev, 5);
        let history = state.metrics();
        assert_eq!(history.ticks, 0);
        assert_eq!(history.cpu.capacity(), 5);
    }
}
