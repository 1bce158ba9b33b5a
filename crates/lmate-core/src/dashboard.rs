// ── Dashboard lifecycle ──
//
// Owns the two polling cadences for one device. Background tasks hold
// only the client and the state (never the dashboard itself), so dropping
// the last `Dashboard` handle cancels them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use lmate_api::endpoints::ob_records_path;
use lmate_api::{
    ApiClient, DeviceHistory, Environment, EnvironmentAck, Fetched, MetricKind, ObRecord,
    RequestOptions, ResetAck, Source, TriggerAck, mock,
};
use strum::IntoEnumIterator;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::metrics::MetricsHistory;
use crate::model::{DeviceSnapshot, ProvisioningTick};
use crate::simulate;
use crate::state::DashboardState;
use crate::steps::StepProgress;

/// Live view of one device.
///
/// Cheaply cloneable via `Arc<DashboardInner>`. Construct, then
/// [`start()`](Self::start) to spawn both cadences; [`stop()`](Self::stop)
/// cancels and joins them.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    poller: Poller,
    cancel: CancellationToken,
    /// Child token for the current run, replaced on restart.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for DashboardInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Dashboard {
    /// Build the HTTP client from `config`. Does NOT start polling.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.base_url.clone(), &config.transport())?;
        Ok(Self::with_client(config, client))
    }

    /// Use a pre-built client (tests, shared connection pools).
    pub fn with_client(config: DashboardConfig, client: ApiClient) -> Self {
        let state = DashboardState::new(&config.serial, config.environment, config.history_len);
        let poller = Poller {
            client: Arc::new(client),
            state: Arc::new(state),
            serial: Arc::from(config.serial.as_str()),
        };
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(DashboardInner {
                config,
                poller,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.poller.client
    }

    fn serial(&self) -> &str {
        &self.inner.config.serial
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn both polling cadences. A no-op if already running.
    ///
    /// The first tick of each cadence fires one period after start.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            debug!("dashboard already running");
            return;
        }

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        if config.provisioning_interval.is_zero() {
            warn!("provisioning interval is zero; provisioning polling disabled");
        } else {
            let poller = self.inner.poller.clone();
            handles.push(tokio::spawn(poll_task(
                "provisioning",
                config.provisioning_interval,
                child.clone(),
                move || {
                    let poller = poller.clone();
                    async move {
                        poller.provisioning_tick().await;
                    }
                },
            )));
        }

        if config.metrics_interval.is_zero() {
            warn!("metrics interval is zero; metrics polling disabled");
        } else {
            let poller = self.inner.poller.clone();
            handles.push(tokio::spawn(poll_task(
                "metrics",
                config.metrics_interval,
                child,
                move || {
                    let poller = poller.clone();
                    async move {
                        poller.metrics_tick().await;
                    }
                },
            )));
        }

        info!(
            serial = self.serial(),
            provisioning = ?config.provisioning_interval,
            metrics = ?config.metrics_interval,
            "dashboard started"
        );
    }

    /// Cancel both cadences and wait for them to exit. Ticks in flight
    /// are abandoned; the state keeps the last completed tick.
    pub async fn stop(&self) {
        // Cancel the child token (not the parent, so start() works again).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "poll task ended abnormally");
            }
        }
        info!(serial = self.serial(), "dashboard stopped");
    }

    pub async fn is_running(&self) -> bool {
        !self.inner.task_handles.lock().await.is_empty()
    }

    // ── State access ─────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.inner.poller.state.snapshot()
    }

    pub fn metrics(&self) -> Arc<MetricsHistory> {
        self.inner.poller.state.metrics()
    }

    pub fn steps(&self) -> StepProgress {
        StepProgress::derive(&self.snapshot())
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Arc<DeviceSnapshot>> {
        self.inner.poller.state.subscribe_snapshot()
    }

    pub fn subscribe_metrics(&self) -> watch::Receiver<Arc<MetricsHistory>> {
        self.inner.poller.state.subscribe_metrics()
    }

    // ── One-shot operations ──────────────────────────────────────────

    /// Run one provisioning tick now.
    pub async fn refresh_provisioning(&self) -> Arc<DeviceSnapshot> {
        self.inner.poller.provisioning_tick().await
    }

    /// Run one metrics tick now.
    pub async fn refresh_metrics(&self) -> Arc<MetricsHistory> {
        self.inner.poller.metrics_tick().await
    }

    /// Strict reachability check: one onboarding-record fetch that
    /// surfaces failure instead of falling back.
    pub async fn probe(&self) -> Result<ObRecord, CoreError> {
        let record = self
            .client()
            .fetch::<ObRecord>(&ob_records_path(self.serial()), &RequestOptions::default())
            .await?;
        Ok(record)
    }

    /// Select the onboarding environment. The snapshot takes the
    /// acknowledged environment.
    pub async fn set_environment(
        &self,
        env: Environment,
    ) -> Result<Fetched<EnvironmentAck>, CoreError> {
        let serial = self.serial();
        let ack = self
            .client()
            .set_onboarding_environment(serial, env, || mock::environment_ack(serial, env))
            .await;
        if !ack.value.ok {
            return Err(rejected("set environment", serial));
        }

        let acked = ack.value.env;
        self.inner
            .poller
            .state
            .update_snapshot(|snap| snap.with_environment(acked));
        info!(serial, env = %acked, source = %ack.source, "environment set");
        Ok(ack)
    }

    pub async fn trigger_onboarding(&self) -> Result<Fetched<TriggerAck>, CoreError> {
        let serial = self.serial();
        let ack = self
            .client()
            .trigger_onboarding(serial, || mock::trigger_ack(serial))
            .await;
        if !ack.value.ok {
            return Err(rejected("trigger onboarding", serial));
        }
        info!(serial, source = %ack.source, "onboarding triggered");
        Ok(ack)
    }

    /// Reset the device. The snapshot returns to its initial state.
    pub async fn factory_reset(&self) -> Result<Fetched<ResetAck>, CoreError> {
        let serial = self.serial();
        let ack = self
            .client()
            .factory_reset(serial, || mock::reset_ack(serial))
            .await;
        if !ack.value.ok {
            return Err(rejected("factory reset", serial));
        }

        let environment = self.inner.config.environment;
        self.inner
            .poller
            .state
            .update_snapshot(|_| DeviceSnapshot::initial(serial, environment));
        info!(serial, source = %ack.source, "factory reset");
        Ok(ack)
    }

    pub async fn history(&self) -> Fetched<DeviceHistory> {
        self.client()
            .device_history(self.serial(), mock::device_history)
            .await
    }
}

fn rejected(operation: &str, serial: &str) -> CoreError {
    CoreError::Rejected {
        operation: operation.to_owned(),
        serial: serial.to_owned(),
    }
}

// ── Ticks ────────────────────────────────────────────────────────────

/// What a poll task needs: the client and the state, never the dashboard.
#[derive(Clone)]
struct Poller {
    client: Arc<ApiClient>,
    state: Arc<DashboardState>,
    serial: Arc<str>,
}

impl Poller {
    /// Four concurrent fetches, one snapshot replacement.
    ///
    /// Mock generators continue from the previous snapshot and only run
    /// for the fetches that failed.
    async fn provisioning_tick(&self) -> Arc<DeviceSnapshot> {
        let prev = self.state.snapshot();
        let serial = &*self.serial;

        let (dhcp, onboarding, listing, provisioning) = tokio::join!(
            self.client.dhcp(serial, || {
                simulate::lease(&mut rand::thread_rng(), &prev.onboarding.dhcp)
            }),
            self.client.ob_records(serial, || ObRecord {
                status: simulate::advance_onboarding(
                    &mut rand::thread_rng(),
                    prev.onboarding.status
                ),
            }),
            self.client.list_device(serial, || {
                simulate::device_listing(&mut rand::thread_rng(), &prev)
            }),
            self.client.device_provisioning(serial, || {
                simulate::advance_firmware(
                    &mut rand::thread_rng(),
                    &prev.device.firmware,
                    Utc::now(),
                )
            }),
        );

        let listing_mocked = listing.source == Source::Mock;
        let tick = ProvisioningTick {
            dhcp,
            onboarding,
            listing,
            provisioning,
        };

        let snapshot = self.state.update_snapshot(|current| {
            let mut next = current.merged(tick);
            if listing_mocked {
                let mut rng = rand::thread_rng();
                next.device.services = simulate::settle_services(&mut rng, &next.device.services);
                next.device.port_config =
                    simulate::settle_ports(&mut rng, &next.device.port_config);
            }
            next
        });

        debug!(
            serial,
            status = %snapshot.onboarding.status,
            active = snapshot.device.active,
            mocked = snapshot.provenance.any_mock(),
            "provisioning tick"
        );
        snapshot
    }

    /// Seven concurrent metric fetches, one history replacement.
    async fn metrics_tick(&self) -> Arc<MetricsHistory> {
        let serial = &*self.serial;
        let readings = join_all(MetricKind::iter().map(|kind| async move {
            let reading = self
                .client
                .metric(kind, serial, || mock::metric_reading(kind))
                .await;
            (kind, reading)
        }))
        .await;

        let history = self.state.update_metrics(|history| history.pushed(&readings));
        trace!(serial, ticks = history.ticks, live = history.live_count(), "metrics tick");
        history
    }
}

/// Run `tick` every `period` until `cancel` fires.
///
/// The immediate first interval tick is consumed so the first run lands
/// one period after start. Missed ticks are delayed, never bursted, and a
/// tick in flight is abandoned on cancellation.
async fn poll_task<F, Fut>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    mut tick: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tick() => {}
                }
            }
        }
    }
    debug!(task = name, "poll task exited");
}
