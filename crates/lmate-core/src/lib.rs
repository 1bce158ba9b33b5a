//! Data-acquisition core for the L-Mate dashboard.
//!
//! - **[`Dashboard`]** — lifecycle handle owning two polling cadences
//!   (provisioning every 3 s, metrics every 1 s). [`start()`](Dashboard::start)
//!   spawns them, [`stop()`](Dashboard::stop) cancels and joins them, and
//!   dropping the last handle cancels them too.
//! - **[`DeviceSnapshot`]** — onboarding, activation, firmware, and the
//!   port/service plan, with per-group provenance ([`Provenance`]).
//! - **[`MetricsHistory`]** — seven bounded [`MetricSeries`] advanced once
//!   per metrics tick via the pure [`series::push`].
//! - **[`StepProgress`]** — derived onboarding step rail.
//! - **[`simulate`]** — stateful mock generators used when a fetch falls back.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod model;
pub mod series;
pub mod simulate;
pub mod state;
pub mod steps;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_METRICS_INTERVAL, DEFAULT_PROVISIONING_INTERVAL, DashboardConfig};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use metrics::MetricsHistory;
pub use model::{
    AdminState, DeviceSnapshot, DeviceState, Firmware, Onboarding, PortConfig, ProvisioningTick,
    Provenance, Service,
};
pub use series::{MAX_SAMPLES, MetricSeries, Sample};
pub use state::DashboardState;
pub use steps::{Step, StepCompletion, StepIndicator, StepProgress};

// Wire-level types consumers need alongside the core API.
pub use lmate_api::{
    Environment, Fetched, MetricKind, MetricReading, OnboardingStatus, Source, Timestamp,
};
