//! Async client for the L-Mate provisioning and telemetry backend.
//!
//! - **[`ApiClient`]** — one bounded request per call. [`fetch`](ApiClient::fetch)
//!   surfaces failures; [`fetch_resilient`](ApiClient::fetch_resilient)
//!   masks every failure (transport, non-2xx status, malformed body,
//!   timeout) by returning the caller's mock generator output instead.
//! - **[`Fetched<T>`]** — the value plus its [`Source`] (`live` or `mock`).
//! - **Endpoint wrappers** — typed methods for each backend path.
//! - **[`mock`]** — default stateless generators for every endpoint.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod mock;
pub mod models;
pub mod transport;

pub use client::{ApiClient, Fetched, RequestOptions, Source};
pub use error::Error;
pub use models::{
    DeviceHistory, DeviceListing, DhcpLease, Environment, EnvironmentAck, FirmwareVersions,
    MetricKind, MetricReading, ObRecord, OnboardingStatus, Provisioning, ResetAck, Timestamp,
    TriggerAck,
};
pub use transport::{DEFAULT_TIMEOUT, TransportConfig};
