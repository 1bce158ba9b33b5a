#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::cell::Cell;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lmate_api::{
    ApiClient, Error, MetricKind, MetricReading, OnboardingStatus, RequestOptions, Source,
    Timestamp, mock,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = client_for(&format!("{}/api", server.uri()), Duration::from_secs(4));
    (server, client)
}

fn client_for(base: &str, timeout: Duration) -> ApiClient {
    ApiClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap(), timeout)
}

fn sentinel() -> MetricReading {
    MetricReading {
        value: 42.0,
        ts: Some(Timestamp::Text("X".into())),
    }
}

// ── Live path ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_body_is_returned_without_calling_mock() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics/cpu-usage"))
        .and(query_param("serial", "DEMO-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": 17,
            "ts": "2024-06-15T10:30:00Z"
        })))
        .mount(&server)
        .await;

    let calls = Cell::new(0);
    let fetched = client
        .metric(MetricKind::Cpu, "DEMO-123", || {
            calls.set(calls.get() + 1);
            sentinel()
        })
        .await;

    assert_eq!(fetched.source, Source::Live);
    assert_eq!(fetched.value.value, 17.0);
    assert_eq!(
        fetched.value.ts,
        Some(Timestamp::Text("2024-06-15T10:30:00Z".into()))
    );
    assert_eq!(calls.get(), 0, "mock generator must not run on success");
}

#[tokio::test]
async fn test_live_onboarding_record() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/onboarding/ob-records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "done" })))
        .mount(&server)
        .await;

    let fetched = client.ob_records("S1", mock::ob_record).await;
    assert!(fetched.is_live());
    assert_eq!(fetched.value.status, OnboardingStatus::Done);
}

#[tokio::test]
async fn test_free_form_upgrade_time_stays_live() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/device/deviceProvisioning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": "1.0.0",
            "latest": "1.1.0",
            "progress": null,
            "upgradeTime": "10:30:00 AM"
        })))
        .mount(&server)
        .await;

    let fetched = client.device_provisioning("S1", mock::provisioning).await;

    assert_eq!(fetched.source, Source::Live);
    assert_eq!(
        fetched.value.upgrade_time,
        Some(Some(Timestamp::Text("10:30:00 AM".into())))
    );
    assert_eq!(fetched.value.progress, Some(None));
}

#[tokio::test]
async fn test_fractional_epoch_ts_stays_live() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics/cpu-usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": 21.5,
            "ts": 1_718_000_000_000.25
        })))
        .mount(&server)
        .await;

    let fetched = client.metric(MetricKind::Cpu, "S1", sentinel).await;

    assert_eq!(fetched.source, Source::Live);
    assert_eq!(
        fetched.value.ts,
        Some(Timestamp::EpochMillis(1_718_000_000_000.25))
    );
}

// ── Fallback path ───────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_falls_back_to_mock() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let fetched = client.metric(MetricKind::Latency, "S1", sentinel).await;

    assert_eq!(fetched.source, Source::Mock);
    assert_eq!(fetched.value, sentinel());
    // Exactly one request, never retried.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_json_falls_back_to_mock() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let fetched = client.metric(MetricKind::Latency, "S1", sentinel).await;
    assert_eq!(fetched.source, Source::Mock);
    assert_eq!(fetched.value, sentinel());
}

#[tokio::test]
async fn test_wrong_shape_falls_back_to_mock() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "exploded" })))
        .mount(&server)
        .await;

    let fetched = client.ob_records("S1", mock::ob_record).await;
    assert_eq!(fetched.source, Source::Mock);
    assert_eq!(fetched.value.status, OnboardingStatus::Pending);
}

#[tokio::test]
async fn test_unreachable_backend_falls_back_to_mock() {
    // Nothing listens on port 1.
    let client = client_for("http://127.0.0.1:1/api", Duration::from_secs(4));

    let calls = Cell::new(0);
    let fetched = client
        .metric(MetricKind::OpticalRx, "S1", || {
            calls.set(calls.get() + 1);
            sentinel()
        })
        .await;

    assert_eq!(fetched.source, Source::Mock);
    assert_eq!(fetched.value, sentinel());
    assert_eq!(calls.get(), 1);
}

#[tokio::test]
async fn test_timeout_returns_mock_within_bound() {
    let server = MockServer::start().await;
    let client = client_for(&format!("{}/api", server.uri()), Duration::from_millis(1));

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "value": 7, "ts": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let started = Instant::now();
    let fetched = client.metric(MetricKind::Cpu, "S1", sentinel).await;

    assert_eq!(fetched.source, Source::Mock);
    assert_eq!(fetched.value, sentinel());
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "fetch hung for {:?}",
        started.elapsed()
    );
}

// ── Request shape ───────────────────────────────────────────────────

#[tokio::test]
async fn test_trigger_posts_json_serial() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/onboarding/trigger"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "serial": "S1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "triggeredAt": "2024-06-15T10:30:00Z",
            "serial": "S1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client
        .trigger_onboarding("S1", || mock::trigger_ack("S1"))
        .await;

    assert!(fetched.is_live());
    assert!(fetched.value.ok);
    assert!(fetched.value.triggered_at.is_some());
}

#[tokio::test]
async fn test_trigger_keeps_local_time_stamp() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/onboarding/trigger"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "triggeredAt": "2024-06-15 10:30:00",
            "serial": "S1"
        })))
        .mount(&server)
        .await;

    let fetched = client
        .trigger_onboarding("S1", || mock::trigger_ack("S1"))
        .await;

    assert!(fetched.is_live());
    assert_eq!(
        fetched.value.triggered_at,
        Some(Timestamp::Text("2024-06-15 10:30:00".into()))
    );
}

#[tokio::test]
async fn test_set_environment_posts_serial_and_env() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/onboarding/setOnboardingEnvironment"))
        .and(body_json(json!({ "serial": "S1", "env": "qa" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "env": "qa",
            "serial": "S1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client
        .set_onboarding_environment("S1", lmate_api::Environment::Qa, || {
            mock::environment_ack("S1", lmate_api::Environment::Qa)
        })
        .await;

    assert!(fetched.is_live());
    assert_eq!(fetched.value.env, lmate_api::Environment::Qa);
}

// ── Strict path ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_strict_fetch_surfaces_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client
        .fetch::<MetricReading>("/metrics/ping?serial=S1", &RequestOptions::default())
        .await;

    match result {
        Err(Error::Status { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_strict_fetch_surfaces_decode_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = client
        .fetch::<MetricReading>("/metrics/ping?serial=S1", &RequestOptions::default())
        .await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => assert_eq!(body, "<html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_strict_fetch_reports_timeout() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri(), Duration::from_millis(20));

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let result = client
        .fetch::<MetricReading>("/metrics/ping", &RequestOptions::default())
        .await;

    let err = result.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got: {err:?}");
}
