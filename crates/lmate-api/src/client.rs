// Resilient HTTP client
//
// Wraps `reqwest::Client` with base-URL construction, a bounded wait per
// call, and the live-first / mock-fallback acquisition path. Endpoint
// wrappers live in `endpoints.rs` as inherent methods to keep this module
// focused on transport mechanics.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW_CHARS: usize = 200;

// ── Provenance ───────────────────────────────────────────────────────

/// Where a fetched value came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    /// Decoded from a successful backend response.
    Live,
    /// Produced by the caller-supplied mock generator after a failure.
    Mock,
}

/// Outcome of a resilient fetch: always a value, tagged with its source.
///
/// Callers that want the value without provenance use
/// [`into_inner`](Self::into_inner).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Fetched<T> {
    pub fn live(value: T) -> Self {
        Self {
            value,
            source: Source::Live,
        }
    }

    pub fn mock(value: T) -> Self {
        Self {
            value,
            source: Source::Mock,
        }
    }

    pub fn is_live(&self) -> bool {
        self.source == Source::Live
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// Transform the value, keeping its provenance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            source: self.source,
        }
    }
}

// ── Request options ──────────────────────────────────────────────────

/// Method, headers, and optional JSON body for one call. Defaults to a GET.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    /// POST with a JSON body and an explicit `Content-Type` header.
    pub fn post_json(body: serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            method: Method::POST,
            headers,
            body: Some(body),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// HTTP client for the L-Mate backend.
///
/// Every call issues exactly one request, never retried, bounded by the
/// configured timeout. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root every endpoint path is appended to
    /// (e.g. `http://10.0.0.5/api`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The bounded wait applied to each call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append a path (with optional query) to the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}{path}");
        Ok(Url::parse(&full)?)
    }

    // ── Acquisition ──────────────────────────────────────────────────

    /// Fetch and decode `path`, surfacing every failure.
    ///
    /// If the bound elapses the request future is dropped, which cancels
    /// the in-flight request.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        match tokio::time::timeout(self.timeout, self.execute(url, options)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Fetch and decode `path`, substituting `mock()` on any failure.
    ///
    /// Never returns an error. `mock` is invoked only when the live call
    /// failed, at most once.
    pub async fn fetch_resilient<T, F>(
        &self,
        path: &str,
        options: &RequestOptions,
        mock: F,
    ) -> Fetched<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.fetch(path, options).await {
            Ok(value) => {
                trace!(path, "live response");
                Fetched::live(value)
            }
            Err(e) => {
                debug!(path, error = %e, "falling back to mock");
                Fetched::mock(mock())
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: Url,
        options: &RequestOptions,
    ) -> Result<T, Error> {
        debug!("{} {}", options.method, url);

        let mut builder = self
            .http
            .request(options.method.clone(), url)
            .headers(options.headers.clone());
        if let Some(ref body) = options.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_owned()
            } else {
                preview(&body)
            };
            return Err(Error::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Duration::from_millis(100),
        )
    }

    #[test]
    fn url_appends_path_to_base() {
        let c = client("http://10.0.0.5/api");
        let url = c.url("/ztp/dhcp?serial=ABC").unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.5/api/ztp/dhcp?serial=ABC");
    }

    #[test]
    fn url_tolerates_trailing_slash_on_base() {
        let c = client("http://10.0.0.5/api/");
        let url = c.url("/metrics/ping?serial=X").unwrap();
        assert_eq!(url.path(), "/api/metrics/ping");
        assert_eq!(url.query(), Some("serial=X"));
    }

    #[test]
    fn default_options_are_a_bare_get() {
        let opts = RequestOptions::default();
        assert_eq!(opts.method, Method::GET);
        assert!(opts.headers.is_empty());
        assert!(opts.body.is_none());
    }

    #[test]
    fn post_json_sets_method_header_and_body() {
        let opts = RequestOptions::post_json(serde_json::json!({ "serial": "S1" }));
        assert_eq!(opts.method, Method::POST);
        assert_eq!(opts.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(opts.body.unwrap()["serial"], "S1");
    }

    #[test]
    fn fetched_map_keeps_source() {
        let f = Fetched::mock(21).map(|v| v * 2);
        assert_eq!(f.value, 42);
        assert_eq!(f.source, Source::Mock);
        assert!(!f.is_live());
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Live).unwrap(), "\"live\"");
        assert_eq!(Source::Mock.to_string(), "mock");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }
}
