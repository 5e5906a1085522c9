//! Authenticated GET transport for the MarginEdge public API.
//!
//! The [`Transport`] trait is the seam between the retry/pagination logic and
//! the network. [`HttpTransport`] is the production implementation; tests
//! plug in scripted transports that replay canned responses.

use super::ApiError;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Base endpoint of the public API.
pub const MARGINEDGE_BASE_URL: &str = "https://api.marginedge.com/public";

/// Query parameters for a request. Ordered so that cache keys built from
/// them are canonical.
pub type Params = BTreeMap<String, String>;

/// Boxed future returned by [`Transport::get`].
pub type TransportFuture<'a> = BoxFuture<'a, Result<RawResponse, ApiError>>;

/// Status and body of a completed HTTP exchange.
///
/// The transport does not interpret the status: 429 handling and error
/// mapping happen one layer up in [`RateLimitRetry`](super::retry::RateLimitRetry).
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single GET request against `path` (relative to the API base).
///
/// Implementations must not retry; that is the caller's job.
pub trait Transport: Send + Sync {
    fn get<'a>(&'a self, path: &'a str, params: &'a Params) -> TransportFuture<'a>;
}

/// reqwest-backed transport that attaches the API-key headers.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    /// Create a transport against the default base URL.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_base_url(api_key, MARGINEDGE_BASE_URL, Duration::from_secs(120))
    }

    /// Create a transport against a custom base URL (proxies, local fakes).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("marginedge-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// The base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, path: &'a str, params: &'a Params) -> TransportFuture<'a> {
        Box::pin(async move {
            let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
            debug!("GET {url} params={params:?}");
            let start = Instant::now();

            let resp = self
                .client
                .get(&url)
                .header("x-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .header("Accept", "application/json")
                .query(params)
                .send()
                .await
                .map_err(|e| ApiError::Request(e.to_string()))?;

            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .map_err(|e| ApiError::Request(format!("failed to read response: {e}")))?;

            debug!(
                "GET {path}: HTTP {status} in {:.0}ms ({} bytes)",
                start.elapsed().as_secs_f64() * 1000.0,
                body.len()
            );
            trace!("GET {path} body: {body}");
            Ok(RawResponse { status, body })
        })
    }
}
