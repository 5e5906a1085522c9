//! Error taxonomy for the MarginEdge API layer.

use thiserror::Error;

/// Failures surfaced by the transport, retry, and pagination layers.
///
/// HTTP 429 never appears here unless a retry ceiling was configured and
/// exhausted: the retry wrapper absorbs rate limiting.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// Any non-2xx status other than 429.
    #[error("MarginEdge API HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("failed to decode response from '{path}': {message}")]
    Decode { path: String, message: String },

    /// A page did not carry the expected list-valued field.
    #[error("response from '{path}' has no list field '{field}'")]
    MissingListField { path: String, field: String },

    /// Still rate limited after the configured number of retries.
    #[error("rate limited on '{path}' after {attempts} attempts")]
    RateLimited { path: String, attempts: u32 },
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}
