//! MarginEdge API layer: transport, rate-limit retry, pagination, and caching.
//!
//! Requests flow leaf-first through these modules:
//!
//! - [`transport`] — authenticated GET against the public API base. The
//!   [`Transport`] trait is the test seam.
//! - [`retry`] — HTTP 429 backoff that doubles per consecutive failure and
//!   resets after success. Other non-2xx statuses fail immediately.
//! - [`pagination`] — follows `nextPage` tokens, concatenating the
//!   resource's named list field across pages.
//! - [`cache`] — per-client cache keyed by resource and filters.
//! - [`client`] — [`MarginEdgeClient`], which owns all of the above.

pub mod cache;
pub mod client;
pub mod error;
pub mod pagination;
pub mod resource;
pub mod retry;
pub mod transport;

pub use cache::{ResourceCache, ResourceKey};
pub use client::{ClientConfig, MarginEdgeClient};
pub use error::ApiError;
pub use resource::Resource;
pub use retry::{RateLimitRetry, RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{HttpTransport, Params, RawResponse, Transport, TransportFuture};
