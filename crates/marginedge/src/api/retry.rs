//! Rate-limit retry with exponential backoff.
//!
//! HTTP 429 responses are retried with a delay that doubles on every
//! consecutive rate-limited attempt and snaps back to the base delay after
//! any successful response. Every other non-2xx status fails immediately.
//!
//! The current delay is owned by the [`RateLimitRetry`] instance and carries
//! over between calls, so a burst of rate limiting on one request also slows
//! down the next one until something succeeds. Intended for sequential use:
//! concurrent callers would interleave the shared backoff state.

use super::transport::{Params, Transport};
use super::ApiError;
use futures::future::BoxFuture;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// Status code that triggers backoff.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Backoff configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first retry; also the value restored after success.
    pub base_delay: Duration,
    /// Maximum number of retries for a single request. `None` retries for as
    /// long as the server keeps answering 429.
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_retries: None,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given base delay and no retry ceiling.
    pub fn with_base_delay(base_delay: Duration) -> Self {
        Self {
            base_delay,
            ..Default::default()
        }
    }

    /// Cap the number of retries per request.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// Something that can wait. Abstracted so the backoff sequence can be
/// observed without actually sleeping.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// Production sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Wraps a [`Transport`] with 429 backoff and JSON decoding.
pub struct RateLimitRetry {
    policy: RetryPolicy,
    delay: Mutex<Duration>,
    sleeper: Box<dyn Sleeper>,
}

impl std::fmt::Debug for RateLimitRetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitRetry")
            .field("policy", &self.policy)
            .field("delay", &self.current_delay())
            .finish()
    }
}

impl RateLimitRetry {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, TokioSleeper)
    }

    pub fn with_sleeper(policy: RetryPolicy, sleeper: impl Sleeper + 'static) -> Self {
        Self {
            delay: Mutex::new(policy.base_delay),
            policy,
            sleeper: Box::new(sleeper),
        }
    }

    /// The delay the next 429 would wait for.
    pub fn current_delay(&self) -> Duration {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Issue `GET path` through `transport`, retrying on 429, and decode the
    /// JSON body.
    pub async fn request(
        &self,
        transport: &dyn Transport,
        path: &str,
        params: &Params,
    ) -> Result<serde_json::Value, ApiError> {
        let mut retries = 0u32;
        loop {
            let resp = transport.get(path, params).await?;

            if resp.status == TOO_MANY_REQUESTS {
                if let Some(max) = self.policy.max_retries
                    && retries >= max
                {
                    return Err(ApiError::RateLimited {
                        path: path.to_string(),
                        attempts: retries + 1,
                    });
                }
                let delay = self.take_delay();
                warn!(
                    "Rate limited on {path} (retry {}). Backing off for {delay:?}...",
                    retries + 1
                );
                self.sleeper.sleep(delay).await;
                retries += 1;
                continue;
            }

            if !resp.is_success() {
                return Err(ApiError::Http {
                    status: resp.status,
                    body: resp.body,
                });
            }

            self.reset();
            if retries > 0 {
                debug!("{path} succeeded after {retries} rate-limit retries");
            }
            return serde_json::from_str(&resp.body).map_err(|e| ApiError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            });
        }
    }

    /// Return the current delay and double the stored one.
    fn take_delay(&self) -> Duration {
        let mut delay = self.delay.lock().unwrap_or_else(|e| e.into_inner());
        let current = *delay;
        *delay = current.saturating_mul(2);
        current
    }

    fn reset(&self) {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner()) = self.policy.base_delay;
    }
}
