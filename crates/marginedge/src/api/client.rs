//! The MarginEdge API client: transport, backoff state, and resource cache
//! owned by one instance.

use super::cache::{ResourceCache, ResourceKey};
use super::pagination;
use super::resource::{self, Resource};
use super::retry::{RateLimitRetry, RetryPolicy, Sleeper};
use super::transport::{HttpTransport, MARGINEDGE_BASE_URL, Params, Transport};
use super::ApiError;
use crate::snapshot::{Snapshot, SnapshotOptions};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for [`MarginEdgeClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Value of the `x-api-key` header.
    pub api_key: String,
    /// API base URL. Default: [`MARGINEDGE_BASE_URL`].
    pub base_url: String,
    /// Per-request timeout. Default: 120 s.
    pub timeout: Duration,
    /// 429 backoff policy.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: MARGINEDGE_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Client for the MarginEdge public API.
///
/// List resources are fetched exhaustively (every page) and cached for the
/// life of the instance, keyed by resource and filters. Order detail,
/// product detail, and price history are always fetched fresh.
///
/// All state (backoff delay, cache) is per instance. Calls are expected to
/// be made one at a time.
pub struct MarginEdgeClient {
    transport: Box<dyn Transport>,
    retry: RateLimitRetry,
    cache: Mutex<ResourceCache>,
}

impl std::fmt::Debug for MarginEdgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarginEdgeClient")
            .field("retry", &self.retry)
            .field("cached_resources", &self.cached_len())
            .finish()
    }
}

impl MarginEdgeClient {
    /// Build an HTTP-backed client.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport =
            HttpTransport::with_base_url(config.api_key, config.base_url, config.timeout)?;
        Ok(Self::with_transport(transport, RateLimitRetry::new(config.retry)))
    }

    /// Build a client over any transport and retry wrapper.
    pub fn with_transport(transport: impl Transport + 'static, retry: RateLimitRetry) -> Self {
        Self {
            transport: Box::new(transport),
            retry,
            cache: Mutex::new(ResourceCache::new()),
        }
    }

    /// Build a client over any transport with a custom sleeper (tests, dry runs).
    pub fn with_sleeper(
        transport: impl Transport + 'static,
        policy: RetryPolicy,
        sleeper: impl Sleeper + 'static,
    ) -> Self {
        Self::with_transport(transport, RateLimitRetry::with_sleeper(policy, sleeper))
    }

    // ── Raw access ──────────────────────────────────────────────────

    /// Single GET through the rate-limit wrapper.
    pub async fn request(&self, path: &str, params: &Params) -> Result<Value, ApiError> {
        self.retry.request(self.transport.as_ref(), path, params).await
    }

    /// Every record of a paginated resource, bypassing the cache.
    pub async fn fetch_all(&self, resource: Resource, params: &Params) -> Result<Vec<Value>, ApiError> {
        pagination::fetch_all(
            &self.retry,
            self.transport.as_ref(),
            resource.path(),
            params,
            resource.list_field(),
        )
        .await
    }

    /// Cached variant of [`fetch_all`](Self::fetch_all).
    pub async fn get_or_fetch(
        &self,
        resource: Resource,
        params: &Params,
    ) -> Result<Vec<Value>, ApiError> {
        let key = ResourceKey::new(resource.path(), params);
        if let Some(records) = self.lock_cache().get(&key) {
            debug!("cache hit: {key} ({} records)", records.len());
            return Ok(records);
        }

        let records = self.fetch_all(resource, params).await?;
        info!("Fetched {} {resource} records", records.len());
        self.lock_cache().put(key, records.clone());
        Ok(records)
    }

    /// Forget every cached list.
    pub fn invalidate_cache(&self) {
        self.lock_cache().invalidate_all();
    }

    /// Number of cached resource keys.
    pub fn cached_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// `(hits, misses)` since the client was created.
    pub fn cache_stats(&self) -> (u64, u64) {
        let cache = self.lock_cache();
        (cache.hits(), cache.misses())
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, ResourceCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Resources ───────────────────────────────────────────────────

    pub async fn restaurant_units(&self) -> Result<Vec<Value>, ApiError> {
        self.get_or_fetch(Resource::RestaurantUnits, &Params::new())
            .await
    }

    pub async fn categories(&self, restaurant_unit_id: &str) -> Result<Vec<Value>, ApiError> {
        self.get_or_fetch(Resource::Categories, &unit_params(restaurant_unit_id))
            .await
    }

    pub async fn products(&self, restaurant_unit_id: &str) -> Result<Vec<Value>, ApiError> {
        self.get_or_fetch(Resource::Products, &unit_params(restaurant_unit_id))
            .await
    }

    pub async fn vendors(&self, restaurant_unit_id: &str) -> Result<Vec<Value>, ApiError> {
        self.get_or_fetch(Resource::Vendors, &unit_params(restaurant_unit_id))
            .await
    }

    /// Orders invoiced between `start` and `end` (inclusive), optionally
    /// filtered by status.
    pub async fn orders(
        &self,
        restaurant_unit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        status: Option<&str>,
    ) -> Result<Vec<Value>, ApiError> {
        let mut params = date_range_params(restaurant_unit_id, start, end);
        if let Some(status) = status {
            params.insert("orderStatus".into(), status.to_string());
        }
        self.get_or_fetch(Resource::Orders, &params).await
    }

    /// Full detail (including `lineItems`) of one order. Never cached.
    pub async fn order_detail(
        &self,
        restaurant_unit_id: &str,
        order_id: &str,
    ) -> Result<Value, ApiError> {
        self.request(
            &resource::order_detail_path(order_id),
            &unit_params(restaurant_unit_id),
        )
        .await
    }

    /// Full detail of one product. Never cached.
    pub async fn product_detail(
        &self,
        restaurant_unit_id: &str,
        product_id: &str,
    ) -> Result<Value, ApiError> {
        self.request(
            &resource::product_detail_path(product_id),
            &unit_params(restaurant_unit_id),
        )
        .await
    }

    /// Dated price entries for one product. Never cached.
    pub async fn product_price_history(
        &self,
        restaurant_unit_id: &str,
        product_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Value>, ApiError> {
        pagination::fetch_all(
            &self.retry,
            self.transport.as_ref(),
            &resource::price_history_path(product_id),
            &date_range_params(restaurant_unit_id, start, end),
            Resource::PriceHistory.list_field(),
        )
        .await
    }

    /// Crawl every resource for one restaurant unit into a [`Snapshot`].
    pub async fn fetch_snapshot(
        &self,
        restaurant_unit_id: &str,
        options: &SnapshotOptions,
        today: NaiveDate,
    ) -> Result<Snapshot, ApiError> {
        Snapshot::fetch(self, restaurant_unit_id, options, today).await
    }
}

fn unit_params(restaurant_unit_id: &str) -> Params {
    let mut params = Params::new();
    params.insert("restaurantUnitId".into(), restaurant_unit_id.to_string());
    params
}

fn date_range_params(restaurant_unit_id: &str, start: NaiveDate, end: NaiveDate) -> Params {
    let mut params = unit_params(restaurant_unit_id);
    params.insert("startDate".into(), start.format("%Y-%m-%d").to_string());
    params.insert("endDate".into(), end.format("%Y-%m-%d").to_string());
    params
}
