//! Analytics answered straight from the API instead of a snapshot.
//!
//! Each method fetches what it needs through a [`MarginEdgeClient`] (list
//! resources come from the client's cache after the first call) and reuses
//! the pure helpers in [`crate::analytics`]. Order-based questions look back
//! over a fixed window, 90 days by default.
//!
//! Per-item failures inside a crawl (one order's detail, one product's
//! price history) are logged and skipped; failures fetching the list
//! resources themselves are returned.

use crate::analytics::products::resolve_product;
use crate::analytics::window_start;
use crate::analytics::vendors::{performance_in, top_vendors_in};
use crate::analytics::{
    Dataset, Lookup, PriceTrend, ProductMatch, Purchase, VendorPerformance, search_products,
};
use crate::api::{ApiError, MarginEdgeClient};
use crate::model::{LineItem, Order, PriceHistoryEntry, Product, parse_records};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Default lookback for order-based questions.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;

/// Price history of one product, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LivePriceHistory {
    pub product: ProductMatch,
    pub entries: Vec<PriceHistoryEntry>,
}

/// First-to-last price movement of one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LivePriceChange {
    pub product: String,
    pub old_price: f64,
    pub new_price: f64,
    pub change: f64,
}

/// Client-backed analytics for one restaurant unit.
#[derive(Debug)]
pub struct LiveAnalytics<'a> {
    client: &'a MarginEdgeClient,
    restaurant_unit_id: String,
    lookback_days: i64,
    detail_pause: Duration,
    today: NaiveDate,
}

impl<'a> LiveAnalytics<'a> {
    pub fn new(client: &'a MarginEdgeClient, restaurant_unit_id: impl Into<String>) -> Self {
        Self {
            client,
            restaurant_unit_id: restaurant_unit_id.into(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            detail_pause: Duration::from_secs(1),
            today: Local::now().date_naive(),
        }
    }

    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    /// Pause between order-detail requests during a crawl.
    pub fn with_detail_pause(mut self, pause: Duration) -> Self {
        self.detail_pause = pause;
        self
    }

    /// Pin "today" (the end of every window).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    // ── Fetch helpers ───────────────────────────────────────────────

    async fn product_dataset(&self) -> Result<Dataset, ApiError> {
        let raw = self.client.products(&self.restaurant_unit_id).await?;
        Ok(Dataset::new(parse_records("product", &raw), vec![], vec![]))
    }

    async fn recent_orders(&self) -> Result<Vec<Order>, ApiError> {
        let start = window_start(self.today, self.lookback_days);
        let raw = self
            .client
            .orders(&self.restaurant_unit_id, start, self.today, None)
            .await?;
        Ok(parse_records("order", &raw))
    }

    /// Price entries for a product over the last `days` days, oldest first.
    async fn history(&self, product: &Product, days: i64) -> Result<Vec<PriceHistoryEntry>, ApiError> {
        let start = window_start(self.today, days);
        let raw = self
            .client
            .product_price_history(&self.restaurant_unit_id, product.id(), start, self.today)
            .await?;
        let mut entries: Vec<PriceHistoryEntry> = parse_records("price history", &raw);
        entries.sort_by_key(|e| (e.day().is_none(), e.day()));
        Ok(entries)
    }

    // ── Questions ───────────────────────────────────────────────────

    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductMatch>, ApiError> {
        Ok(search_products(&self.product_dataset().await?, query))
    }

    /// Product-detail record for the first product matching `query`.
    pub async fn product_details(&self, query: &str) -> Result<Lookup<Value>, ApiError> {
        let ds = self.product_dataset().await?;
        let Some(product) = resolve_product(&ds, query) else {
            return Ok(Lookup::not_found(format!("No product found matching '{query}'.")));
        };
        let detail = self
            .client
            .product_detail(&self.restaurant_unit_id, product.id())
            .await?;
        Ok(Lookup::found(detail))
    }

    /// Full price history (over the lookback window) for the first match.
    pub async fn price_history(&self, query: &str) -> Result<Lookup<LivePriceHistory>, ApiError> {
        let ds = self.product_dataset().await?;
        let Some(product) = resolve_product(&ds, query) else {
            return Ok(Lookup::not_found(format!("No product found matching '{query}'.")));
        };
        let entries = self.history(product, self.lookback_days).await?;
        Ok(Lookup::found(LivePriceHistory {
            product: ProductMatch::from(product),
            entries,
        }))
    }

    /// Every purchase of the first matching product, crawling order detail
    /// for each order in the lookback window.
    pub async fn vendor_purchases(&self, query: &str) -> Result<Lookup<Vec<Purchase>>, ApiError> {
        let ds = self.product_dataset().await?;
        let Some(product) = resolve_product(&ds, query) else {
            return Ok(Lookup::not_found(format!("No product found matching '{query}'.")));
        };
        let orders = self.recent_orders().await?;
        info!(
            "Crawling {} orders for purchases of {}",
            orders.len(),
            product.name()
        );

        let mut purchases = Vec::new();
        for (i, order) in orders.iter().enumerate() {
            if i > 0 && !self.detail_pause.is_zero() {
                tokio::time::sleep(self.detail_pause).await;
            }
            let detail = match self
                .client
                .order_detail(&self.restaurant_unit_id, &order.order_id)
                .await
            {
                Ok(detail) => detail,
                Err(e) => {
                    warn!("Skipping order {}: {e}", order.order_id);
                    continue;
                }
            };
            let items = detail.get("lineItems").cloned().unwrap_or_default();
            let items: Vec<LineItem> = match items {
                Value::Array(items) => parse_records("line item", &items),
                _ => Vec::new(),
            };
            purchases.extend(
                items
                    .iter()
                    .filter(|li| li.product_id() == product.id())
                    .map(|li| Purchase {
                        date: order.invoice_date.clone(),
                        vendor: order.vendor_name.clone(),
                        quantity: li.quantity,
                        unit_price: li.unit_price,
                        total_price: li.total(),
                    }),
            );
        }
        Ok(Lookup::found(purchases))
    }

    pub async fn top_vendors_by_spend(&self, limit: usize) -> Result<Vec<(String, f64)>, ApiError> {
        Ok(top_vendors_in(&self.recent_orders().await?, limit))
    }

    /// Products whose first and last price in the last `days` days differ.
    /// A product whose history cannot be fetched is skipped.
    pub async fn price_changes(&self, days: i64) -> Result<Vec<LivePriceChange>, ApiError> {
        let ds = self.product_dataset().await?;
        let mut changes = Vec::new();
        for product in &ds.products {
            let entries = match self.history(product, days).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Skipping price history for {}: {e}", product.name());
                    continue;
                }
            };
            let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
                continue;
            };
            if entries.len() > 1 && first.price != last.price {
                changes.push(LivePriceChange {
                    product: product.name().to_string(),
                    old_price: first.price,
                    new_price: last.price,
                    change: last.price - first.price,
                });
            }
        }
        Ok(changes)
    }

    pub async fn analyze_price_trends(
        &self,
        query: &str,
        days: i64,
    ) -> Result<Lookup<PriceTrend>, ApiError> {
        let ds = self.product_dataset().await?;
        let Some(product) = resolve_product(&ds, query) else {
            return Ok(Lookup::not_found(format!("No product found matching '{query}'.")));
        };
        let prices: Vec<f64> = self
            .history(product, days)
            .await?
            .iter()
            .map(|e| e.price)
            .collect();
        Ok(match PriceTrend::from_series(product.name(), &prices) {
            Some(trend) => Lookup::found(trend),
            None => Lookup::not_found("No price history available for this product."),
        })
    }

    pub async fn evaluate_vendor_performance(
        &self,
        vendor: &str,
    ) -> Result<Lookup<VendorPerformance>, ApiError> {
        Ok(performance_in(&self.recent_orders().await?, vendor))
    }
}
