//! Pure analytics over an already-fetched dataset.
//!
//! Every helper here is a plain function over a [`Dataset`]: no network, no
//! clock. Helpers that look at a trailing window take `today` explicitly; an
//! order is inside a `days`-day window when its invoice date is strictly
//! after `today - days`.
//!
//! Lookups that match nothing return [`Lookup::NotFound`] rather than an
//! error, so a conversational caller can relay the miss to the user.
//!
//! - [`products`] — search, details, current price, price history, price
//!   changes, price trends, sales totals.
//! - [`vendors`] — vendor purchases, top vendors by spend, vendor
//!   performance, vendor list.
//! - [`summary`] — record counts and order date range.

pub mod products;
pub mod summary;
pub mod vendors;

pub use products::{
    PriceChange, PricePoint, PriceTrend, ProductDetails, ProductMatch, ProductPrice,
    ProductPriceHistory, ProductSales, Trend, analyze_price_trends, price_changes, price_history,
    product_details, product_price, product_sales, search_products,
};
pub use summary::{DataSummary, data_summary};
pub use vendors::{
    ItemSpend, Purchase, VendorPerformance, VendorPurchases, VendorTotal,
    evaluate_vendor_performance, list_all_vendors, top_vendors_by_spend, vendor_purchases,
};

use crate::model::{Order, Product, Vendor, parse_records};
use crate::snapshot::Snapshot;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Result of a lookup by product or vendor name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Lookup<T> {
    Found { result: T },
    NotFound { message: String },
}

impl<T> Lookup<T> {
    pub fn found(result: T) -> Self {
        Lookup::Found { result }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Lookup::NotFound {
            message: message.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }

    /// The found value, if any.
    pub fn into_found(self) -> Option<T> {
        match self {
            Lookup::Found { result } => Some(result),
            Lookup::NotFound { .. } => None,
        }
    }
}

/// Typed view over a snapshot, ready for analytics.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub products: Vec<Product>,
    pub vendors: Vec<Vendor>,
    pub orders: Vec<Order>,
    pub restaurant_unit_count: usize,
    pub category_count: usize,
}

impl Dataset {
    pub fn new(products: Vec<Product>, vendors: Vec<Vendor>, orders: Vec<Order>) -> Self {
        Self {
            products,
            vendors,
            orders,
            ..Default::default()
        }
    }

    /// Parse a snapshot's raw arrays, skipping records that do not fit.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            products: parse_records("product", &snapshot.products),
            vendors: parse_records("vendor", &snapshot.vendors),
            orders: parse_records("order", &snapshot.orders),
            restaurant_unit_count: snapshot.restaurant_units.len(),
            category_count: snapshot.categories.len(),
        }
    }

    /// Product by exact id.
    pub fn product_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    /// Orders whose invoice date falls inside the trailing window.
    pub fn orders_in_window(&self, today: NaiveDate, days: i64) -> impl Iterator<Item = &Order> {
        self.orders
            .iter()
            .filter(move |o| in_window(o.invoice_day(), today, days))
    }
}

/// `today - days`, saturating at the calendar's bounds: a lookback too long
/// to represent starts at [`NaiveDate::MIN`], a negative one too large at
/// [`NaiveDate::MAX`].
pub fn window_start(today: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|span| today.checked_sub_signed(span))
        .unwrap_or(if days >= 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Whether `day` is strictly after `today - days`. Undated records are
/// outside every window.
pub fn in_window(day: Option<NaiveDate>, today: NaiveDate, days: i64) -> bool {
    match day {
        Some(d) => d > window_start(today, days),
        None => false,
    }
}
