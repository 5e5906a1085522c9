//! Vendor-centric analytics: purchases, spend ranking, performance.

use super::products::{ProductMatch, resolve_product};
use super::{Dataset, Lookup};
use crate::model::Order;
use serde::Serialize;

/// Label used for orders with no vendor name.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";
/// Label used for line items with no vendor item name.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

fn vendor_label(order: &Order) -> &str {
    if order.vendor_name.is_empty() {
        UNKNOWN_VENDOR
    } else {
        &order.vendor_name
    }
}

/// Accumulate `amount` under `key`, keeping first-seen order.
fn add_to<'a>(totals: &mut Vec<(&'a str, f64)>, key: &'a str, amount: f64) {
    match totals.iter_mut().find(|(k, _)| *k == key) {
        Some((_, total)) => *total += amount,
        None => totals.push((key, amount)),
    }
}

/// Descending by amount; ties keep their first-seen order.
fn rank(totals: &mut [(&str, f64)]) {
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
}

// ── Purchases ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSpend {
    pub item: String,
    pub spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorTotal {
    pub vendor: String,
    pub quantity: f64,
    pub spend: f64,
}

/// One line item of a product purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Purchase {
    pub date: String,
    pub vendor: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Purchases seen from either side: everything bought from one vendor, or
/// every vendor one product was bought from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VendorPurchases {
    ByVendor {
        vendor: String,
        items: Vec<ItemSpend>,
        total_spend: f64,
    },
    ByProduct {
        product: ProductMatch,
        vendors: Vec<VendorTotal>,
        purchases: Vec<Purchase>,
    },
}

/// Whether `name` is a known vendor (vendor list or order vendor names),
/// ignoring case. Returns the canonical spelling.
fn known_vendor<'a>(ds: &'a Dataset, name: &str) -> Option<&'a str> {
    let name = name.trim();
    ds.vendors
        .iter()
        .map(|v| v.vendor_name.as_str())
        .chain(ds.orders.iter().map(|o| o.vendor_name.as_str()))
        .find(|v| !v.is_empty() && v.eq_ignore_ascii_case(name))
}

/// If `query` names a vendor, per-item spend from that vendor (descending);
/// otherwise per-vendor quantity and spend for the first matching product.
pub fn vendor_purchases(ds: &Dataset, query: &str) -> Lookup<VendorPurchases> {
    if let Some(vendor) = known_vendor(ds, query) {
        let mut spend: Vec<(&str, f64)> = Vec::new();
        for order in ds
            .orders
            .iter()
            .filter(|o| o.vendor_name.eq_ignore_ascii_case(vendor))
        {
            for item in &order.line_items {
                let name = if item.vendor_item_name.is_empty() {
                    UNKNOWN_PRODUCT
                } else {
                    item.vendor_item_name.as_str()
                };
                add_to(&mut spend, name, item.total());
            }
        }
        rank(&mut spend);
        let total_spend = spend.iter().map(|(_, s)| s).sum();
        return Lookup::found(VendorPurchases::ByVendor {
            vendor: vendor.to_string(),
            items: spend
                .into_iter()
                .map(|(item, spend)| ItemSpend {
                    item: item.to_string(),
                    spend,
                })
                .collect(),
            total_spend,
        });
    }

    let Some(product) = resolve_product(ds, query) else {
        return Lookup::not_found(format!("No vendor or product found matching '{query}'."));
    };

    let mut purchases = Vec::new();
    let mut vendors: Vec<VendorTotal> = Vec::new();
    for order in &ds.orders {
        for item in order
            .line_items
            .iter()
            .filter(|li| li.product_id() == product.id())
        {
            let vendor = vendor_label(order);
            match vendors.iter_mut().find(|v| v.vendor == vendor) {
                Some(total) => {
                    total.quantity += item.quantity;
                    total.spend += item.total();
                }
                None => vendors.push(VendorTotal {
                    vendor: vendor.to_string(),
                    quantity: item.quantity,
                    spend: item.total(),
                }),
            }
            purchases.push(Purchase {
                date: order.invoice_date.clone(),
                vendor: vendor.to_string(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: item.total(),
            });
        }
    }
    vendors.sort_by(|a, b| b.spend.total_cmp(&a.spend));

    Lookup::found(VendorPurchases::ByProduct {
        product: ProductMatch::from(product),
        vendors,
        purchases,
    })
}

// ── Spend ranking ──────────────────────────────────────────────────

/// Σ `orderTotal` per vendor, descending, truncated to `limit`.
pub fn top_vendors_by_spend(ds: &Dataset, limit: usize) -> Vec<(String, f64)> {
    top_vendors_in(&ds.orders, limit)
}

pub(crate) fn top_vendors_in(orders: &[Order], limit: usize) -> Vec<(String, f64)> {
    let mut totals: Vec<(&str, f64)> = Vec::new();
    for order in orders {
        add_to(&mut totals, vendor_label(order), order.order_total);
    }
    rank(&mut totals);
    totals
        .into_iter()
        .take(limit)
        .map(|(v, s)| (v.to_string(), s))
        .collect()
}

// ── Performance ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorPerformance {
    pub vendor: String,
    pub total_orders: usize,
    pub total_spend: f64,
    pub avg_order_value: f64,
    /// Percentage of orders whose status is `CLOSED`.
    pub closed_order_rate: f64,
}

pub fn evaluate_vendor_performance(ds: &Dataset, vendor: &str) -> Lookup<VendorPerformance> {
    performance_in(&ds.orders, vendor)
}

pub(crate) fn performance_in(orders: &[Order], vendor: &str) -> Lookup<VendorPerformance> {
    let wanted = vendor.trim();
    let matching: Vec<&Order> = orders
        .iter()
        .filter(|o| o.vendor_name.eq_ignore_ascii_case(wanted))
        .collect();
    if matching.is_empty() {
        return Lookup::not_found(format!("No orders found for vendor '{vendor}'."));
    }

    let total_orders = matching.len();
    let total_spend: f64 = matching.iter().map(|o| o.order_total).sum();
    let closed = matching.iter().filter(|o| o.is_closed()).count();
    Lookup::found(VendorPerformance {
        vendor: matching[0].vendor_name.clone(),
        total_orders,
        total_spend,
        avg_order_value: total_spend / total_orders as f64,
        closed_order_rate: closed as f64 / total_orders as f64 * 100.0,
    })
}

// ── Vendor list ────────────────────────────────────────────────────

/// Distinct vendor names from the vendors resource, or from order vendor
/// names when the vendors resource is empty.
pub fn list_all_vendors(ds: &Dataset) -> Vec<String> {
    let from_vendors: Vec<&str> = ds.vendors.iter().map(|v| v.vendor_name.as_str()).collect();
    let names: Vec<&str> = if from_vendors.iter().any(|n| !n.is_empty()) {
        from_vendors
    } else {
        ds.orders.iter().map(|o| o.vendor_name.as_str()).collect()
    };

    let mut out: Vec<String> = Vec::new();
    for name in names.into_iter().filter(|n| !n.is_empty()) {
        if !out.iter().any(|seen| seen == name) {
            out.push(name.to_string());
        }
    }
    out
}
