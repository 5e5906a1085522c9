//! Product-centric analytics: search, prices, history, changes, trends, sales.

use super::{Dataset, Lookup};
use crate::model::{Order, Product};
use chrono::NaiveDate;
use serde::Serialize;

// ── Search ─────────────────────────────────────────────────────────

/// Compact product row returned by searches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductMatch {
    pub id: String,
    pub name: String,
    pub category: String,
    pub latest_price: Option<f64>,
    pub unit: Option<String>,
}

impl From<&Product> for ProductMatch {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id().to_string(),
            name: p.name().to_string(),
            category: p.category_name().to_string(),
            latest_price: p.latest_price,
            unit: p.report_by_unit.clone(),
        }
    }
}

/// Reduce a conversational query to the term matched against product
/// names: lowercase and trim. An `"all <plural>"` query drops the prefix
/// and the plural "s"; any other query is matched as typed.
///
/// `"All Wines"` → `"wine"`, `"Chips"` → `"chips"`.
pub fn search_term(query: &str) -> String {
    let lower = query.trim().to_lowercase();
    let Some(rest) = lower.strip_prefix("all ") else {
        return lower;
    };
    let rest = rest.trim();
    match rest.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
        _ => rest.to_string(),
    }
}

/// Products whose name or category contains the search term, case-insensitive.
pub(crate) fn find_products<'a>(ds: &'a Dataset, query: &str) -> Vec<&'a Product> {
    let term = search_term(query);
    ds.products
        .iter()
        .filter(|p| {
            p.name().to_lowercase().contains(&term)
                || p.category_name().to_lowercase().contains(&term)
        })
        .collect()
}

/// First product matching `query`: an exact id wins, then the first
/// name/category match.
pub(crate) fn resolve_product<'a>(ds: &'a Dataset, query: &str) -> Option<&'a Product> {
    ds.product_by_id(query.trim())
        .or_else(|| find_products(ds, query).into_iter().next())
}

fn no_product(query: &str) -> String {
    format!("No product found matching '{query}'.")
}

/// Case-insensitive substring search over product names and categories.
/// Order follows the dataset.
pub fn search_products(ds: &Dataset, query: &str) -> Vec<ProductMatch> {
    find_products(ds, query)
        .into_iter()
        .map(ProductMatch::from)
        .collect()
}

// ── Details and current price ──────────────────────────────────────

/// Full product record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetails {
    pub id: String,
    pub name: String,
    pub category: String,
    pub latest_price: Option<f64>,
    pub unit: Option<String>,
    pub tax_exempt: Option<bool>,
    pub on_inventory: Option<bool>,
}

pub fn product_details(ds: &Dataset, query: &str) -> Lookup<ProductDetails> {
    match resolve_product(ds, query) {
        Some(p) => Lookup::found(ProductDetails {
            id: p.id().to_string(),
            name: p.name().to_string(),
            category: p.category_name().to_string(),
            latest_price: p.latest_price,
            unit: p.report_by_unit.clone(),
            tax_exempt: p.tax_exempt,
            on_inventory: p.on_inventory,
        }),
        None => Lookup::not_found(no_product(query)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPrice {
    pub name: String,
    pub latest_price: Option<f64>,
    pub unit: Option<String>,
}

/// Latest known price for every product matching `query`.
pub fn product_price(ds: &Dataset, query: &str) -> Lookup<Vec<ProductPrice>> {
    let prices: Vec<_> = find_products(ds, query)
        .into_iter()
        .map(|p| ProductPrice {
            name: p.name().to_string(),
            latest_price: p.latest_price,
            unit: p.report_by_unit.clone(),
        })
        .collect();
    if prices.is_empty() {
        Lookup::not_found(no_product(query))
    } else {
        Lookup::found(prices)
    }
}

// ── Price history ──────────────────────────────────────────────────

/// One observed purchase price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
    pub vendor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPriceHistory {
    pub product: ProductMatch,
    pub entries: Vec<PricePoint>,
}

/// Purchase prices of one product across orders, ascending by invoice date.
/// Undated entries sort last.
pub(crate) fn price_points(orders: &[Order], product_id: &str) -> Vec<PricePoint> {
    let mut points: Vec<(Option<NaiveDate>, PricePoint)> = orders
        .iter()
        .flat_map(|o| {
            o.line_items
                .iter()
                .filter(move |li| li.product_id() == product_id)
                .map(move |li| {
                    (
                        o.invoice_day(),
                        PricePoint {
                            date: o.invoice_date.clone(),
                            price: li.unit_price,
                            vendor: o.vendor_name.clone(),
                        },
                    )
                })
        })
        .collect();
    points.sort_by_key(|(day, _)| (day.is_none(), *day));
    points.into_iter().map(|(_, p)| p).collect()
}

pub fn price_history(ds: &Dataset, query: &str) -> Lookup<ProductPriceHistory> {
    let Some(product) = resolve_product(ds, query) else {
        return Lookup::not_found(no_product(query));
    };
    Lookup::found(ProductPriceHistory {
        product: ProductMatch::from(product),
        entries: price_points(&ds.orders, product.id()),
    })
}

// ── Price changes ──────────────────────────────────────────────────

/// A product whose purchase price moved inside the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChange {
    pub product: String,
    pub old_price: f64,
    pub new_price: f64,
}

/// Known products that were bought at more than one distinct unit price
/// in the last `days` days, in product order. Line items whose id is empty
/// or not in the product set are ignored.
///
/// `old_price` and `new_price` are the minimum and maximum observed prices,
/// not the chronologically first and last; a falling price therefore still
/// reports `old < new`. [`crate::live::LiveAnalytics::price_changes`] uses
/// the chronological endpoints instead.
pub fn price_changes(ds: &Dataset, days: i64, today: NaiveDate) -> Vec<PriceChange> {
    let window: Vec<&Order> = ds.orders_in_window(today, days).collect();
    ds.products
        .iter()
        .filter(|p| !p.id().is_empty())
        .filter_map(|product| {
            let mut prices: Vec<f64> = Vec::new();
            for item in window
                .iter()
                .flat_map(|o| o.line_items.iter())
                .filter(|li| li.product_id() == product.id())
            {
                if !prices.contains(&item.unit_price) {
                    prices.push(item.unit_price);
                }
            }
            (prices.len() > 1).then(|| PriceChange {
                product: product.name().to_string(),
                old_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
                new_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            })
        })
        .collect()
}

// ── Trends ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Direction and size of a product's price movement over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTrend {
    pub product: String,
    pub trend: Trend,
    pub oldest_price: f64,
    pub newest_price: f64,
    pub price_change: f64,
    /// `None` when the oldest price is zero.
    pub percent_change: Option<f64>,
    pub observations: usize,
}

impl PriceTrend {
    /// Trend between the first and last of a chronologically ordered
    /// series. `None` for an empty series.
    pub fn from_series(product: impl Into<String>, prices: &[f64]) -> Option<Self> {
        let oldest = *prices.first()?;
        let newest = *prices.last()?;
        let change = newest - oldest;
        let trend = if change > 0.0 {
            Trend::Increasing
        } else if change < 0.0 {
            Trend::Decreasing
        } else {
            Trend::Stable
        };
        Some(Self {
            product: product.into(),
            trend,
            oldest_price: oldest,
            newest_price: newest,
            price_change: change,
            percent_change: (oldest != 0.0).then(|| change / oldest * 100.0),
            observations: prices.len(),
        })
    }
}

/// Price trend for the product matching `query` over the last `days` days.
pub fn analyze_price_trends(
    ds: &Dataset,
    query: &str,
    days: i64,
    today: NaiveDate,
) -> Lookup<PriceTrend> {
    let Some(product) = resolve_product(ds, query) else {
        return Lookup::not_found(no_product(query));
    };
    let window: Vec<Order> = ds.orders_in_window(today, days).cloned().collect();
    let prices: Vec<f64> = price_points(&window, product.id())
        .into_iter()
        .map(|p| p.price)
        .collect();
    match PriceTrend::from_series(product.name(), &prices) {
        Some(trend) => Lookup::found(trend),
        None => Lookup::not_found(format!(
            "No price history available for '{}' in the last {days} days.",
            product.name()
        )),
    }
}

// ── Sales ──────────────────────────────────────────────────────────

/// Total purchased quantity of matching items over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub query: String,
    pub days: i64,
    /// Distinct vendor item names that matched.
    pub items: Vec<String>,
    pub total_quantity: f64,
}

/// Sum of quantities of in-window line items whose vendor item name
/// contains the search term, case-insensitive.
pub fn product_sales(ds: &Dataset, query: &str, days: i64, today: NaiveDate) -> ProductSales {
    let term = search_term(query);
    let mut items: Vec<String> = Vec::new();
    let mut total_quantity = 0.0;
    for item in ds
        .orders_in_window(today, days)
        .flat_map(|o| o.line_items.iter())
        .filter(|li| li.vendor_item_name.to_lowercase().contains(&term))
    {
        total_quantity += item.quantity;
        if !items.contains(&item.vendor_item_name) {
            items.push(item.vendor_item_name.clone());
        }
    }
    ProductSales {
        query: query.to_string(),
        days,
        items,
        total_quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{dataset, today};
    use super::*;

    #[test]
    fn search_term_normalizes_conversational_queries() {
        assert_eq!(search_term("All Wines"), "wine");
        assert_eq!(search_term("  CHICKEN "), "chicken");
        assert_eq!(search_term("all glass"), "glass");
        assert_eq!(search_term("all s"), "s");
        assert_eq!(search_term("Chips"), "chips");
        assert_eq!(search_term("fries"), "fries");
    }

    #[test]
    fn plural_query_does_not_match_longer_unrelated_names() {
        let orders = orders_with(&[serde_json::json!({
            "companyConceptProductId": "c2", "quantity": 4, "vendorItemName": "FRIED CHICKEN"
        })]);
        let ds = Dataset::new(
            vec![product("c1", "Chipotle Peppers"), product("c2", "Fried Chicken")],
            vec![],
            orders,
        );
        assert!(search_products(&ds, "chips").is_empty());
        assert!(search_products(&ds, "fries").is_empty());
        assert_eq!(product_sales(&ds, "fries", 30, today()).total_quantity, 0.0);
        assert_eq!(product_sales(&ds, "fried", 30, today()).total_quantity, 4.0);
    }

    #[test]
    fn chicken_search_is_case_insensitive_and_idempotent() {
        let ds = dataset();
        let lower = search_products(&ds, "chicken");
        let upper = search_products(&ds, "CHICKEN");
        assert_eq!(lower, upper);
        assert_eq!(lower, search_products(&ds, "chicken"));

        let names: Vec<_> = lower.iter().map(|m| m.name.as_str()).collect();
        // "Whole Wings" matches through its "Chicken" category.
        assert_eq!(names, vec!["Chicken Breast", "Whole Wings"]);
    }

    #[test]
    fn plural_query_matches_singular_category() {
        let ds = dataset();
        let wines = search_products(&ds, "all wines");
        assert_eq!(wines.len(), 1);
        assert_eq!(wines[0].name, "House Red");
    }

    #[test]
    fn search_without_match_is_empty() {
        assert!(search_products(&dataset(), "truffle").is_empty());
    }

    #[test]
    fn details_by_id_or_name() {
        let ds = dataset();
        let by_id = product_details(&ds, "p3").into_found().unwrap();
        assert_eq!(by_id.name, "Lime");
        let by_name = product_details(&ds, "chicken breast").into_found().unwrap();
        assert_eq!(by_name.tax_exempt, Some(true));
        assert!(!product_details(&ds, "truffle").is_found());
    }

    #[test]
    fn price_lists_every_match() {
        let ds = dataset();
        let prices = product_price(&ds, "chicken").into_found().unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].latest_price, Some(3.5));
        assert_eq!(prices[1].unit.as_deref(), Some("lb"));
    }

    #[test]
    fn history_is_chronological() {
        let ds = dataset();
        let history = price_history(&ds, "chicken breast").into_found().unwrap();
        let prices: Vec<f64> = history.entries.iter().map(|e| e.price).collect();
        assert_eq!(prices, vec![3.0, 3.5, 3.0]);
        assert_eq!(history.entries[1].vendor, "Sysco");
    }

    #[test]
    fn price_changes_report_min_and_max() {
        let ds = dataset();
        let changes = price_changes(&ds, 30, today());
        assert_eq!(
            changes,
            vec![PriceChange {
                product: "Chicken Breast".into(),
                old_price: 3.0,
                new_price: 3.5,
            }]
        );
    }

    fn product(id: &str, name: &str) -> Product {
        Product {
            company_concept_product_id: id.into(),
            product_name: name.into(),
            ..Default::default()
        }
    }

    /// One order per line item, on consecutive June days.
    fn orders_with(lines: &[serde_json::Value]) -> Vec<Order> {
        let orders: Vec<serde_json::Value> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                serde_json::json!({
                    "invoiceDate": format!("2024-06-{:02}", 10 + i),
                    "lineItems": [line]
                })
            })
            .collect();
        crate::model::parse_records("order", &orders)
    }

    fn orders_at(prices: &[f64]) -> Dataset {
        let lines: Vec<serde_json::Value> = prices
            .iter()
            .map(|price| serde_json::json!({"companyConceptProductId": "x", "unitPrice": price}))
            .collect();
        Dataset::new(vec![product("x", "Olive Oil")], vec![], orders_with(&lines))
    }

    #[test]
    fn distinct_prices_report_a_change() {
        let changes = price_changes(&orders_at(&[5.0, 5.0, 7.0]), 30, today());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].product, "Olive Oil");
        assert_eq!(changes[0].old_price, 5.0);
        assert_eq!(changes[0].new_price, 7.0);
    }

    #[test]
    fn repeated_prices_are_not_a_change() {
        assert!(price_changes(&orders_at(&[5.0, 5.0]), 30, today()).is_empty());
    }

    #[test]
    fn price_changes_skip_items_outside_the_product_set() {
        let lines = [
            serde_json::json!({"vendorItemName": "NAPKINS", "unitPrice": 2.0}),
            serde_json::json!({"vendorItemName": "DELIVERY FEE", "unitPrice": 15.0}),
            serde_json::json!({"companyConceptProductId": "zz", "unitPrice": 1.0}),
            serde_json::json!({"companyConceptProductId": "zz", "unitPrice": 4.0}),
            serde_json::json!({"companyConceptProductId": "p3", "unitPrice": 0.3}),
        ];
        let ds = Dataset::new(vec![product("p3", "Lime")], vec![], orders_with(&lines));
        assert!(price_changes(&ds, 30, today()).is_empty());
    }

    #[test]
    fn price_changes_ignore_orders_outside_window() {
        let ds = dataset();
        // Only o3 (2024-06-29) is inside a 2-day window.
        assert!(price_changes(&ds, 2, today()).is_empty());
    }

    #[test]
    fn trend_from_series() {
        let up = PriceTrend::from_series("x", &[2.0, 3.0]).unwrap();
        assert_eq!(up.trend, Trend::Increasing);
        assert_eq!(up.percent_change, Some(50.0));

        let flat = PriceTrend::from_series("x", &[4.0]).unwrap();
        assert_eq!(flat.trend, Trend::Stable);

        let from_zero = PriceTrend::from_series("x", &[0.0, 1.0]).unwrap();
        assert_eq!(from_zero.percent_change, None);

        assert!(PriceTrend::from_series("x", &[]).is_none());
    }

    #[test]
    fn analyze_trend_over_window() {
        let ds = dataset();
        let trend = analyze_price_trends(&ds, "chicken breast", 30, today())
            .into_found()
            .unwrap();
        assert_eq!(trend.trend, Trend::Stable);
        assert_eq!(trend.observations, 3);

        let lime = analyze_price_trends(&ds, "lime", 30, today());
        assert_eq!(lime.into_found().unwrap().oldest_price, 0.3);

        let wine = analyze_price_trends(&ds, "house red", 30, today());
        assert!(!wine.is_found());
    }

    #[test]
    fn sales_sum_quantities_in_window() {
        let ds = dataset();
        let sales = product_sales(&ds, "lime", 30, today());
        assert_eq!(sales.total_quantity, 60.0);
        assert_eq!(sales.items, vec!["LIME 40CT"]);

        let recent = product_sales(&ds, "lime", 2, today());
        assert_eq!(recent.total_quantity, 50.0);

        assert_eq!(product_sales(&ds, "truffle", 30, today()).total_quantity, 0.0);
    }
}
