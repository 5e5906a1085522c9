//! Typed, read-only views of MarginEdge records.
//!
//! The API is loose about types: ids arrive as numbers or strings, amounts
//! as numbers, numeric strings, or `null`. The deserializers here accept all
//! of those. Amounts are not validated: negative values pass through as-is.

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Lenient field deserializers ────────────────────────────────────

/// String or number → `String`; `null` → empty.
fn de_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => return Err(de::Error::custom(format!("expected text, got {other}"))),
    })
}

fn de_opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let s = de_text(d)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

/// Number or numeric string → `f64`; `null` → 0.
fn de_amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(de_opt_amount(d)?.unwrap_or(0.0))
}

fn de_opt_amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected amount, got '{s}'"))),
        other => Err(de::Error::custom(format!("expected amount, got {other}"))),
    }
}

/// `null` → `T::default()`.
fn de_null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Parse an ISO-8601 date, ignoring any time suffix
/// (`2024-05-01`, `2024-05-01T13:00:00`, `2024-05-01 13:00`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let day = s.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

// ── Records ────────────────────────────────────────────────────────

/// Category reference embedded in a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    #[serde(default, deserialize_with = "de_text")]
    pub category_id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub category_name: String,
}

/// A purchasable product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, deserialize_with = "de_text")]
    pub company_concept_product_id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub product_name: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub categories: Vec<CategoryRef>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub latest_price: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub report_by_unit: Option<String>,
    #[serde(default)]
    pub tax_exempt: Option<bool>,
    #[serde(default)]
    pub on_inventory: Option<bool>,
}

impl Product {
    pub fn id(&self) -> &str {
        &self.company_concept_product_id
    }

    pub fn name(&self) -> &str {
        &self.product_name
    }

    /// Name of the product's first category, or `""`.
    pub fn category_name(&self) -> &str {
        self.categories
            .first()
            .map_or("", |c| c.category_name.as_str())
    }
}

/// A supplier. Vendors are identified by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    #[serde(default, alias = "name", deserialize_with = "de_text")]
    pub vendor_name: String,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub vendor_id: Option<String>,
}

/// One product entry within an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, deserialize_with = "de_text")]
    pub company_concept_product_id: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "de_text")]
    pub vendor_item_name: String,
}

impl LineItem {
    pub fn product_id(&self) -> &str {
        &self.company_concept_product_id
    }

    /// Quantity × unit price.
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Status value of a closed order.
pub const CLOSED_STATUS: &str = "CLOSED";

/// A purchase order / invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, deserialize_with = "de_text")]
    pub order_id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub vendor_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub invoice_date: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub order_total: f64,
    #[serde(default, deserialize_with = "de_text")]
    pub status: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// Parsed invoice date, if the field holds a valid ISO date.
    pub fn invoice_day(&self) -> Option<NaiveDate> {
        parse_date(&self.invoice_date)
    }

    pub fn is_closed(&self) -> bool {
        self.status.eq_ignore_ascii_case(CLOSED_STATUS)
    }
}

/// One dated price point from the price-history endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    #[serde(default, deserialize_with = "de_text")]
    pub date: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub price: f64,
}

impl PriceHistoryEntry {
    pub fn day(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Deserialize every record that fits `T`, skipping (and logging) the rest.
pub fn parse_records<T: serde::de::DeserializeOwned>(kind: &str, records: &[Value]) -> Vec<T> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| match T::deserialize(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Skipping malformed {kind} record #{i}: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_from_api_shape() {
        let p: Product = serde_json::from_value(json!({
            "companyConceptProductId": 1234,
            "productName": "Chicken Breast",
            "categories": [{"categoryId": "c1", "categoryName": "Poultry"}],
            "latestPrice": "3.25",
            "reportByUnit": "lb",
            "taxExempt": false,
            "onInventory": true
        }))
        .unwrap();

        assert_eq!(p.id(), "1234");
        assert_eq!(p.category_name(), "Poultry");
        assert_eq!(p.latest_price, Some(3.25));
        assert_eq!(p.report_by_unit.as_deref(), Some("lb"));
        assert_eq!(p.on_inventory, Some(true));
    }

    #[test]
    fn product_tolerates_nulls() {
        let p: Product = serde_json::from_value(json!({
            "productName": "Lime",
            "categories": null,
            "latestPrice": null
        }))
        .unwrap();
        assert_eq!(p.category_name(), "");
        assert_eq!(p.latest_price, None);
    }

    #[test]
    fn order_with_line_items() {
        let o: Order = serde_json::from_value(json!({
            "orderId": "o-1",
            "vendorName": "Inland Foods",
            "invoiceDate": "2024-05-02T00:00:00",
            "orderTotal": "120.50",
            "status": "closed",
            "lineItems": [
                {"companyConceptProductId": "p1", "quantity": 4, "unitPrice": 2.5, "vendorItemName": "LIME 40CT"}
            ]
        }))
        .unwrap();

        assert_eq!(o.invoice_day(), NaiveDate::from_ymd_opt(2024, 5, 2));
        assert!((o.order_total - 120.5).abs() < f64::EPSILON);
        assert!(o.is_closed());
        assert!((o.line_items[0].total() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_amounts_pass_through() {
        let item: LineItem =
            serde_json::from_value(json!({"quantity": -2, "unitPrice": 3})).unwrap();
        assert!((item.total() + 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn garbage_amount_rejects_record() {
        let records = vec![
            json!({"orderId": "ok", "orderTotal": 1}),
            json!({"orderId": "bad", "orderTotal": "n/a"}),
        ];
        let orders: Vec<Order> = parse_records("order", &records);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_id, "ok");
    }

    #[test]
    fn parse_date_variants() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 9);
        assert_eq!(parse_date("2024-01-09"), d);
        assert_eq!(parse_date("2024-01-09T10:11:12Z"), d);
        assert_eq!(parse_date("09/01/2024"), None);
        assert_eq!(parse_date(""), None);
    }
}
