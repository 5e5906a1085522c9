//! Full-dataset JSON snapshot: fetch, save, load, and outline.
//!
//! A snapshot is a single JSON document with one top-level key per resource,
//! each holding that resource's full fetched array exactly as the API
//! returned it. Saving overwrites the file wholesale; there is no merging
//! and no versioning.

use crate::analytics::window_start;
use crate::api::{ApiError, MarginEdgeClient};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Default snapshot file name.
pub const DEFAULT_SNAPSHOT_FILE: &str = "restaurant_data.json";

/// Failures reading or writing a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// No file at the path; the caller may want to crawl first.
    #[error("snapshot file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to access snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid snapshot document.
    #[error("failed to parse snapshot {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Options for [`Snapshot::fetch`].
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Trailing window of orders to include, in days. Default: 30.
    pub order_window_days: i64,
    /// Crawl each order's detail to attach `lineItems`. Default: `false`.
    pub with_line_items: bool,
    /// Fixed pause between order-detail requests. Default: 1 s.
    pub detail_pause: Duration,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            order_window_days: 30,
            with_line_items: false,
            detail_pause: Duration::from_secs(1),
        }
    }
}

impl SnapshotOptions {
    pub fn with_order_window_days(mut self, days: i64) -> Self {
        self.order_window_days = days;
        self
    }

    pub fn with_line_items(mut self, enabled: bool) -> Self {
        self.with_line_items = enabled;
        self
    }

    pub fn with_detail_pause(mut self, pause: Duration) -> Self {
        self.detail_pause = pause;
        self
    }
}

/// Point-in-time copy of every resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub restaurant_units: Vec<Value>,
    #[serde(default)]
    pub categories: Vec<Value>,
    #[serde(default)]
    pub products: Vec<Value>,
    #[serde(default)]
    pub vendors: Vec<Value>,
    #[serde(default)]
    pub orders: Vec<Value>,
}

impl Snapshot {
    /// Crawl every resource for one restaurant unit.
    ///
    /// Orders cover `today - order_window_days ..= today`. With
    /// `with_line_items`, each order's detail is fetched in turn (pausing
    /// between requests) and its `lineItems` merged into the order record;
    /// an order whose detail fails is logged and left without line items.
    pub async fn fetch(
        client: &MarginEdgeClient,
        restaurant_unit_id: &str,
        options: &SnapshotOptions,
        today: NaiveDate,
    ) -> Result<Self, ApiError> {
        let start = window_start(today, options.order_window_days);

        let restaurant_units = client.restaurant_units().await?;
        let categories = client.categories(restaurant_unit_id).await?;
        let products = client.products(restaurant_unit_id).await?;
        let vendors = client.vendors(restaurant_unit_id).await?;
        let mut orders = client.orders(restaurant_unit_id, start, today, None).await?;

        if options.with_line_items {
            attach_line_items(client, restaurant_unit_id, &mut orders, options.detail_pause).await;
        }

        info!(
            "Snapshot: {} units, {} categories, {} products, {} vendors, {} orders ({start} to {today})",
            restaurant_units.len(),
            categories.len(),
            products.len(),
            vendors.len(),
            orders.len(),
        );

        Ok(Self {
            restaurant_units,
            categories,
            products,
            vendors,
            orders,
        })
    }

    /// Read a snapshot file, distinguishing "missing" from "corrupt".
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the snapshot as an untyped JSON document (for browsing).
    pub fn load_value(path: impl AsRef<Path>) -> Result<Value, SnapshotError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overwrite `path` with this snapshot, pretty-printed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| io_error(path, e))?;
        info!("Snapshot written to {}", path.display());
        Ok(())
    }

    /// Untyped view with the same top-level keys as the file.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> SnapshotError {
    if e.kind() == std::io::ErrorKind::NotFound {
        SnapshotError::NotFound(path.to_path_buf())
    } else {
        SnapshotError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

async fn attach_line_items(
    client: &MarginEdgeClient,
    restaurant_unit_id: &str,
    orders: &mut [Value],
    pause: Duration,
) {
    let total = orders.len();
    for (i, order) in orders.iter_mut().enumerate() {
        let Some(order_id) = order.get("orderId").map(id_string) else {
            warn!("Order #{i} has no orderId; skipping detail fetch");
            continue;
        };

        info!("Fetching detail for order {order_id} ({}/{total})", i + 1);
        match client.order_detail(restaurant_unit_id, &order_id).await {
            Ok(detail) => {
                let items = detail
                    .get("lineItems")
                    .cloned()
                    .unwrap_or(Value::Array(Vec::new()));
                if let Some(obj) = order.as_object_mut() {
                    obj.insert("lineItems".into(), items);
                }
            }
            Err(e) => warn!("Error fetching details for order {order_id}: {e}"),
        }

        if i + 1 < total && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}

/// Render a JSON id (string or number) as a string.
pub(crate) fn id_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Recursive type outline of a JSON document: objects map keys to outlines,
/// arrays show the outline of their first element (or `[]`), scalars become
/// their type name.
pub fn structure_outline(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), structure_outline(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.first().map(structure_outline).into_iter().collect()),
        Value::String(_) => Value::from("str"),
        Value::Number(n) if n.is_f64() => Value::from("float"),
        Value::Number(_) => Value::from("int"),
        Value::Bool(_) => Value::from("bool"),
        Value::Null => Value::from("null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::retry::tests::{RecordingSleeper, ScriptedTransport};
    use crate::api::{RawResponse, RetryPolicy};
    use serde_json::json;

    fn sample() -> Snapshot {
        Snapshot {
            restaurant_units: vec![json!({"id": 1, "name": "Main St"})],
            categories: vec![json!({"categoryId": "c1", "categoryName": "Poultry"})],
            products: vec![
                json!({"companyConceptProductId": "p1", "productName": "Chicken Thigh"}),
                json!({"companyConceptProductId": "p2", "productName": "Lime"}),
            ],
            vendors: vec![json!({"vendorName": "Inland Foods"})],
            orders: vec![json!({"orderId": "o1", "vendorName": "Inland Foods", "orderTotal": 10})],
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let snap = sample();

        snap.save(&path).unwrap();
        let loaded = Snapshot::load(&path).unwrap();

        assert_eq!(loaded, snap);
        assert_eq!(loaded.products[1]["productName"], "Lime");
    }

    #[test]
    fn save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        sample().save(&path).unwrap();

        let smaller = Snapshot {
            vendors: vec![json!({"vendorName": "Other"})],
            ..Default::default()
        };
        smaller.save(&path).unwrap();

        let loaded = Snapshot::load(&path).unwrap();
        assert!(loaded.products.is_empty());
        assert_eq!(loaded.vendors.len(), 1);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Snapshot::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::NotFound(_)));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Snapshot::load(&path).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }));
    }

    #[test]
    fn outline_describes_shape() {
        let outline = structure_outline(&json!({
            "orders": [{"orderId": "o1", "orderTotal": 1.5, "lineItems": []}],
            "vendors": [],
            "count": 3,
            "ok": true
        }));
        assert_eq!(
            outline,
            json!({
                "orders": [{"orderId": "str", "orderTotal": "float", "lineItems": []}],
                "vendors": [],
                "count": "int",
                "ok": "bool"
            })
        );
    }

    fn page(field: &str, items: Value) -> RawResponse {
        RawResponse::new(200, json!({ field: items }).to_string())
    }

    #[tokio::test]
    async fn fetch_crawls_every_resource_and_attaches_line_items() {
        let transport = ScriptedTransport::new(vec![
            page("restaurants", json!([{"id": 7}])),
            page("categories", json!([])),
            page("products", json!([{"companyConceptProductId": "p1"}])),
            page("vendors", json!([{"vendorName": "V"}])),
            page("orders", json!([{"orderId": "o1"}, {"orderId": "o2"}])),
            RawResponse::new(200, json!({"lineItems": [{"companyConceptProductId": "p1"}]}).to_string()),
            RawResponse::new(500, "detail failed"),
        ]);
        let client = MarginEdgeClient::with_sleeper(
            transport,
            RetryPolicy::default(),
            RecordingSleeper::default(),
        );
        let options = SnapshotOptions::default()
            .with_line_items(true)
            .with_detail_pause(Duration::ZERO);
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        let snap = Snapshot::fetch(&client, "7", &options, today).await.unwrap();

        assert_eq!(snap.restaurant_units.len(), 1);
        assert_eq!(snap.orders.len(), 2);
        assert_eq!(snap.orders[0]["lineItems"][0]["companyConceptProductId"], "p1");
        assert!(snap.orders[1].get("lineItems").is_none());
    }
}
