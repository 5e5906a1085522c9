//! The analytics questions as function-calling tools.
//!
//! Each supported call is a variant of [`AnalyticsCall`] carrying a typed
//! argument struct. The structs derive `JsonSchema`, so the parameter schema
//! sent to the model and the deserialization of its arguments come from the
//! same type. Optional parameters get their defaults here.

use super::core::{Tool, ToolFuture, ToolSet, parse_tool_args};
use super::names;
use super::spec::ToolSpec;
use crate::ToolDef;
use crate::analytics::{self, Dataset};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

// ── Arguments ──────────────────────────────────────────────────────

/// No parameters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct NoArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct ProductArgs {
    /// Name or category of the product, e.g. "chicken" or "all wines".
    pub product_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct ProductOrIdArgs {
    /// Name, category, or ID of the product. For vendor purchases this may
    /// also be a vendor name.
    pub product_name_or_id: String,
}

fn default_limit() -> usize {
    5
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct LimitArgs {
    /// Number of top vendors to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_change_days() -> i64 {
    5
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct PriceChangeArgs {
    /// Number of days to look back.
    #[serde(default = "default_change_days")]
    #[schemars(range(min = 0))]
    pub days: i64,
}

fn default_sales_days() -> i64 {
    7
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct ProductSalesArgs {
    /// Name or category of the product.
    pub product_name: String,
    /// Number of days to look back.
    #[serde(default = "default_sales_days")]
    #[schemars(range(min = 0))]
    pub days: i64,
}

fn default_trend_days() -> i64 {
    30
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct PriceTrendArgs {
    /// Name, category, or ID of the product.
    pub product_name: String,
    /// Number of days to look back.
    #[serde(default = "default_trend_days")]
    #[schemars(range(min = 0))]
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct VendorArgs {
    /// Vendor name (case-insensitive).
    pub vendor_name: String,
}

// ── Calls ──────────────────────────────────────────────────────────

/// One analytics question with its arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum AnalyticsCall {
    GetDataSummary(NoArgs),
    SearchProducts(ProductArgs),
    GetProductDetails(ProductArgs),
    GetProductPrice(ProductArgs),
    GetProductPriceHistory(ProductOrIdArgs),
    GetVendorPurchases(ProductOrIdArgs),
    GetTopVendorsBySpend(LimitArgs),
    GetProductPriceChanges(PriceChangeArgs),
    GetProductSales(ProductSalesArgs),
    ListAllVendors(NoArgs),
    AnalyzePriceTrends(PriceTrendArgs),
    EvaluateVendorPerformance(VendorArgs),
}

impl AnalyticsCall {
    /// Build a call from a function name and the model's raw JSON arguments.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, String> {
        if !names::ALL.contains(&name) {
            return Err(format!("Error: unknown function '{name}'"));
        }
        let args: Value = parse_tool_args(arguments)?;
        serde_json::from_value(json!({ "name": name, "arguments": args }))
            .map_err(|e| format!("Error: invalid arguments for function '{name}': {e}"))
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsCall::GetDataSummary(_) => names::GET_DATA_SUMMARY,
            AnalyticsCall::SearchProducts(_) => names::SEARCH_PRODUCTS,
            AnalyticsCall::GetProductDetails(_) => names::GET_PRODUCT_DETAILS,
            AnalyticsCall::GetProductPrice(_) => names::GET_PRODUCT_PRICE,
            AnalyticsCall::GetProductPriceHistory(_) => names::GET_PRODUCT_PRICE_HISTORY,
            AnalyticsCall::GetVendorPurchases(_) => names::GET_VENDOR_PURCHASES,
            AnalyticsCall::GetTopVendorsBySpend(_) => names::GET_TOP_VENDORS_BY_SPEND,
            AnalyticsCall::GetProductPriceChanges(_) => names::GET_PRODUCT_PRICE_CHANGES,
            AnalyticsCall::GetProductSales(_) => names::GET_PRODUCT_SALES,
            AnalyticsCall::ListAllVendors(_) => names::LIST_ALL_VENDORS,
            AnalyticsCall::AnalyzePriceTrends(_) => names::ANALYZE_PRICE_TRENDS,
            AnalyticsCall::EvaluateVendorPerformance(_) => names::EVALUATE_VENDOR_PERFORMANCE,
        }
    }

    /// Answer the question against `ds`, as JSON.
    pub fn run(&self, ds: &Dataset, today: NaiveDate) -> Value {
        match self {
            AnalyticsCall::GetDataSummary(_) => to_json(analytics::data_summary(ds)),
            AnalyticsCall::SearchProducts(a) => {
                to_json(analytics::search_products(ds, &a.product_name))
            }
            AnalyticsCall::GetProductDetails(a) => {
                to_json(analytics::product_details(ds, &a.product_name))
            }
            AnalyticsCall::GetProductPrice(a) => {
                to_json(analytics::product_price(ds, &a.product_name))
            }
            AnalyticsCall::GetProductPriceHistory(a) => {
                to_json(analytics::price_history(ds, &a.product_name_or_id))
            }
            AnalyticsCall::GetVendorPurchases(a) => {
                to_json(analytics::vendor_purchases(ds, &a.product_name_or_id))
            }
            AnalyticsCall::GetTopVendorsBySpend(a) => {
                to_json(analytics::top_vendors_by_spend(ds, a.limit))
            }
            AnalyticsCall::GetProductPriceChanges(a) => {
                to_json(analytics::price_changes(ds, a.days, today))
            }
            AnalyticsCall::GetProductSales(a) => {
                to_json(analytics::product_sales(ds, &a.product_name, a.days, today))
            }
            AnalyticsCall::ListAllVendors(_) => to_json(analytics::list_all_vendors(ds)),
            AnalyticsCall::AnalyzePriceTrends(a) => to_json(analytics::analyze_price_trends(
                ds,
                &a.product_name,
                a.days,
                today,
            )),
            AnalyticsCall::EvaluateVendorPerformance(a) => {
                to_json(analytics::evaluate_vendor_performance(ds, &a.vendor_name))
            }
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| json!({ "error": e.to_string() }))
}

// ── Definitions ────────────────────────────────────────────────────

/// Specs for every analytics tool, in a stable order.
pub fn analytics_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::builder(names::GET_DATA_SUMMARY, "Get a summary of the available data")
            .when_to_use("The user asks what data exists, how many orders or products there are, or what period it covers")
            .build(),
        ToolSpec::builder(names::SEARCH_PRODUCTS, "Search for products by name or category")
            .when_to_use("The user mentions a product or category and you need to know what matches")
            .when_not_to_use("The user wants a price; use get_product_price")
            .parameters_for::<ProductArgs>()
            .example("What chicken do we buy?", r#"{"product_name": "chicken"}"#)
            .build(),
        ToolSpec::builder(names::GET_PRODUCT_DETAILS, "Get detailed information about a specific product")
            .parameters_for::<ProductArgs>()
            .build(),
        ToolSpec::builder(names::GET_PRODUCT_PRICE, "Get the current price of a product")
            .when_not_to_use("The user asks how a price changed over time; use analyze_price_trends")
            .parameters_for::<ProductArgs>()
            .example("How much are limes?", r#"{"product_name": "lime"}"#)
            .build(),
        ToolSpec::builder(names::GET_PRODUCT_PRICE_HISTORY, "Get the purchase price history of a product")
            .parameters_for::<ProductOrIdArgs>()
            .output_format("JSON with the product and its dated prices, oldest first")
            .build(),
        ToolSpec::builder(
            names::GET_VENDOR_PURCHASES,
            "Get purchases for a product (by vendor) or everything bought from a vendor",
        )
        .parameters_for::<ProductOrIdArgs>()
        .example("What do we buy from Sysco?", r#"{"product_name_or_id": "Sysco"}"#)
        .build(),
        ToolSpec::builder(names::GET_TOP_VENDORS_BY_SPEND, "Get the vendors with the highest total spend")
            .parameters_for::<LimitArgs>()
            .output_format("JSON array of [vendor, total spend] pairs, highest first")
            .build(),
        ToolSpec::builder(
            names::GET_PRODUCT_PRICE_CHANGES,
            "List products bought at more than one price recently",
        )
        .parameters_for::<PriceChangeArgs>()
        .build(),
        ToolSpec::builder(names::GET_PRODUCT_SALES, "Get the total quantity purchased of a product over recent days")
            .parameters_for::<ProductSalesArgs>()
            .build(),
        ToolSpec::builder(names::LIST_ALL_VENDORS, "List all vendors").build(),
        ToolSpec::builder(
            names::ANALYZE_PRICE_TRENDS,
            "Analyze whether a product's price is increasing, decreasing, or stable",
        )
        .when_to_use("The user asks whether something is getting more expensive")
        .parameters_for::<PriceTrendArgs>()
        .build(),
        ToolSpec::builder(
            names::EVALUATE_VENDOR_PERFORMANCE,
            "Evaluate a vendor: order count, spend, average order value, closed-order rate",
        )
        .parameters_for::<VendorArgs>()
        .build(),
    ]
}

// ── Tool ───────────────────────────────────────────────────────────

/// One analytics question bound to a shared dataset.
pub struct AnalyticsTool {
    def: ToolDef,
    dataset: Arc<Dataset>,
    today: NaiveDate,
}

impl AnalyticsTool {
    pub fn new(spec: &ToolSpec, dataset: Arc<Dataset>, today: NaiveDate) -> Self {
        Self {
            def: spec.to_tool_def(),
            dataset,
            today,
        }
    }
}

impl Tool for AnalyticsTool {
    fn definition(&self) -> ToolDef {
        self.def.clone()
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let call = AnalyticsCall::parse(&self.def.function.name, arguments);
        Box::pin(async move {
            match call {
                Ok(call) => call.run(&self.dataset, self.today).to_string(),
                Err(e) => e,
            }
        })
    }
}

impl ToolSet {
    /// Register every analytics tool over `dataset`, with windows ending at
    /// `today`.
    pub fn with_analytics_tools(mut self, dataset: Arc<Dataset>, today: NaiveDate) -> Self {
        for spec in analytics_specs() {
            self.register(AnalyticsTool::new(&spec, dataset.clone(), today));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{dataset, today};

    fn tools() -> ToolSet {
        ToolSet::new()
            .with_arg_validation(true)
            .with_analytics_tools(Arc::new(dataset()), today())
    }

    #[test]
    fn every_name_has_a_spec_and_parses() {
        let specs = analytics_specs();
        assert_eq!(specs.len(), names::ALL.len());
        for name in names::ALL {
            assert!(specs.iter().any(|s| s.name == name), "missing spec for {name}");
        }

        let call = AnalyticsCall::parse(names::LIST_ALL_VENDORS, "").unwrap();
        assert_eq!(call.name(), names::LIST_ALL_VENDORS);
    }

    #[test]
    fn optional_parameters_get_defaults() {
        let call = AnalyticsCall::parse(names::GET_TOP_VENDORS_BY_SPEND, "{}").unwrap();
        assert_eq!(call, AnalyticsCall::GetTopVendorsBySpend(LimitArgs { limit: 5 }));

        let call = AnalyticsCall::parse(names::GET_PRODUCT_PRICE_CHANGES, "{}").unwrap();
        assert_eq!(call, AnalyticsCall::GetProductPriceChanges(PriceChangeArgs { days: 5 }));

        let call =
            AnalyticsCall::parse(names::GET_PRODUCT_SALES, r#"{"product_name":"lime"}"#).unwrap();
        assert_eq!(
            call,
            AnalyticsCall::GetProductSales(ProductSalesArgs {
                product_name: "lime".into(),
                days: 7
            })
        );

        let call =
            AnalyticsCall::parse(names::ANALYZE_PRICE_TRENDS, r#"{"product_name":"lime"}"#).unwrap();
        assert_eq!(call.name(), names::ANALYZE_PRICE_TRENDS);
    }

    #[test]
    fn unknown_function_is_rejected() {
        let err = AnalyticsCall::parse("order_pizza", "{}").unwrap_err();
        assert_eq!(err, "Error: unknown function 'order_pizza'");
    }

    #[test]
    fn missing_argument_is_rejected() {
        let err = AnalyticsCall::parse(names::SEARCH_PRODUCTS, "{}").unwrap_err();
        assert!(err.starts_with("Error: invalid arguments for function 'search_products'"));
    }

    #[test]
    fn schema_marks_required_and_optional_fields() {
        let schema = crate::json_schema_for::<ProductSalesArgs>();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&"product_name".into()));
        assert!(!required.contains(&"days".into()));
        assert_eq!(schema["properties"]["days"]["minimum"], 0.0);
    }

    #[tokio::test]
    async fn dispatch_returns_json_results() {
        let tools = tools();
        assert_eq!(tools.len(), names::ALL.len());

        let out = tools
            .execute(names::GET_TOP_VENDORS_BY_SPEND, r#"{"limit": 1}"#)
            .await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!([["Vino Co", 90.0]]));

        let out = tools
            .execute(names::SEARCH_PRODUCTS, r#"{"product_name":"CHICKEN"}"#)
            .await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn not_found_lookups_are_results_not_errors() {
        let out = tools()
            .execute(names::GET_PRODUCT_DETAILS, r#"{"product_name":"truffle"}"#)
            .await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "not_found");
    }

    #[tokio::test]
    async fn invalid_arguments_come_back_as_error_strings() {
        let out = tools()
            .execute(names::GET_TOP_VENDORS_BY_SPEND, r#"{"limit": "many"}"#)
            .await;
        assert!(out.starts_with("Error: argument validation failed"));

        let out = tools().execute("get_weather", "{}").await;
        assert_eq!(out, "Error: unknown function 'get_weather'");
    }

    #[tokio::test]
    async fn huge_day_counts_cover_everything_dated() {
        let out = tools()
            .execute(names::GET_PRODUCT_PRICE_CHANGES, r#"{"days": 1000000000}"#)
            .await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["product"], "Chicken Breast");

        let out = tools()
            .execute(
                names::GET_PRODUCT_SALES,
                r#"{"product_name": "lime", "days": 9223372036854775807}"#,
            )
            .await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["total_quantity"], 60.0);
    }

    #[tokio::test]
    async fn negative_day_counts_are_rejected() {
        for (name, args) in [
            (names::GET_PRODUCT_PRICE_CHANGES, r#"{"days": -3}"#),
            (names::GET_PRODUCT_SALES, r#"{"product_name": "lime", "days": -1}"#),
            (names::ANALYZE_PRICE_TRENDS, r#"{"product_name": "lime", "days": -30}"#),
        ] {
            let out = tools().execute(name, args).await;
            assert!(out.starts_with("Error: argument validation failed"), "{name}: {out}");
        }
    }
}
