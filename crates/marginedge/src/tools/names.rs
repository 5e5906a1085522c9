//! Canonical tool name constants.
//!
//! All tool-name string literals should reference these constants. When a
//! tool is renamed, only this file needs to change.

pub const GET_DATA_SUMMARY: &str = "get_data_summary";
pub const SEARCH_PRODUCTS: &str = "search_products";
pub const GET_PRODUCT_DETAILS: &str = "get_product_details";
pub const GET_PRODUCT_PRICE: &str = "get_product_price";
pub const GET_PRODUCT_PRICE_HISTORY: &str = "get_product_price_history";
pub const GET_VENDOR_PURCHASES: &str = "get_vendor_purchases";
pub const GET_TOP_VENDORS_BY_SPEND: &str = "get_top_vendors_by_spend";
pub const GET_PRODUCT_PRICE_CHANGES: &str = "get_product_price_changes";
pub const GET_PRODUCT_SALES: &str = "get_product_sales";
pub const LIST_ALL_VENDORS: &str = "list_all_vendors";
pub const ANALYZE_PRICE_TRENDS: &str = "analyze_price_trends";
pub const EVALUATE_VENDOR_PERFORMANCE: &str = "evaluate_vendor_performance";

/// Every analytics tool name.
pub const ALL: [&str; 12] = [
    GET_DATA_SUMMARY,
    SEARCH_PRODUCTS,
    GET_PRODUCT_DETAILS,
    GET_PRODUCT_PRICE,
    GET_PRODUCT_PRICE_HISTORY,
    GET_VENDOR_PURCHASES,
    GET_TOP_VENDORS_BY_SPEND,
    GET_PRODUCT_PRICE_CHANGES,
    GET_PRODUCT_SALES,
    LIST_ALL_VENDORS,
    ANALYZE_PRICE_TRENDS,
    EVALUATE_VENDOR_PERFORMANCE,
];
