//! Paginated list resources and where their records live in a page.

use std::fmt;

/// A paginated list endpoint of the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    RestaurantUnits,
    Categories,
    Products,
    Vendors,
    Orders,
    PriceHistory,
}

impl Resource {
    /// Every resource that goes into a full snapshot, in snapshot order.
    pub const SNAPSHOT: [Resource; 5] = [
        Resource::RestaurantUnits,
        Resource::Categories,
        Resource::Products,
        Resource::Vendors,
        Resource::Orders,
    ];

    /// Name of the field that holds the page's records.
    pub fn list_field(self) -> &'static str {
        match self {
            Resource::RestaurantUnits => "restaurants",
            Resource::Categories => "categories",
            Resource::Products => "products",
            Resource::Vendors => "vendors",
            Resource::Orders => "orders",
            Resource::PriceHistory => "priceHistory",
        }
    }

    /// Request path for the collection endpoints. Price history is nested
    /// under a product and has no collection path of its own.
    pub fn path(self) -> &'static str {
        match self {
            Resource::RestaurantUnits => "restaurantUnits",
            Resource::Categories => "categories",
            Resource::Products => "products",
            Resource::Vendors => "vendors",
            Resource::Orders => "orders",
            Resource::PriceHistory => "priceHistory",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Path of a single order's detail.
pub fn order_detail_path(order_id: &str) -> String {
    format!("orders/{order_id}")
}

/// Path of a single product's detail.
pub fn product_detail_path(product_id: &str) -> String {
    format!("products/{product_id}")
}

/// Path of a product's price history.
pub fn price_history_path(product_id: &str) -> String {
    format!("products/{product_id}/priceHistory")
}
