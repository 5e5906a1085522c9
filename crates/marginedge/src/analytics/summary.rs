use super::Dataset;
use serde::Serialize;

/// Overview of what a dataset holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub restaurant_units: usize,
    pub categories: usize,
    pub products: usize,
    pub vendors: usize,
    pub orders: usize,
    pub line_items: usize,
    /// Earliest invoice date (ISO), if any order is dated.
    pub first_invoice: Option<String>,
    pub last_invoice: Option<String>,
    pub total_order_spend: f64,
}

pub fn data_summary(ds: &Dataset) -> DataSummary {
    let days: Vec<_> = ds.orders.iter().filter_map(|o| o.invoice_day()).collect();
    DataSummary {
        restaurant_units: ds.restaurant_unit_count,
        categories: ds.category_count,
        products: ds.products.len(),
        vendors: ds.vendors.len(),
        orders: ds.orders.len(),
        line_items: ds.orders.iter().map(|o| o.line_items.len()).sum(),
        first_invoice: days.iter().min().map(|d| d.to_string()),
        last_invoice: days.iter().max().map(|d| d.to_string()),
        total_order_spend: ds.orders.iter().map(|o| o.order_total).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::dataset;
    use super::*;

    #[test]
    fn summary_counts_and_range() {
        let s = data_summary(&dataset());
        assert_eq!(s.products, 4);
        assert_eq!(s.vendors, 3);
        assert_eq!(s.orders, 4);
        assert_eq!(s.line_items, 6);
        assert_eq!(s.first_invoice.as_deref(), Some("2024-03-01"));
        assert_eq!(s.last_invoice.as_deref(), Some("2024-06-29"));
        assert_eq!(s.total_order_spend, 195.0);
    }

    #[test]
    fn empty_dataset_has_no_range() {
        let s = data_summary(&Dataset::default());
        assert_eq!(s.orders, 0);
        assert_eq!(s.first_invoice, None);
    }
}
