//! Exhaustive pagination over `nextPage` continuation tokens.
//!
//! Each page carries its records under a resource-specific list field (for
//! example `products` or `orders`) and, when more pages remain, an opaque
//! `nextPage` token. The aggregator re-issues the request with
//! `nextPage=<token>` until a page arrives without one.

use super::retry::RateLimitRetry;
use super::transport::{Params, Transport};
use super::ApiError;
use serde_json::Value;
use tracing::debug;

/// Response field holding the continuation token.
pub const NEXT_PAGE_FIELD: &str = "nextPage";

/// Extract the continuation token from a page. Only non-empty strings and
/// numbers are tokens; absent, `null`, boolean, and empty-string values all
/// mean "last page".
pub fn next_page_token(page: &Value) -> Option<String> {
    match page.get(NEXT_PAGE_FIELD)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pull the records out of `page[list_field]`.
fn take_records(page: &mut Value, path: &str, list_field: &str) -> Result<Vec<Value>, ApiError> {
    match page.get_mut(list_field).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(ApiError::MissingListField {
            path: path.to_string(),
            field: list_field.to_string(),
        }),
    }
}

/// Follow continuation tokens until exhausted, concatenating every page's
/// `list_field` array in arrival order.
pub async fn fetch_all(
    retry: &RateLimitRetry,
    transport: &dyn Transport,
    path: &str,
    params: &Params,
    list_field: &str,
) -> Result<Vec<Value>, ApiError> {
    let mut params = params.clone();
    let mut records = Vec::new();
    let mut pages = 0u32;

    loop {
        let mut page = retry.request(transport, path, &params).await?;
        pages += 1;

        let items = take_records(&mut page, path, list_field)?;
        debug!("{path}: page {pages} returned {} {list_field}", items.len());
        records.extend(items);

        match next_page_token(&page) {
            Some(token) => {
                params.insert(NEXT_PAGE_FIELD.to_string(), token);
            }
            None => break,
        }
    }

    debug!("{path}: {} records over {pages} page(s)", records.len());
    Ok(records)
}
