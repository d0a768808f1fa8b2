//! Key layout shared by every writer and reader of the hot cache.

use crate::models::ProductQuery;

/// Matches every cached listing, whatever its filters.
pub const LIST_PATTERN: &str = "products:page:*";

pub const ITEM_PREFIX: &str = "product:";

/// Blank filters are encoded as empty segments so that `search=None` and
/// `search=""` share an entry.
pub fn list_key(query: &ProductQuery) -> String {
  format!(
    "products:page:{}:limit:{}:search:{}:category:{}",
    query.page,
    query.limit,
    query.search_or_empty(),
    query.category_or_empty()
  )
}

pub fn item_key(product_id: &str) -> String {
  format!("{}{}", ITEM_PREFIX, product_id)
}
