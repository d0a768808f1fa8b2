// threadmint/src/models/query.rs

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::models::Product;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Filter and window for a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
  pub page: i64,
  pub limit: i64,
  pub search: Option<String>,
  pub category: Option<String>,
}

impl Default for ProductQuery {
  fn default() -> Self {
    Self {
      page: DEFAULT_PAGE,
      limit: DEFAULT_LIMIT,
      search: None,
      category: None,
    }
  }
}

impl ProductQuery {
  /// Validates the window and normalises the filters (trimmed, blank means absent).
  pub fn new(page: i64, limit: i64, search: Option<&str>, category: Option<&str>) -> SyncResult<Self> {
    if page < 1 {
      return Err(SyncError::InvalidInput(format!("page must be >= 1, got {}", page)));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
      return Err(SyncError::InvalidInput(format!(
        "limit must be between 1 and {}, got {}",
        MAX_LIMIT, limit
      )));
    }
    if (page - 1).checked_mul(limit).is_none() {
      return Err(SyncError::InvalidInput(format!(
        "page {} is out of range for limit {}",
        page, limit
      )));
    }
    Ok(Self {
      page,
      limit,
      search: normalise(search),
      category: normalise(category),
    })
  }

  /// Saturates for windows built without [`ProductQuery::new`].
  pub fn offset(&self) -> i64 {
    self.page.saturating_sub(1).saturating_mul(self.limit)
  }

  pub fn search_or_empty(&self) -> &str {
    self.search.as_deref().unwrap_or("")
  }

  pub fn category_or_empty(&self) -> &str {
    self.category.as_deref().unwrap_or("")
  }
}

fn normalise(value: Option<&str>) -> Option<String> {
  value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub current_page: i64,
  pub total_pages: i64,
  pub total_products: i64,
  pub limit: i64,
  pub has_next_page: bool,
  pub has_prev_page: bool,
  pub next_page: Option<i64>,
  pub prev_page: Option<i64>,
}

impl Pagination {
  pub fn new(page: i64, limit: i64, total: i64) -> Self {
    let limit = limit.max(1);
    let total = total.max(0);
    let total_pages = (total + limit - 1) / limit;
    let has_next_page = page < total_pages;
    let has_prev_page = page > 1;
    Self {
      current_page: page,
      total_pages,
      total_products: total,
      limit,
      has_next_page,
      has_prev_page,
      next_page: has_next_page.then_some(page + 1),
      prev_page: has_prev_page.then_some(page - 1),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
  pub products: Vec<Product>,
  pub pagination: Pagination,
}

impl ProductPage {
  /// Rebuilds a page from a hot-cache entry. Hot entries only hold the row list,
  /// so the totals describe that list rather than the whole table.
  pub fn from_cached_rows(query: &ProductQuery, products: Vec<Product>) -> Self {
    let pagination = Pagination::new(query.page, query.limit, products.len() as i64);
    Self { products, pagination }
  }
}
