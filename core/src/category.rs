// threadmint/src/category.rs

//! Category type code -> display name lookup. On-chain products only carry the
//! numeric code; names are resolved while building cache rows.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// Codes and names seeded into a fresh shop.
pub const DEFAULT_CATEGORIES: &[(u64, &str)] = &[
  (1, "T-Shirts"),
  (2, "Tops"),
  (3, "Bottoms"),
  (4, "Dresses"),
  (5, "Outerwear"),
  (6, "Activewear"),
  (7, "Accessories"),
  (8, "Footwear"),
  (9, "Underwear"),
  (10, "Swimwear"),
  (11, "Formal Wear"),
  (12, "Casual Wear"),
  (13, "Vintage"),
  (14, "Streetwear"),
  (15, "Luxury"),
];

/// Resolves a type code to its name. Never fails: an unmapped code, or a lookup
/// that errors, yields [`UNKNOWN_CATEGORY`] so listings survive partial metadata loss.
#[async_trait]
pub trait CategoryResolver: Send + Sync {
  async fn category_name(&self, type_code: u64) -> String;
}

#[derive(Debug, Clone)]
pub struct StaticCategories {
  names: HashMap<u64, String>,
}

impl StaticCategories {
  pub fn new<I, S>(entries: I) -> Self
  where
    I: IntoIterator<Item = (u64, S)>,
    S: Into<String>,
  {
    Self {
      names: entries.into_iter().map(|(code, name)| (code, name.into())).collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

impl Default for StaticCategories {
  fn default() -> Self {
    Self::new(DEFAULT_CATEGORIES.iter().copied())
  }
}

#[async_trait]
impl CategoryResolver for StaticCategories {
  async fn category_name(&self, type_code: u64) -> String {
    match self.names.get(&type_code) {
      Some(name) => name.clone(),
      None => {
        debug!(type_code, "No static category for type code.");
        UNKNOWN_CATEGORY.to_string()
      }
    }
  }
}

/// Looks codes up in the `categories` table.
#[derive(Debug, Clone)]
pub struct PgCategories {
  pool: PgPool,
}

impl PgCategories {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CategoryResolver for PgCategories {
  async fn category_name(&self, type_code: u64) -> String {
    let Ok(code) = i64::try_from(type_code) else {
      warn!(type_code, "Category type code out of range for lookup.");
      return UNKNOWN_CATEGORY.to_string();
    };

    let row: Result<Option<(String,)>, sqlx::Error> = sqlx::query_as("SELECT name FROM categories WHERE type_code = $1")
      .bind(code)
      .fetch_optional(&self.pool)
      .await;

    match row {
      Ok(Some((name,))) => name,
      Ok(None) => UNKNOWN_CATEGORY.to_string(),
      Err(e) => {
        warn!(type_code, error = %e, "Category lookup failed, using sentinel.");
        UNKNOWN_CATEGORY.to_string()
      }
    }
  }
}
