// threadmint/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the relational read cache. Every field except the timestamps can be
/// rebuilt by re-reading the chain (see [`ProductRecord::from_chain`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub product_id: String,
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub image_url: String,
  pub category: String,
  pub is_available: bool,
  pub stock: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  /// The mutable field set of this row, e.g. to re-upsert it with one field changed.
  pub fn to_record(&self) -> ProductRecord {
    ProductRecord {
      product_id: self.product_id.clone(),
      name: self.name.clone(),
      description: self.description.clone(),
      price: self.price,
      image_url: self.image_url.clone(),
      category: self.category.clone(),
      is_available: self.is_available,
      stock: self.stock,
    }
  }
}

/// Fields overwritten by an upsert keyed on `product_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
  pub product_id: String,
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub image_url: String,
  pub category: String,
  pub is_available: bool,
  pub stock: i32,
}

impl ProductRecord {
  pub fn from_chain(product_id: impl Into<String>, chain: &ChainProduct, category_name: impl Into<String>) -> Self {
    Self {
      product_id: product_id.into(),
      name: chain.name.clone(),
      description: chain.description.clone(),
      price: chain.price,
      image_url: chain.image_url.clone(),
      category: category_name.into(),
      is_available: chain.is_available,
      stock: i32::try_from(chain.stock).unwrap_or(i32::MAX),
    }
  }
}

/// A product as the shop contract reports it, prices already in the display unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainProduct {
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub image_url: String,
  pub category_code: u64,
  pub is_available: bool,
  pub stock: u64,
}

/// Payload for listing a new product on chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub image_url: String,
  pub category: u64,
  pub stock: u64,
}
