//! Exposes the chain through the [`ProductStore`] read contract.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use tracing::warn;

use crate::chain::ChainGateway;
use crate::error::SyncResult;
use crate::models::{Product, ProductRecord};
use crate::store::ProductStore;

#[derive(Clone)]
pub struct ChainCatalog {
  chain: Arc<dyn ChainGateway>,
}

impl ChainCatalog {
  pub fn new(chain: Arc<dyn ChainGateway>) -> Self {
    Self { chain }
  }

  /// Reads one product and resolves its category: the full field set of a cache row.
  pub async fn fetch_record(&self, product_id: &str) -> SyncResult<Option<ProductRecord>> {
    let Some(chain_product) = self.chain.get_product(product_id).await? else {
      return Ok(None);
    };
    let category = self.chain.category_name(chain_product.category_code).await;
    Ok(Some(ProductRecord::from_chain(product_id, &chain_product, category)))
  }

  /// One page of the contract's own listing, read live. Products that fail to load
  /// are logged and left out; only a failure to list ids is an error.
  pub async fn list_page(&self, offset: u64, limit: u64) -> SyncResult<Vec<Product>> {
    let ids = self.chain.get_product_ids_by_page(offset, limit).await?;
    let mut products = Vec::with_capacity(ids.len());
    for id in &ids {
      match self.fetch_product(id).await {
        Ok(Some(product)) => products.push(product),
        Ok(None) => {}
        Err(e) => warn!(product_id = %id, error = %e, "Failed to read listed product from chain; skipping."),
      }
    }
    Ok(products)
  }
}

#[async_trait]
impl ProductStore for ChainCatalog {
  async fn fetch_product(&self, product_id: &str) -> SyncResult<Option<Product>> {
    let now = Utc::now();
    Ok(self.fetch_record(product_id).await?.map(|r| Product {
      product_id: r.product_id,
      name: r.name,
      description: r.description,
      price: r.price,
      image_url: r.image_url,
      category: r.category,
      is_available: r.is_available,
      stock: r.stock,
      created_at: now,
      updated_at: now,
    }))
  }
}
