// threadmint/src/store.rs

//! The read contract every catalog tier satisfies: hot cache, SQL cache and chain.
//! Tiers are independently swappable, so the sync layer can be driven with fakes.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::models::Product;

#[async_trait]
pub trait ProductStore: Send + Sync {
  /// Looks up one product by its chain-assigned id. `Ok(None)` means the tier has no
  /// such product; errors are reserved for the tier itself failing.
  async fn fetch_product(&self, product_id: &str) -> SyncResult<Option<Product>>;
}
