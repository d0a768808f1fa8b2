// threadmint/src/chain/mod.rs

//! Chain Reader: domain operations translated into shop/NFT contract calls.
//!
//! Network and provider errors, and reverted transactions, propagate to the caller.
//! Nothing here retries; the sync layer decides whether to fail or serve cached data.

pub mod abi;
pub mod catalog;
pub mod client;
pub mod config;
pub mod units;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::SyncResult;
use crate::models::{AddProductReceipt, ChainProduct, NewProduct, Nft, PurchaseReceipt, TxReceipt};

pub use catalog::ChainCatalog;
pub use client::EvmChainReader;
pub use config::ChainConfig;

#[async_trait]
pub trait ChainGateway: Send + Sync {
  /// Lists a product and waits for confirmation. The returned id is `None` when no
  /// `ProductAdded` event was found in the receipt.
  async fn add_product(&self, product: &NewProduct) -> SyncResult<AddProductReceipt>;

  /// Sends a value-bearing purchase. With `buyer_key` the buyer signs; otherwise the
  /// shop signer pays and receives the token.
  async fn purchase_product(
    &self,
    product_id: &str,
    buyer_address: &str,
    price: Decimal,
    buyer_key: Option<&str>,
  ) -> SyncResult<PurchaseReceipt>;

  /// Fails when the receipt reports a failed status.
  async fn delete_product(&self, product_id: &str) -> SyncResult<TxReceipt>;

  async fn get_product(&self, product_id: &str) -> SyncResult<Option<ChainProduct>>;

  async fn get_all_product_ids(&self) -> SyncResult<Vec<String>>;

  async fn get_product_ids_by_page(&self, offset: u64, limit: u64) -> SyncResult<Vec<String>>;

  async fn get_nft(&self, token_id: &str) -> SyncResult<Nft>;

  /// Walks every token up to total supply and keeps the ones `address` owns. Linear
  /// in total supply; the contract offers no per-owner enumeration.
  async fn get_user_nfts(&self, address: &str) -> SyncResult<Vec<Nft>>;

  /// Never fails; unmapped codes resolve to [`crate::category::UNKNOWN_CATEGORY`].
  async fn category_name(&self, type_code: u64) -> String;

  /// Address of the shop signer, used as the wallet for shop-initiated writes.
  fn signer_address(&self) -> String;
}
