// threadmint/src/sync.rs

//! Cache-aside arbitration between the hot cache, the SQL cache and the chain.
//!
//! Reads try the fastest tier first and back-fill the tiers they missed. Writes go
//! to the chain first and only touch the caches once the transaction is confirmed.
//! There is no locking around population: concurrent misses for the same key each
//! do their own back-fill, and every SQL write is a single-row upsert.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::chain::units::parse_id;
use crate::chain::{ChainCatalog, ChainGateway};
use crate::error::{SyncError, SyncResult};
use crate::hot_cache::keys::{item_key, list_key, LIST_PATTERN};
use crate::hot_cache::{CacheTtl, HotCache};
use crate::models::{
  AddProductReceipt, NewProduct, NewTransaction, Nft, Product, ProductPage, ProductQuery, ProductRecord,
  PurchaseReceipt, TransactionKind, TransactionRecord, TransactionStatus, TxReceipt, MAX_LIMIT,
};
use crate::sql_cache::ProductCache;
use crate::store::ProductStore;
use crate::transactions::TransactionLog;

/// Outcome of a full chain-to-SQL sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
  pub synced: usize,
  pub skipped: usize,
}

pub struct ProductSync {
  chain: Arc<dyn ChainGateway>,
  catalog: ChainCatalog,
  cache: Arc<dyn ProductCache>,
  hot: Arc<HotCache>,
  ledger: Option<Arc<dyn TransactionLog>>,
  ttl: CacheTtl,
}

impl ProductSync {
  pub fn new(chain: Arc<dyn ChainGateway>, cache: Arc<dyn ProductCache>, hot: Arc<HotCache>) -> Self {
    Self {
      catalog: ChainCatalog::new(chain.clone()),
      chain,
      cache,
      hot,
      ledger: None,
      ttl: CacheTtl::default(),
    }
  }

  pub fn with_ledger(mut self, ledger: Arc<dyn TransactionLog>) -> Self {
    self.ledger = Some(ledger);
    self
  }

  pub fn with_ttl(mut self, ttl: CacheTtl) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn hot_cache(&self) -> &HotCache {
    &self.hot
  }

  // --- Reads ---

  /// A hot-cache hit carries only the row list, so its pagination describes that
  /// list rather than the full table.
  #[instrument(
    name = "product_sync::get_all_products",
    skip(self, query),
    fields(page = query.page, limit = query.limit, search = ?query.search, category = ?query.category),
    err(Display)
  )]
  pub async fn get_all_products(&self, query: &ProductQuery) -> SyncResult<ProductPage> {
    let key = list_key(query);
    if let Some(products) = self.hot.get_json::<Vec<Product>>(&key).await {
      debug!(key = %key, count = products.len(), "Listing served from hot cache.");
      return Ok(ProductPage::from_cached_rows(query, products));
    }

    if !self.cache.has_products().await? {
      info!("SQL cache has never been populated; running full sync.");
      self.full_sync().await?;
    }

    let page = self.cache.list_products(query).await?;
    self.hot.set_json(&key, self.ttl.list_secs, &page.products).await;
    Ok(page)
  }

  /// `Ok(None)` when neither cache nor the chain knows the product. An id the chain
  /// could never hold is `Ok(None)` without touching any tier.
  #[instrument(name = "product_sync::get_product_by_id", skip(self), err(Display))]
  pub async fn get_product_by_id(&self, product_id: &str) -> SyncResult<Option<Product>> {
    if parse_id("product id", product_id).is_err() {
      debug!("Malformed product id; reporting as absent.");
      return Ok(None);
    }

    if let Some(product) = self.hot.fetch_product(product_id).await? {
      debug!("Product served from hot cache.");
      return Ok(Some(product));
    }

    if let Some(product) = self.cache.fetch_product(product_id).await? {
      debug!("Product served from SQL cache.");
      self.hot.set_json(&item_key(product_id), self.ttl.item_secs, &product).await;
      return Ok(Some(product));
    }

    let Some(record) = self.catalog.fetch_record(product_id).await? else {
      debug!("Product not found on chain.");
      return Ok(None);
    };
    let product = self.cache.upsert_product(&record).await?;
    info!("Product back-filled from chain.");
    self.hot.set_json(&item_key(product_id), self.ttl.item_secs, &product).await;
    Ok(Some(product))
  }

  /// Copies every chain product into the SQL cache. Failing ids are logged and
  /// skipped; only a failure to enumerate ids aborts the sync.
  #[instrument(name = "product_sync::full_sync", skip(self), err(Display))]
  pub async fn full_sync(&self) -> SyncResult<SyncReport> {
    let ids = self.chain.get_all_product_ids().await?;
    let mut report = SyncReport::default();

    for id in &ids {
      let record = match self.catalog.fetch_record(id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
          debug!(product_id = %id, "Listed id has no product; skipping.");
          report.skipped += 1;
          continue;
        }
        Err(e) => {
          warn!(product_id = %id, error = %e, "Failed to read product from chain; skipping.");
          report.skipped += 1;
          continue;
        }
      };

      match self.cache.upsert_product(&record).await {
        Ok(_) => report.synced += 1,
        Err(e) => {
          warn!(product_id = %id, error = %e, "Failed to cache product; skipping.");
          report.skipped += 1;
        }
      }
    }

    info!(total = ids.len(), synced = report.synced, skipped = report.skipped, "Full sync finished.");
    Ok(report)
  }

  // --- Cache maintenance ---

  /// Upserts a confirmed product and drops every cached listing.
  pub async fn add_product_to_cache(&self, record: &ProductRecord) -> SyncResult<Product> {
    let product = self.cache.upsert_product(record).await?;
    self.hot.invalidate_pattern(LIST_PATTERN).await;
    Ok(product)
  }

  /// Returns whether a row was deleted.
  pub async fn remove_product_from_cache(&self, product_id: &str) -> SyncResult<bool> {
    let removed = self.cache.delete_product(product_id).await?;
    self.hot.del(&[item_key(product_id)]).await;
    self.hot.invalidate_pattern(LIST_PATTERN).await;
    Ok(removed)
  }

  /// Drops only the item key. Cached listings keep the old stock until they expire.
  pub async fn update_product_stock(&self, product_id: &str, new_stock: i32) -> SyncResult<Option<Product>> {
    let Some(current) = self.cache.fetch_product(product_id).await? else {
      return Ok(None);
    };
    let mut record = current.to_record();
    record.stock = new_stock.max(0);
    let product = self.cache.upsert_product(&record).await?;
    self.hot.del(&[item_key(product_id)]).await;
    Ok(Some(product))
  }

  // --- Writes ---

  #[instrument(name = "product_sync::add_product", skip(self, product), fields(name = %product.name), err(Display))]
  pub async fn add_product(&self, product: NewProduct) -> SyncResult<AddProductReceipt> {
    validate_new_product(&product)?;

    let receipt = match self.chain.add_product(&product).await {
      Ok(receipt) => receipt,
      Err(e) => return Err(self.record_revert(e, TransactionKind::AddProduct, None, self.chain.signer_address()).await),
    };

    match &receipt.product_id {
      Some(id) => match self.catalog.fetch_record(id).await {
        Ok(Some(record)) => {
          if let Err(e) = self.add_product_to_cache(&record).await {
            warn!(product_id = %id, error = %e, "Product confirmed on chain but not cached.");
            self.hot.invalidate_pattern(LIST_PATTERN).await;
          }
        }
        Ok(None) => {
          warn!(product_id = %id, "Confirmed product not yet readable from chain.");
          self.hot.invalidate_pattern(LIST_PATTERN).await;
        }
        Err(e) => {
          warn!(product_id = %id, error = %e, "Failed to re-read confirmed product.");
          self.hot.invalidate_pattern(LIST_PATTERN).await;
        }
      },
      None => {
        warn!(tx = %receipt.transaction_hash, "No product id in receipt; dropping cached listings only.");
        self.hot.invalidate_pattern(LIST_PATTERN).await;
      }
    }

    self
      .record_transaction(NewTransaction {
        tx_hash: receipt.transaction_hash.clone(),
        kind: TransactionKind::AddProduct,
        product_id: receipt.product_id.clone(),
        wallet_address: self.chain.signer_address(),
        status: TransactionStatus::Confirmed,
      })
      .await;
    Ok(receipt)
  }

  #[instrument(name = "product_sync::purchase_product", skip(self, buyer_key), err(Display))]
  pub async fn purchase_product(
    &self,
    product_id: &str,
    buyer_address: &str,
    price: Decimal,
    buyer_key: Option<&str>,
  ) -> SyncResult<PurchaseReceipt> {
    let receipt = match self.chain.purchase_product(product_id, buyer_address, price, buyer_key).await {
      Ok(receipt) => receipt,
      Err(e) => {
        return Err(
          self
            .record_revert(e, TransactionKind::Purchase, Some(product_id), buyer_address.to_string())
            .await,
        )
      }
    };

    if let Err(e) = self.apply_purchase_to_cache(product_id).await {
      warn!(product_id, error = %e, "Purchase confirmed on chain but cache not updated.");
    }

    self
      .record_transaction(NewTransaction {
        tx_hash: receipt.transaction_hash.clone(),
        kind: TransactionKind::Purchase,
        product_id: Some(product_id.to_string()),
        wallet_address: buyer_address.to_string(),
        status: TransactionStatus::Confirmed,
      })
      .await;
    Ok(receipt)
  }

  #[instrument(name = "product_sync::delete_product", skip(self), err(Display))]
  pub async fn delete_product(&self, product_id: &str) -> SyncResult<TxReceipt> {
    let receipt = match self.chain.delete_product(product_id).await {
      Ok(receipt) => receipt,
      Err(e) => {
        return Err(
          self
            .record_revert(e, TransactionKind::DeleteProduct, Some(product_id), self.chain.signer_address())
            .await,
        )
      }
    };

    if let Err(e) = self.remove_product_from_cache(product_id).await {
      warn!(product_id, error = %e, "Product deleted on chain but still cached.");
    }

    self
      .record_transaction(NewTransaction {
        tx_hash: receipt.transaction_hash.clone(),
        kind: TransactionKind::DeleteProduct,
        product_id: Some(product_id.to_string()),
        wallet_address: self.chain.signer_address(),
        status: TransactionStatus::Confirmed,
      })
      .await;
    Ok(receipt)
  }

  /// Reads a page straight from the contract, bypassing both caches.
  #[instrument(name = "product_sync::chain_products", skip(self), err(Display))]
  pub async fn chain_products(&self, offset: u64, limit: u64) -> SyncResult<Vec<Product>> {
    if limit == 0 || limit > MAX_LIMIT as u64 {
      return Err(SyncError::InvalidInput(format!(
        "limit must be between 1 and {}, got {}",
        MAX_LIMIT, limit
      )));
    }
    self.catalog.list_page(offset, limit).await
  }

  pub async fn get_nft(&self, token_id: &str) -> SyncResult<Nft> {
    self.chain.get_nft(token_id).await
  }

  pub async fn get_user_nfts(&self, address: &str) -> SyncResult<Vec<Nft>> {
    self.chain.get_user_nfts(address).await
  }

  pub async fn wallet_transactions(&self, address: &str, page: i64, limit: i64) -> SyncResult<Vec<TransactionRecord>> {
    match &self.ledger {
      Some(ledger) => ledger.list_by_wallet(address, page, limit).await,
      None => Ok(Vec::new()),
    }
  }

  // --- Helpers ---

  /// Decrements the cached stock, or back-fills the row when it was never cached.
  async fn apply_purchase_to_cache(&self, product_id: &str) -> SyncResult<()> {
    if let Some(current) = self.cache.fetch_product(product_id).await? {
      self.update_product_stock(product_id, current.stock - 1).await?;
      return Ok(());
    }

    if let Some(record) = self.catalog.fetch_record(product_id).await? {
      self.cache.upsert_product(&record).await?;
      self.hot.del(&[item_key(product_id)]).await;
    }
    Ok(())
  }

  async fn record_transaction(&self, tx: NewTransaction) {
    let Some(ledger) = &self.ledger else { return };
    let tx_hash = tx.tx_hash.clone();
    if let Err(e) = ledger.record(tx).await {
      warn!(tx = %tx_hash, error = %e, "Failed to record transaction.");
    }
  }

  /// Logs a mined-but-reverted write as failed, then hands the error back.
  async fn record_revert(
    &self,
    err: SyncError,
    kind: TransactionKind,
    product_id: Option<&str>,
    wallet_address: String,
  ) -> SyncError {
    if let SyncError::Reverted { tx_hash } = &err {
      self
        .record_transaction(NewTransaction {
          tx_hash: tx_hash.clone(),
          kind,
          product_id: product_id.map(str::to_string),
          wallet_address,
          status: TransactionStatus::Failed,
        })
        .await;
    }
    err
  }
}

fn validate_new_product(product: &NewProduct) -> SyncResult<()> {
  if product.name.trim().is_empty() {
    return Err(SyncError::InvalidInput("product name is required".to_string()));
  }
  if product.price <= Decimal::ZERO {
    return Err(SyncError::InvalidInput("product price must be positive".to_string()));
  }
  Ok(())
}
