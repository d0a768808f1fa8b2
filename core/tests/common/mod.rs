// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fake

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use threadmint::models::{
  AddProductReceipt, ChainProduct, NewProduct, NewTransaction, Nft, Pagination, Product, ProductPage, ProductQuery,
  ProductRecord, PurchaseReceipt, TransactionRecord, TxReceipt,
};
use threadmint::{
  CategoryResolver, ChainGateway, HotCache, KvBackend, MemoryKvBackend, ProductCache, ProductStore, ProductSync,
  StaticCategories, SyncError, SyncResult, TransactionLog,
};
use tracing::Level;

pub const SHOP_SIGNER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const BUYER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

// --- Chain ---

/// In-memory shop contract. Counts product reads so tests can assert which tier
/// served a request.
pub struct FakeChain {
  products: Mutex<BTreeMap<u64, ChainProduct>>,
  failing_ids: Mutex<HashSet<String>>,
  next_product_id: AtomicU64,
  next_token_id: AtomicU64,
  next_tx: AtomicU64,
  omit_added_event: AtomicBool,
  revert_writes: AtomicBool,
  product_reads: AtomicUsize,
  categories: StaticCategories,
}

impl Default for FakeChain {
  fn default() -> Self {
    Self {
      products: Mutex::new(BTreeMap::new()),
      failing_ids: Mutex::new(HashSet::new()),
      next_product_id: AtomicU64::new(1),
      next_token_id: AtomicU64::new(1),
      next_tx: AtomicU64::new(1),
      omit_added_event: AtomicBool::new(false),
      revert_writes: AtomicBool::new(false),
      product_reads: AtomicUsize::new(0),
      categories: StaticCategories::default(),
    }
  }
}

impl FakeChain {
  /// Lists a product directly, bypassing the write path. Returns its id.
  pub fn seed(&self, product: ChainProduct) -> String {
    let id = self.next_product_id.fetch_add(1, Ordering::SeqCst);
    self.products.lock().insert(id, product);
    id.to_string()
  }

  pub fn set_stock(&self, product_id: &str, stock: u64) {
    let id: u64 = product_id.parse().unwrap();
    if let Some(p) = self.products.lock().get_mut(&id) {
      p.stock = stock;
    }
  }

  pub fn fail_reads_for(&self, product_id: &str) {
    self.failing_ids.lock().insert(product_id.to_string());
  }

  pub fn omit_added_event(&self) {
    self.omit_added_event.store(true, Ordering::SeqCst);
  }

  pub fn revert_writes(&self) {
    self.revert_writes.store(true, Ordering::SeqCst);
  }

  pub fn product_reads(&self) -> usize {
    self.product_reads.load(Ordering::SeqCst)
  }

  pub fn reset_reads(&self) {
    self.product_reads.store(0, Ordering::SeqCst);
  }

  pub fn stock_of(&self, product_id: &str) -> Option<u64> {
    let id: u64 = product_id.parse().ok()?;
    self.products.lock().get(&id).map(|p| p.stock)
  }

  fn tx_hash(&self) -> String {
    format!("0x{:064x}", self.next_tx.fetch_add(1, Ordering::SeqCst))
  }

  fn parse(product_id: &str) -> SyncResult<u64> {
    product_id
      .parse()
      .map_err(|_| SyncError::InvalidInput(format!("product id must be a non-negative integer, got '{}'", product_id)))
  }
}

#[async_trait]
impl ChainGateway for FakeChain {
  async fn add_product(&self, product: &NewProduct) -> SyncResult<AddProductReceipt> {
    let tx = self.tx_hash();
    if self.revert_writes.load(Ordering::SeqCst) {
      return Err(SyncError::Reverted { tx_hash: tx });
    }
    let id = self.seed(ChainProduct {
      name: product.name.clone(),
      description: product.description.clone(),
      price: product.price,
      image_url: product.image_url.clone(),
      category_code: product.category,
      is_available: true,
      stock: product.stock,
    });
    let product_id = (!self.omit_added_event.load(Ordering::SeqCst)).then_some(id);
    Ok(AddProductReceipt {
      success: true,
      product_id,
      transaction_hash: tx,
    })
  }

  async fn purchase_product(
    &self,
    product_id: &str,
    _buyer_address: &str,
    price: Decimal,
    _buyer_key: Option<&str>,
  ) -> SyncResult<PurchaseReceipt> {
    let id = Self::parse(product_id)?;
    let tx = self.tx_hash();
    let mut products = self.products.lock();
    let purchasable = matches!(products.get(&id), Some(p) if p.stock > 0 && p.is_available && p.price == price);
    if !purchasable || self.revert_writes.load(Ordering::SeqCst) {
      return Err(SyncError::Reverted { tx_hash: tx });
    }
    if let Some(p) = products.get_mut(&id) {
      p.stock -= 1;
    }
    Ok(PurchaseReceipt {
      success: true,
      token_id: Some(self.next_token_id.fetch_add(1, Ordering::SeqCst).to_string()),
      transaction_hash: tx,
    })
  }

  async fn delete_product(&self, product_id: &str) -> SyncResult<TxReceipt> {
    let id = Self::parse(product_id)?;
    let tx = self.tx_hash();
    if self.products.lock().remove(&id).is_none() || self.revert_writes.load(Ordering::SeqCst) {
      return Err(SyncError::Reverted { tx_hash: tx });
    }
    Ok(TxReceipt {
      success: true,
      transaction_hash: tx,
    })
  }

  async fn get_product(&self, product_id: &str) -> SyncResult<Option<ChainProduct>> {
    self.product_reads.fetch_add(1, Ordering::SeqCst);
    if self.failing_ids.lock().contains(product_id) {
      return Err(SyncError::ChainCall(format!("getProduct({}): connection reset", product_id)));
    }
    let id = Self::parse(product_id)?;
    Ok(self.products.lock().get(&id).cloned())
  }

  async fn get_all_product_ids(&self) -> SyncResult<Vec<String>> {
    Ok(self.products.lock().keys().map(|id| id.to_string()).collect())
  }

  async fn get_product_ids_by_page(&self, offset: u64, limit: u64) -> SyncResult<Vec<String>> {
    Ok(
      self
        .products
        .lock()
        .keys()
        .skip(offset as usize)
        .take(limit as usize)
        .map(|id| id.to_string())
        .collect(),
    )
  }

  async fn get_nft(&self, token_id: &str) -> SyncResult<Nft> {
    Err(SyncError::NotFound(format!("token {}", token_id)))
  }

  async fn get_user_nfts(&self, _address: &str) -> SyncResult<Vec<Nft>> {
    Ok(Vec::new())
  }

  async fn category_name(&self, type_code: u64) -> String {
    self.categories.category_name(type_code).await
  }

  fn signer_address(&self) -> String {
    SHOP_SIGNER.to_string()
  }
}

pub fn chain_product(name: &str, price: &str, category_code: u64, stock: u64) -> ChainProduct {
  ChainProduct {
    name: name.to_string(),
    description: format!("{} description", name),
    price: price.parse().unwrap(),
    image_url: format!("https://img.example/{}.png", name.to_lowercase().replace(' ', "-")),
    category_code,
    is_available: true,
    stock,
  }
}

// --- SQL cache ---

/// Same contract as the Postgres cache: upsert keeps `created_at`, listings are
/// newest first with ties broken by id.
#[derive(Default)]
pub struct MemoryProductCache {
  rows: Mutex<BTreeMap<String, Product>>,
  upserts: AtomicUsize,
}

impl MemoryProductCache {
  pub fn snapshot(&self) -> Vec<Product> {
    self.rows.lock().values().cloned().collect()
  }

  pub fn upserts(&self) -> usize {
    self.upserts.load(Ordering::SeqCst)
  }

  pub fn len(&self) -> usize {
    self.rows.lock().len()
  }
}

#[async_trait]
impl ProductStore for MemoryProductCache {
  async fn fetch_product(&self, product_id: &str) -> SyncResult<Option<Product>> {
    Ok(self.rows.lock().get(product_id).cloned())
  }
}

#[async_trait]
impl ProductCache for MemoryProductCache {
  async fn has_products(&self) -> SyncResult<bool> {
    Ok(!self.rows.lock().is_empty())
  }

  async fn count_products(&self) -> SyncResult<i64> {
    Ok(self.rows.lock().len() as i64)
  }

  async fn list_products(&self, query: &ProductQuery) -> SyncResult<ProductPage> {
    let needle = query.search.as_ref().map(|s| s.to_lowercase());
    let mut matched: Vec<Product> = self
      .rows
      .lock()
      .values()
      .filter(|p| match &needle {
        Some(n) => p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n),
        None => true,
      })
      .filter(|p| query.category.as_ref().map_or(true, |c| &p.category == c))
      .cloned()
      .collect();
    matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.product_id.cmp(&b.product_id)));

    let total = matched.len() as i64;
    let products = matched
      .into_iter()
      .skip(query.offset() as usize)
      .take(query.limit as usize)
      .collect();
    Ok(ProductPage {
      products,
      pagination: Pagination::new(query.page, query.limit, total),
    })
  }

  async fn upsert_product(&self, record: &ProductRecord) -> SyncResult<Product> {
    self.upserts.fetch_add(1, Ordering::SeqCst);
    let now = Utc::now();
    let mut rows = self.rows.lock();
    let created_at = rows.get(&record.product_id).map_or(now, |p| p.created_at);
    let product = Product {
      product_id: record.product_id.clone(),
      name: record.name.clone(),
      description: record.description.clone(),
      price: record.price,
      image_url: record.image_url.clone(),
      category: record.category.clone(),
      is_available: record.is_available,
      stock: record.stock.max(0),
      created_at,
      updated_at: now,
    };
    rows.insert(record.product_id.clone(), product.clone());
    Ok(product)
  }

  async fn delete_product(&self, product_id: &str) -> SyncResult<bool> {
    Ok(self.rows.lock().remove(product_id).is_some())
  }
}

// --- Hot cache ---

/// A backend that accepted the connection and then went away.
pub struct FailingKv;

#[async_trait]
impl KvBackend for FailingKv {
  async fn ping(&self) -> anyhow::Result<()> {
    Err(anyhow::anyhow!("connection refused"))
  }
  async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
    Err(anyhow::anyhow!("connection refused"))
  }
  async fn set_ex(&self, _key: &str, _ttl_secs: u64, _value: &str) -> anyhow::Result<()> {
    Err(anyhow::anyhow!("connection refused"))
  }
  async fn del(&self, _keys: &[String]) -> anyhow::Result<u64> {
    Err(anyhow::anyhow!("connection refused"))
  }
  async fn keys(&self, _pattern: &str) -> anyhow::Result<Vec<String>> {
    Err(anyhow::anyhow!("connection refused"))
  }
  async fn flush(&self) -> anyhow::Result<()> {
    Err(anyhow::anyhow!("connection refused"))
  }
}

// --- Transaction log ---

#[derive(Default)]
pub struct MemoryTxLog {
  records: Mutex<Vec<TransactionRecord>>,
  fail: AtomicBool,
}

impl MemoryTxLog {
  pub fn failing() -> Self {
    Self {
      records: Mutex::new(Vec::new()),
      fail: AtomicBool::new(true),
    }
  }

  pub fn records(&self) -> Vec<TransactionRecord> {
    self.records.lock().clone()
  }
}

#[async_trait]
impl TransactionLog for MemoryTxLog {
  async fn record(&self, tx: NewTransaction) -> SyncResult<TransactionRecord> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(SyncError::Other(anyhow::anyhow!("transactions table unavailable")));
    }
    let record = TransactionRecord {
      id: uuid::Uuid::new_v4(),
      tx_hash: tx.tx_hash,
      kind: tx.kind,
      product_id: tx.product_id,
      wallet_address: tx.wallet_address.to_lowercase(),
      status: tx.status,
      created_at: Utc::now(),
    };
    self.records.lock().push(record.clone());
    Ok(record)
  }

  async fn list_by_wallet(&self, wallet_address: &str, page: i64, limit: i64) -> SyncResult<Vec<TransactionRecord>> {
    let wallet = wallet_address.to_lowercase();
    let mut matched: Vec<TransactionRecord> =
      self.records.lock().iter().filter(|r| r.wallet_address == wallet).cloned().collect();
    matched.reverse();
    Ok(
      matched
        .into_iter()
        .skip(((page.max(1) - 1) * limit) as usize)
        .take(limit as usize)
        .collect(),
    )
  }
}

// --- Wiring ---

pub struct Harness {
  pub chain: Arc<FakeChain>,
  pub cache: Arc<MemoryProductCache>,
  pub kv: Arc<MemoryKvBackend>,
  pub ledger: Arc<MemoryTxLog>,
  pub sync: ProductSync,
}

impl Harness {
  pub fn new() -> Self {
    Self::with_ledger(MemoryTxLog::default())
  }

  pub fn with_ledger(ledger: MemoryTxLog) -> Self {
    let chain = Arc::new(FakeChain::default());
    let cache = Arc::new(MemoryProductCache::default());
    let kv = Arc::new(MemoryKvBackend::new());
    let ledger = Arc::new(ledger);
    let hot = Arc::new(HotCache::with_backend(kv.clone()));
    let sync = ProductSync::new(chain.clone(), cache.clone(), hot).with_ledger(ledger.clone());
    Self {
      chain,
      cache,
      kv,
      ledger,
      sync,
    }
  }

  /// Hot cache that connected, then started failing every call.
  pub fn with_broken_hot_cache() -> (Arc<FakeChain>, Arc<MemoryProductCache>, ProductSync) {
    let chain = Arc::new(FakeChain::default());
    let cache = Arc::new(MemoryProductCache::default());
    let hot = Arc::new(HotCache::with_backend(Arc::new(FailingKv)));
    let sync = ProductSync::new(chain.clone(), cache.clone(), hot);
    (chain, cache, sync)
  }
}

// --- Helper for Tracing Setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
