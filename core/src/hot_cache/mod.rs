// threadmint/src/hot_cache/mod.rs

//! Optional key-value layer in front of the SQL cache.
//!
//! The hot cache is a performance tier only. When the backend is unreachable at
//! startup or starts failing later, every operation degrades to a no-op with a
//! safe default and the caller carries on against the SQL cache or the chain.

pub mod keys;
pub mod memory;
pub mod remote;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::SyncResult;
use crate::models::Product;
use crate::store::ProductStore;

pub use memory::MemoryKvBackend;
pub use remote::RedisBackend;

/// Scheme that selects [`MemoryKvBackend`] instead of a Redis server.
pub const MEMORY_URL: &str = "memory://";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait KvBackend: Send + Sync {
  async fn ping(&self) -> anyhow::Result<()>;
  async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
  async fn set_ex(&self, key: &str, ttl_secs: u64, value: &str) -> anyhow::Result<()>;
  /// Returns how many of `keys` existed.
  async fn del(&self, keys: &[String]) -> anyhow::Result<u64>;
  async fn keys(&self, pattern: &str) -> anyhow::Result<Vec<String>>;
  async fn flush(&self) -> anyhow::Result<()>;
}

/// Expiry applied to the two kinds of entries, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
  pub list_secs: u64,
  pub item_secs: u64,
}

impl CacheTtl {
  pub const DEFAULT_LIST_SECS: u64 = 300;
  pub const DEFAULT_ITEM_SECS: u64 = 600;
}

impl Default for CacheTtl {
  fn default() -> Self {
    Self {
      list_secs: Self::DEFAULT_LIST_SECS,
      item_secs: Self::DEFAULT_ITEM_SECS,
    }
  }
}

pub struct HotCache {
  backend: Option<Arc<dyn KvBackend>>,
  connected: AtomicBool,
}

impl HotCache {
  /// Connects to `url` (or builds the in-process store for [`MEMORY_URL`]) and
  /// pings it. Any failure yields a disconnected cache rather than an error.
  pub async fn connect(url: &str) -> Self {
    if url == MEMORY_URL {
      info!("Hot cache using in-process store.");
      return Self::with_backend(Arc::new(MemoryKvBackend::new()));
    }

    let attempt = async {
      let backend = RedisBackend::connect(url).await?;
      backend.ping().await?;
      anyhow::Ok(backend)
    };

    match tokio::time::timeout(CONNECT_TIMEOUT, attempt).await {
      Ok(Ok(backend)) => {
        info!("Hot cache connected.");
        Self::with_backend(Arc::new(backend))
      }
      Ok(Err(e)) => {
        warn!(error = %e, "Hot cache unavailable; continuing without it.");
        Self::disabled()
      }
      Err(_) => {
        warn!(timeout_secs = CONNECT_TIMEOUT.as_secs(), "Hot cache connection timed out; continuing without it.");
        Self::disabled()
      }
    }
  }

  pub fn with_backend(backend: Arc<dyn KvBackend>) -> Self {
    Self {
      backend: Some(backend),
      connected: AtomicBool::new(true),
    }
  }

  pub fn disabled() -> Self {
    Self {
      backend: None,
      connected: AtomicBool::new(false),
    }
  }

  pub fn is_connected(&self) -> bool {
    self.backend.is_some() && self.connected.load(Ordering::Acquire)
  }

  /// Stops all further traffic to the backend.
  pub fn close(&self) {
    if self.connected.swap(false, Ordering::AcqRel) {
      info!("Hot cache closed.");
    }
  }

  fn live(&self) -> Option<&Arc<dyn KvBackend>> {
    if self.connected.load(Ordering::Acquire) {
      self.backend.as_ref()
    } else {
      None
    }
  }

  pub async fn get(&self, key: &str) -> Option<String> {
    let backend = self.live()?;
    match backend.get(key).await {
      Ok(value) => value,
      Err(e) => {
        warn!(key, error = %e, "Hot cache GET failed.");
        None
      }
    }
  }

  pub async fn set_ex(&self, key: &str, ttl_secs: u64, value: &str) {
    let Some(backend) = self.live() else { return };
    if let Err(e) = backend.set_ex(key, ttl_secs, value).await {
      warn!(key, error = %e, "Hot cache SETEX failed.");
    }
  }

  pub async fn del(&self, keys: &[String]) {
    let Some(backend) = self.live() else { return };
    if let Err(e) = backend.del(keys).await {
      warn!(count = keys.len(), error = %e, "Hot cache DEL failed.");
    }
  }

  pub async fn keys(&self, pattern: &str) -> Vec<String> {
    let Some(backend) = self.live() else { return Vec::new() };
    match backend.keys(pattern).await {
      Ok(keys) => keys,
      Err(e) => {
        warn!(pattern, error = %e, "Hot cache KEYS failed.");
        Vec::new()
      }
    }
  }

  pub async fn flush(&self) {
    let Some(backend) = self.live() else { return };
    if let Err(e) = backend.flush().await {
      warn!(error = %e, "Hot cache FLUSHDB failed.");
    }
  }

  /// A stored value that no longer deserializes is treated as a miss.
  pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let raw = self.get(key).await?;
    match serde_json::from_str(&raw) {
      Ok(value) => Some(value),
      Err(e) => {
        warn!(key, error = %e, "Discarding undecodable hot cache entry.");
        None
      }
    }
  }

  pub async fn set_json<T: Serialize>(&self, key: &str, ttl_secs: u64, value: &T) {
    if self.live().is_none() {
      return;
    }
    match serde_json::to_string(value) {
      Ok(raw) => self.set_ex(key, ttl_secs, &raw).await,
      Err(e) => warn!(key, error = %e, "Could not encode hot cache entry."),
    }
  }

  /// Drops every key matching `pattern`. Returns how many keys were found.
  pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
    let keys = self.keys(pattern).await;
    if !keys.is_empty() {
      self.del(&keys).await;
    }
    debug!(pattern, count = keys.len(), "Invalidated hot cache keys.");
    keys.len()
  }
}

#[async_trait]
impl ProductStore for HotCache {
  async fn fetch_product(&self, product_id: &str) -> SyncResult<Option<Product>> {
    Ok(self.get_json(&keys::item_key(product_id)).await)
  }
}
