use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::KvBackend;

/// Redis-backed store. The connection manager reconnects on its own, so a clone
/// per command is all the state needed.
#[derive(Clone)]
pub struct RedisBackend {
  conn: ConnectionManager,
}

impl RedisBackend {
  pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
    let client = redis::Client::open(redis_url)?;
    let conn = ConnectionManager::new(client).await?;
    Ok(Self { conn })
  }
}

#[async_trait]
impl KvBackend for RedisBackend {
  async fn ping(&self) -> anyhow::Result<()> {
    let mut conn = self.conn.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(())
  }

  async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
    let mut conn = self.conn.clone();
    let value: Option<String> = conn.get(key).await?;
    Ok(value)
  }

  async fn set_ex(&self, key: &str, ttl_secs: u64, value: &str) -> anyhow::Result<()> {
    let mut conn = self.conn.clone();
    let _: () = conn.set_ex(key, value, ttl_secs.max(1)).await?;
    Ok(())
  }

  async fn del(&self, keys: &[String]) -> anyhow::Result<u64> {
    if keys.is_empty() {
      return Ok(0);
    }
    let mut conn = self.conn.clone();
    let removed: u64 = conn.del(keys).await?;
    Ok(removed)
  }

  /// Walks the keyspace with SCAN. SCAN may repeat keys; the result is deduplicated.
  async fn keys(&self, pattern: &str) -> anyhow::Result<Vec<String>> {
    let mut conn = self.conn.clone();
    let mut iter: redis::AsyncIter<'_, String> = conn.scan_match(pattern).await?;
    let mut keys = Vec::new();
    while let Some(key) = iter.next_item().await {
      keys.push(key);
    }
    keys.sort();
    keys.dedup();
    Ok(keys)
  }

  async fn flush(&self) -> anyhow::Result<()> {
    let mut conn = self.conn.clone();
    let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
    Ok(())
  }
}
