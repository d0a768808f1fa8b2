use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

use super::KvBackend;

#[derive(Clone)]
struct Entry {
  value: String,
  ttl: Duration,
}

/// Expires each entry after the TTL it was written with. Overwrites restart the clock.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
  fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
    Some(entry.ttl)
  }

  fn expire_after_update(
    &self,
    _key: &String,
    entry: &Entry,
    _updated_at: Instant,
    _duration_until_expiry: Option<Duration>,
  ) -> Option<Duration> {
    Some(entry.ttl)
  }
}

/// Process-local store on a moka cache, with per-key expiry.
#[derive(Clone)]
pub struct MemoryKvBackend {
  cache: Cache<String, Entry>,
}

impl Default for MemoryKvBackend {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryKvBackend {
  pub fn new() -> Self {
    Self {
      cache: Cache::builder().expire_after(PerEntryTtl).build(),
    }
  }

  /// Live entries only.
  pub fn len(&self) -> usize {
    self.cache.iter().count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl KvBackend for MemoryKvBackend {
  async fn ping(&self) -> anyhow::Result<()> {
    Ok(())
  }

  async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
    Ok(self.cache.get(key).await.map(|entry| entry.value))
  }

  async fn set_ex(&self, key: &str, ttl_secs: u64, value: &str) -> anyhow::Result<()> {
    let entry = Entry {
      value: value.to_string(),
      ttl: Duration::from_secs(ttl_secs.max(1)),
    };
    self.cache.insert(key.to_string(), entry).await;
    Ok(())
  }

  async fn del(&self, keys: &[String]) -> anyhow::Result<u64> {
    let mut removed = 0;
    for key in keys {
      if self.cache.remove(key).await.is_some() {
        removed += 1;
      }
    }
    Ok(removed)
  }

  async fn keys(&self, pattern: &str) -> anyhow::Result<Vec<String>> {
    let mut matched: Vec<String> = self
      .cache
      .iter()
      .filter(|(key, _)| glob_match(pattern, key))
      .map(|(key, _)| key.to_string())
      .collect();
    matched.sort();
    Ok(matched)
  }

  async fn flush(&self) -> anyhow::Result<()> {
    self.cache.invalidate_all();
    Ok(())
  }
}

/// Redis-style glob restricted to `*` and `?`.
pub(crate) fn glob_match(pattern: &str, candidate: &str) -> bool {
  let p: Vec<char> = pattern.chars().collect();
  let c: Vec<char> = candidate.chars().collect();
  let (mut pi, mut ci) = (0, 0);
  let mut backtrack: Option<(usize, usize)> = None;

  while ci < c.len() {
    if pi < p.len() && (p[pi] == '?' || p[pi] == c[ci]) {
      pi += 1;
      ci += 1;
    } else if pi < p.len() && p[pi] == '*' {
      backtrack = Some((pi, ci));
      pi += 1;
    } else if let Some((star, matched)) = backtrack {
      pi = star + 1;
      ci = matched + 1;
      backtrack = Some((star, matched + 1));
    } else {
      return false;
    }
  }

  while pi < p.len() && p[pi] == '*' {
    pi += 1;
  }
  pi == p.len()
}
