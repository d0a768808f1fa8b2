// threadmint/src/transactions.rs

//! History of chain writes made through the shop, queried per wallet.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};
use crate::models::{NewTransaction, TransactionRecord};

#[async_trait]
pub trait TransactionLog: Send + Sync {
  async fn record(&self, tx: NewTransaction) -> SyncResult<TransactionRecord>;

  /// Newest first. `page` is 1-based.
  async fn list_by_wallet(&self, wallet_address: &str, page: i64, limit: i64) -> SyncResult<Vec<TransactionRecord>>;
}

#[derive(FromRow)]
struct TransactionRow {
  id: Uuid,
  tx_hash: String,
  kind: String,
  product_id: Option<String>,
  wallet_address: String,
  status: String,
  created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for TransactionRecord {
  type Error = SyncError;

  fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
    Ok(TransactionRecord {
      id: row.id,
      tx_hash: row.tx_hash,
      kind: row.kind.parse()?,
      product_id: row.product_id,
      wallet_address: row.wallet_address,
      status: row.status.parse()?,
      created_at: row.created_at,
    })
  }
}

/// `(limit, offset)` for a 1-based page. Out-of-range values are clamped to 1.
fn history_window(page: i64, limit: i64) -> SyncResult<(i64, i64)> {
  let limit = limit.max(1);
  let offset = (page.max(1) - 1)
    .checked_mul(limit)
    .ok_or_else(|| SyncError::InvalidInput(format!("page {} is out of range for limit {}", page, limit)))?;
  Ok((limit, offset))
}

#[derive(Debug, Clone)]
pub struct PgTransactionLog {
  pool: PgPool,
}

impl PgTransactionLog {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl TransactionLog for PgTransactionLog {
  async fn record(&self, tx: NewTransaction) -> SyncResult<TransactionRecord> {
    let row = sqlx::query_as::<_, TransactionRow>(
      r#"
      INSERT INTO transactions (id, tx_hash, kind, product_id, wallet_address, status, created_at)
      VALUES ($1, $2, $3, $4, $5, $6, NOW())
      RETURNING id, tx_hash, kind, product_id, wallet_address, status, created_at
      "#,
    )
    .bind(Uuid::new_v4())
    .bind(&tx.tx_hash)
    .bind(tx.kind.as_str())
    .bind(&tx.product_id)
    .bind(tx.wallet_address.to_lowercase())
    .bind(tx.status.as_str())
    .fetch_one(&self.pool)
    .await?;
    row.try_into()
  }

  async fn list_by_wallet(&self, wallet_address: &str, page: i64, limit: i64) -> SyncResult<Vec<TransactionRecord>> {
    let (limit, offset) = history_window(page, limit)?;
    let rows = sqlx::query_as::<_, TransactionRow>(
      r#"
      SELECT id, tx_hash, kind, product_id, wallet_address, status, created_at
      FROM transactions
      WHERE wallet_address = $1
      ORDER BY created_at DESC
      LIMIT $2 OFFSET $3
      "#,
    )
    .bind(wallet_address.to_lowercase())
    .bind(limit)
    .bind(offset)
    .fetch_all(&self.pool)
    .await?;
    rows.into_iter().map(TransactionRecord::try_from).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn history_window_clamps_and_rejects_overflow() {
    assert_eq!(history_window(1, 10).unwrap(), (10, 0));
    assert_eq!(history_window(3, 20).unwrap(), (20, 40));
    assert_eq!(history_window(0, 0).unwrap(), (1, 0));
    assert!(matches!(history_window(i64::MAX, 100), Err(SyncError::InvalidInput(_))));
  }
}
