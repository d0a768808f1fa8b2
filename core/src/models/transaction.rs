// threadmint/src/models/transaction.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
  AddProduct,
  Purchase,
  DeleteProduct,
}

impl TransactionKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      TransactionKind::AddProduct => "add_product",
      TransactionKind::Purchase => "purchase",
      TransactionKind::DeleteProduct => "delete_product",
    }
  }
}

impl FromStr for TransactionKind {
  type Err = SyncError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "add_product" => Ok(TransactionKind::AddProduct),
      "purchase" => Ok(TransactionKind::Purchase),
      "delete_product" => Ok(TransactionKind::DeleteProduct),
      other => Err(SyncError::InvalidInput(format!("unknown transaction kind '{}'", other))),
    }
  }
}

impl fmt::Display for TransactionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  Confirmed,
  Failed,
}

impl TransactionStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      TransactionStatus::Confirmed => "confirmed",
      TransactionStatus::Failed => "failed",
    }
  }
}

impl FromStr for TransactionStatus {
  type Err = SyncError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "confirmed" => Ok(TransactionStatus::Confirmed),
      "failed" => Ok(TransactionStatus::Failed),
      other => Err(SyncError::InvalidInput(format!("unknown transaction status '{}'", other))),
    }
  }
}

/// A chain write the shop performed, kept for per-wallet history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
  pub id: Uuid,
  pub tx_hash: String,
  pub kind: TransactionKind,
  pub product_id: Option<String>,
  pub wallet_address: String,
  pub status: TransactionStatus,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
  pub tx_hash: String,
  pub kind: TransactionKind,
  pub product_id: Option<String>,
  pub wallet_address: String,
  pub status: TransactionStatus,
}
