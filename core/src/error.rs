// threadmint/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  #[error("Chain call failed: {0}")]
  ChainCall(String),

  #[error("Chain transaction failed: {0}")]
  Transaction(String),

  #[error("Transaction {tx_hash} was mined but reverted")]
  Reverted { tx_hash: String },

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Invalid input: {0}")]
  InvalidInput(String),

  #[error("Conversion error: {0}")]
  Conversion(String),

  #[error("Configuration error: {0}")]
  Configuration(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error(transparent)]
  Other(#[from] AnyhowError),
}

impl SyncError {
  /// True when the error originated on the chain side (provider, RPC or a reverted tx).
  pub fn is_chain_failure(&self) -> bool {
    matches!(
      self,
      SyncError::ChainCall(_) | SyncError::Transaction(_) | SyncError::Reverted { .. }
    )
  }
}

pub type SyncResult<T, E = SyncError> = std::result::Result<T, E>;
