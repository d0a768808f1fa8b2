//! Connection settings for the shop and NFT contracts.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{SyncError, SyncResult};

pub const DEFAULT_CONFIRMATIONS: u64 = 1;
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct ChainConfig {
  pub rpc_url: String,
  pub shop_address: String,
  pub nft_address: String,
  /// Signer for shop-initiated writes (add, delete, and purchases without a buyer key).
  pub private_key: String,
  pub confirmations: u64,
  pub receipt_timeout: Duration,
}

impl fmt::Debug for ChainConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChainConfig")
      .field("rpc_url", &self.rpc_url)
      .field("shop_address", &self.shop_address)
      .field("nft_address", &self.nft_address)
      .field("private_key", &"[REDACTED]")
      .field("confirmations", &self.confirmations)
      .field("receipt_timeout", &self.receipt_timeout)
      .finish()
  }
}

/// A [`ChainConfig`] whose addresses, key and URL have been parsed.
#[derive(Clone)]
pub(crate) struct ValidatedChainConfig {
  pub rpc_url: alloy::transports::http::reqwest::Url,
  pub shop_address: Address,
  pub nft_address: Address,
  pub signer: PrivateKeySigner,
  pub confirmations: u64,
  pub receipt_timeout: Duration,
}

impl ChainConfig {
  /// Default confirmation count and receipt timeout.
  pub fn new(
    rpc_url: impl Into<String>,
    shop_address: impl Into<String>,
    nft_address: impl Into<String>,
    private_key: impl Into<String>,
  ) -> Self {
    Self {
      rpc_url: rpc_url.into(),
      shop_address: shop_address.into(),
      nft_address: nft_address.into(),
      private_key: private_key.into(),
      confirmations: DEFAULT_CONFIRMATIONS,
      receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
    }
  }

  pub(crate) fn validate(&self) -> SyncResult<ValidatedChainConfig> {
    let rpc_url = self
      .rpc_url
      .parse()
      .map_err(|e| SyncError::Configuration(format!("Invalid RPC URL '{}': {}", self.rpc_url, e)))?;
    let shop_address = contract_address("shop", &self.shop_address)?;
    let nft_address = contract_address("NFT", &self.nft_address)?;
    let signer = parse_signer(&self.private_key)?;
    if self.confirmations == 0 {
      return Err(SyncError::Configuration("confirmations must be at least 1".to_string()));
    }

    Ok(ValidatedChainConfig {
      rpc_url,
      shop_address,
      nft_address,
      signer,
      confirmations: self.confirmations,
      receipt_timeout: self.receipt_timeout,
    })
  }
}

fn contract_address(label: &str, value: &str) -> SyncResult<Address> {
  Address::from_str(value.trim())
    .map_err(|e| SyncError::Configuration(format!("Invalid {} contract address '{}': {}", label, value, e)))
}

pub(crate) fn parse_signer(private_key: &str) -> SyncResult<PrivateKeySigner> {
  private_key
    .trim()
    .parse::<PrivateKeySigner>()
    .map_err(|e| SyncError::Configuration(format!("Invalid private key: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_config() -> ChainConfig {
    ChainConfig {
      rpc_url: "http://127.0.0.1:8545".to_string(),
      shop_address: "0x3Aa5ebB10DC797CAC828524e59A333d0A371443c".to_string(),
      nft_address: "0x68B1D87F95878fE05B998F19b66F4baba5De1aed".to_string(),
      // Well-known local development key (hardhat account #0).
      private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
      confirmations: DEFAULT_CONFIRMATIONS,
      receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
    }
  }

  #[test]
  fn valid_config_parses() {
    let validated = test_config().validate().unwrap();
    assert_eq!(
      validated.signer.address(),
      Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
    );
  }

  #[test]
  fn invalid_address_is_a_configuration_error() {
    let mut config = test_config();
    config.shop_address = "not-an-address".to_string();
    assert!(matches!(config.validate(), Err(SyncError::Configuration(_))));
  }

  #[test]
  fn invalid_key_is_a_configuration_error() {
    let mut config = test_config();
    config.private_key = "0x1234".to_string();
    assert!(matches!(config.validate(), Err(SyncError::Configuration(_))));
  }

  #[test]
  fn debug_output_hides_the_key() {
    let rendered = format!("{:?}", test_config());
    assert!(!rendered.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"));
    assert!(rendered.contains("[REDACTED]"));
  }
}
