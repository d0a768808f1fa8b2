//! Conversions between contract values and catalog values.

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{SyncError, SyncResult};

/// wei -> ether as a decimal, trailing zeros stripped.
pub fn wei_to_display(wei: U256) -> SyncResult<Decimal> {
  let formatted = format_ether(wei);
  Decimal::from_str(&formatted)
    .map(|d| d.normalize())
    .map_err(|e| SyncError::Conversion(format!("price {} wei does not fit a decimal: {}", wei, e)))
}

pub fn display_to_wei(price: Decimal) -> SyncResult<U256> {
  if price.is_sign_negative() {
    return Err(SyncError::InvalidInput(format!("price must not be negative, got {}", price)));
  }
  parse_ether(&price.normalize().to_string())
    .map_err(|e| SyncError::InvalidInput(format!("price {} is not representable in wei: {}", price, e)))
}

/// Parses a decimal product or token id.
pub fn parse_id(kind: &str, id: &str) -> SyncResult<U256> {
  let trimmed = id.trim();
  if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
    return Err(SyncError::InvalidInput(format!("{} '{}' is not a decimal number", kind, id)));
  }
  U256::from_str_radix(trimmed, 10).map_err(|e| SyncError::InvalidInput(format!("{} '{}': {}", kind, id, e)))
}

/// Parses a caller-supplied wallet address.
pub fn parse_address(label: &str, value: &str) -> SyncResult<Address> {
  Address::from_str(value.trim()).map_err(|e| SyncError::InvalidInput(format!("{} address '{}': {}", label, value, e)))
}

pub fn saturating_u64(value: U256) -> u64 {
  u64::try_from(value).unwrap_or(u64::MAX)
}

pub fn format_tx_hash(hash: TxHash) -> String {
  format!("{:#x}", hash)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_hundredth_ether_is_ten_to_the_sixteen_wei() {
    let wei = U256::from(10_000_000_000_000_000u64);
    assert_eq!(wei_to_display(wei).unwrap(), Decimal::from_str("0.01").unwrap());
    assert_eq!(display_to_wei(Decimal::from_str("0.01").unwrap()).unwrap(), wei);
  }

  #[test]
  fn negative_prices_are_rejected() {
    assert!(matches!(
      display_to_wei(Decimal::from_str("-1").unwrap()),
      Err(SyncError::InvalidInput(_))
    ));
  }

  #[test]
  fn ids_must_be_decimal_digits() {
    assert_eq!(parse_id("product id", "42").unwrap(), U256::from(42u64));
    assert!(parse_id("product id", "0x2a").is_err());
    assert!(parse_id("product id", "").is_err());
    assert!(parse_id("product id", "1; DROP TABLE products").is_err());
  }

  #[test]
  fn oversized_codes_saturate() {
    assert_eq!(saturating_u64(U256::MAX), u64::MAX);
    assert_eq!(saturating_u64(U256::from(7u64)), 7);
  }
}
