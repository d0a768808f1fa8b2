// threadmint/src/models/nft.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
  pub token_id: String,
  pub owner: String,
  #[serde(rename = "tokenURI")]
  pub token_uri: String,
  pub product_info: NftProductInfo,
}

/// Product snapshot minted into the token at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftProductInfo {
  pub name: String,
  pub category: String,
  pub price: Decimal,
  pub size: String,
  pub color: String,
  pub is_available: bool,
}
