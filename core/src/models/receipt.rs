// threadmint/src/models/receipt.rs

use serde::{Deserialize, Serialize};

/// Outcome of `addProduct`. `product_id` is `None` when the receipt carried no
/// `ProductAdded` event; callers must cope with that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductReceipt {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub product_id: Option<String>,
  pub transaction_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub token_id: Option<String>,
  pub transaction_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
  pub success: bool,
  pub transaction_hash: String,
}
