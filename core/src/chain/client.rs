//! alloy-backed [`ChainGateway`].
//!
//! Providers are built per call, read-only for views and wallet-backed for writes,
//! so the reader holds no connection state between requests.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::category::CategoryResolver;
use crate::chain::abi::{ClothingNFT, ClothingShop};
use crate::chain::config::{parse_signer, ChainConfig, ValidatedChainConfig};
use crate::chain::units::{display_to_wei, format_tx_hash, parse_address, parse_id, saturating_u64, wei_to_display};
use crate::chain::ChainGateway;
use crate::error::{SyncError, SyncResult};
use crate::models::{AddProductReceipt, ChainProduct, NewProduct, Nft, NftProductInfo, PurchaseReceipt, TxReceipt};

pub struct EvmChainReader {
  config: ValidatedChainConfig,
  categories: Arc<dyn CategoryResolver>,
}

impl EvmChainReader {
  /// Validates the contract addresses, signer key and RPC URL up front.
  pub fn new(config: ChainConfig, categories: Arc<dyn CategoryResolver>) -> SyncResult<Self> {
    let config = config.validate()?;
    info!(
      shop = %config.shop_address,
      nft = %config.nft_address,
      signer = %config.signer.address(),
      "Chain reader configured."
    );
    Ok(Self { config, categories })
  }

  fn read_provider(&self) -> impl Provider {
    ProviderBuilder::new().connect_http(self.config.rpc_url.clone())
  }

  fn signing_provider(&self, signer: PrivateKeySigner) -> impl Provider {
    let wallet = EthereumWallet::from(signer);
    ProviderBuilder::new().wallet(wallet).connect_http(self.config.rpc_url.clone())
  }

  /// Checks that the node answers and reports which chain it serves.
  pub async fn chain_id(&self) -> SyncResult<u64> {
    self
      .read_provider()
      .get_chain_id()
      .await
      .map_err(|e| SyncError::ChainCall(format!("eth_chainId: {}", e)))
  }

  fn shop_logs_decode<E: alloy::sol_types::SolEvent>(&self, receipt: &TransactionReceipt) -> Option<E> {
    receipt
      .inner
      .logs()
      .iter()
      .filter(|log| log.address() == self.config.shop_address)
      .find_map(|log| log.log_decode::<E>().ok())
      .map(|decoded| decoded.inner.data)
  }

  async fn fetch_nft(&self, provider: &impl Provider, token_id: U256) -> SyncResult<Nft> {
    let nft = ClothingNFT::new(self.config.nft_address, provider);

    let owner = nft
      .ownerOf(token_id)
      .call()
      .await
      .map_err(|e| SyncError::ChainCall(format!("ownerOf({}): {}", token_id, e)))?;
    let token_uri = nft
      .tokenURI(token_id)
      .call()
      .await
      .map_err(|e| SyncError::ChainCall(format!("tokenURI({}): {}", token_id, e)))?;
    let info = nft
      .getProductInfo(token_id)
      .call()
      .await
      .map_err(|e| SyncError::ChainCall(format!("getProductInfo({}): {}", token_id, e)))?;

    Ok(Nft {
      token_id: token_id.to_string(),
      owner: owner.to_checksum(None),
      token_uri,
      product_info: NftProductInfo {
        name: info.name,
        category: info.category,
        price: wei_to_display(info.price)?,
        size: info.size,
        color: info.color,
        is_available: info.isAvailable,
      },
    })
  }
}

#[async_trait]
impl ChainGateway for EvmChainReader {
  #[instrument(name = "chain::add_product", skip(self, product), fields(name = %product.name))]
  async fn add_product(&self, product: &NewProduct) -> SyncResult<AddProductReceipt> {
    let price = display_to_wei(product.price)?;
    let provider = self.signing_provider(self.config.signer.clone());
    let shop = ClothingShop::new(self.config.shop_address, &provider);

    let pending = shop
      .addProduct(
        product.name.clone(),
        product.description.clone(),
        price,
        product.image_url.clone(),
        U256::from(product.category),
        U256::from(product.stock),
      )
      .send()
      .await
      .map_err(|e| SyncError::Transaction(format!("addProduct: {}", e)))?;
    let transaction_hash = format_tx_hash(*pending.tx_hash());

    let receipt = pending
      .with_required_confirmations(self.config.confirmations)
      .with_timeout(Some(self.config.receipt_timeout))
      .get_receipt()
      .await
      .map_err(|e| SyncError::Transaction(format!("addProduct receipt {}: {}", transaction_hash, e)))?;
    if !receipt.status() {
      return Err(SyncError::Reverted { tx_hash: transaction_hash });
    }

    let product_id = self
      .shop_logs_decode::<ClothingShop::ProductAdded>(&receipt)
      .map(|event| event.productId.to_string());
    match &product_id {
      Some(id) => info!(product_id = %id, tx = %transaction_hash, "Product added on chain."),
      None => warn!(tx = %transaction_hash, "ProductAdded event missing from receipt; product id unknown."),
    }

    Ok(AddProductReceipt {
      success: true,
      product_id,
      transaction_hash,
    })
  }

  #[instrument(name = "chain::purchase_product", skip(self, buyer_key), fields(has_buyer_key = buyer_key.is_some()))]
  async fn purchase_product(
    &self,
    product_id: &str,
    buyer_address: &str,
    price: Decimal,
    buyer_key: Option<&str>,
  ) -> SyncResult<PurchaseReceipt> {
    let id = parse_id("product id", product_id)?;
    let value = display_to_wei(price)?;
    let buyer = parse_address("buyer", buyer_address)?;

    let signer = match buyer_key {
      Some(key) => {
        let signer = parse_signer(key).map_err(|_| SyncError::InvalidInput("buyer key is not a valid private key".to_string()))?;
        if signer.address() != buyer {
          return Err(SyncError::InvalidInput(format!(
            "buyer key does not belong to {}",
            buyer_address
          )));
        }
        signer
      }
      None => {
        debug!(buyer = %buyer, "No buyer key supplied; the shop signer pays and receives the token.");
        self.config.signer.clone()
      }
    };

    let provider = self.signing_provider(signer);
    let shop = ClothingShop::new(self.config.shop_address, &provider);

    let pending = shop
      .purchaseProduct(id)
      .value(value)
      .send()
      .await
      .map_err(|e| SyncError::Transaction(format!("purchaseProduct({}): {}", id, e)))?;
    let transaction_hash = format_tx_hash(*pending.tx_hash());

    let receipt = pending
      .with_required_confirmations(self.config.confirmations)
      .with_timeout(Some(self.config.receipt_timeout))
      .get_receipt()
      .await
      .map_err(|e| SyncError::Transaction(format!("purchaseProduct receipt {}: {}", transaction_hash, e)))?;
    if !receipt.status() {
      return Err(SyncError::Reverted { tx_hash: transaction_hash });
    }

    let token_id = self
      .shop_logs_decode::<ClothingShop::ProductPurchased>(&receipt)
      .map(|event| event.tokenId.to_string());
    if token_id.is_none() {
      warn!(tx = %transaction_hash, "ProductPurchased event missing from receipt; token id unknown.");
    }

    Ok(PurchaseReceipt {
      success: true,
      token_id,
      transaction_hash,
    })
  }

  #[instrument(name = "chain::delete_product", skip(self))]
  async fn delete_product(&self, product_id: &str) -> SyncResult<TxReceipt> {
    let id = parse_id("product id", product_id)?;
    let provider = self.signing_provider(self.config.signer.clone());
    let shop = ClothingShop::new(self.config.shop_address, &provider);

    let pending = shop
      .deleteProduct(id)
      .send()
      .await
      .map_err(|e| SyncError::Transaction(format!("deleteProduct({}): {}", id, e)))?;
    let transaction_hash = format_tx_hash(*pending.tx_hash());

    let receipt = pending
      .with_required_confirmations(self.config.confirmations)
      .with_timeout(Some(self.config.receipt_timeout))
      .get_receipt()
      .await
      .map_err(|e| SyncError::Transaction(format!("deleteProduct receipt {}: {}", transaction_hash, e)))?;
    if !receipt.status() {
      return Err(SyncError::Reverted { tx_hash: transaction_hash });
    }

    info!(product_id, tx = %transaction_hash, "Product deleted on chain.");
    Ok(TxReceipt {
      success: true,
      transaction_hash,
    })
  }

  async fn get_product(&self, product_id: &str) -> SyncResult<Option<ChainProduct>> {
    let id = parse_id("product id", product_id)?;
    let provider = self.read_provider();
    let shop = ClothingShop::new(self.config.shop_address, &provider);

    let product = match shop.getProduct(id).call().await {
      Ok(product) => product,
      // The contract reverts for ids it does not know.
      Err(e) if e.as_revert_data().is_some() => {
        debug!(product_id, "getProduct reverted; treating as absent.");
        return Ok(None);
      }
      Err(e) => return Err(SyncError::ChainCall(format!("getProduct({}): {}", id, e))),
    };

    // Deleted entries read back as the zero struct.
    if product.name.is_empty() && product.price.is_zero() {
      return Ok(None);
    }

    Ok(Some(ChainProduct {
      name: product.name,
      description: product.description,
      price: wei_to_display(product.price)?,
      image_url: product.imageUrl,
      category_code: saturating_u64(product.category),
      is_available: product.isAvailable,
      stock: saturating_u64(product.stock),
    }))
  }

  async fn get_all_product_ids(&self) -> SyncResult<Vec<String>> {
    let provider = self.read_provider();
    let shop = ClothingShop::new(self.config.shop_address, &provider);
    let ids = shop
      .getAllProductIds()
      .call()
      .await
      .map_err(|e| SyncError::ChainCall(format!("getAllProductIds: {}", e)))?;
    Ok(ids.into_iter().map(|id| id.to_string()).collect())
  }

  async fn get_product_ids_by_page(&self, offset: u64, limit: u64) -> SyncResult<Vec<String>> {
    let provider = self.read_provider();
    let shop = ClothingShop::new(self.config.shop_address, &provider);
    let ids = shop
      .getProductIdsByPage(U256::from(offset), U256::from(limit))
      .call()
      .await
      .map_err(|e| SyncError::ChainCall(format!("getProductIdsByPage({}, {}): {}", offset, limit, e)))?;
    Ok(ids.into_iter().map(|id| id.to_string()).collect())
  }

  async fn get_nft(&self, token_id: &str) -> SyncResult<Nft> {
    let id = parse_id("token id", token_id)?;
    let provider = self.read_provider();
    self.fetch_nft(&provider, id).await
  }

  #[instrument(name = "chain::get_user_nfts", skip(self))]
  async fn get_user_nfts(&self, address: &str) -> SyncResult<Vec<Nft>> {
    let owner: Address = parse_address("owner", address)?;
    let provider = self.read_provider();
    let nft = ClothingNFT::new(self.config.nft_address, &provider);

    let total_supply = nft
      .totalSupply()
      .call()
      .await
      .map_err(|e| SyncError::ChainCall(format!("totalSupply: {}", e)))?;
    let total = saturating_u64(total_supply);
    debug!(total, "Scanning token ownership.");

    let mut owned = Vec::new();
    for token in 1..=total {
      let token_id = U256::from(token);
      match nft.ownerOf(token_id).call().await {
        Ok(token_owner) if token_owner == owner => match self.fetch_nft(&provider, token_id).await {
          Ok(found) => owned.push(found),
          Err(e) => warn!(token, error = %e, "Skipping token whose details could not be read."),
        },
        Ok(_) => {}
        // Burned or never-minted ids revert on ownerOf.
        Err(e) => debug!(token, error = %e, "Skipping token without an owner."),
      }
    }

    Ok(owned)
  }

  async fn category_name(&self, type_code: u64) -> String {
    self.categories.category_name(type_code).await
  }

  fn signer_address(&self) -> String {
    self.config.signer.address().to_checksum(None)
  }
}
