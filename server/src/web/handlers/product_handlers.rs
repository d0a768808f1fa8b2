// threadmint_server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use threadmint::models::{NewProduct, ProductQuery, DEFAULT_LIMIT, DEFAULT_PAGE};
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result};
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
  pub search: Option<String>,
  pub category: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
  pub name: Option<String>,
  #[serde(default)]
  pub description: String,
  pub price: Option<Decimal>,
  #[serde(default)]
  pub image_url: String,
  pub category: Option<u64>,
  #[serde(default)]
  pub stock: u64,
}

impl CreateProductRequest {
  fn into_new_product(self) -> Result<NewProduct> {
    let name = self
      .name
      .map(|n| n.trim().to_string())
      .filter(|n| !n.is_empty())
      .ok_or_else(|| AppError::Validation("name is required".to_string()))?;
    let price = self
      .price
      .ok_or_else(|| AppError::Validation("price is required".to_string()))?;
    if price <= Decimal::ZERO {
      return Err(AppError::Validation("price must be greater than zero".to_string()));
    }
    let category = self
      .category
      .ok_or_else(|| AppError::Validation("category is required".to_string()))?;

    Ok(NewProduct {
      name,
      description: self.description,
      price,
      image_url: self.image_url,
      category,
      stock: self.stock,
    })
  }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
  pub buyer_address: Option<String>,
  pub price: Option<Decimal>,
  pub buyer_key: Option<String>,
}

#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse> {
  let params = query_params.into_inner();
  let query = ProductQuery::new(
    params.page.unwrap_or(DEFAULT_PAGE),
    params.limit.unwrap_or(DEFAULT_LIMIT),
    params.search.as_deref(),
    params.category.as_deref(),
  )?;

  let page = app_state.sync.get_all_products(&query).await?;
  info!("Fetched {} products.", page.products.len());

  Ok(HttpResponse::Ok().json(json!({
      "message": "Products fetched successfully.",
      "products": page.products,
      "pagination": page.pagination
  })))
}

#[derive(Deserialize, Debug)]
pub struct ChainListingQuery {
  pub offset: Option<u64>,
  pub limit: Option<u64>,
}

/// Live contract listing. Does not read or fill either cache.
#[instrument(name = "handler::list_chain_products", skip(app_state, query_params))]
pub async fn list_chain_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ChainListingQuery>,
) -> Result<HttpResponse> {
  let params = query_params.into_inner();
  let offset = params.offset.unwrap_or(0);
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT as u64);

  let products = app_state.sync.chain_products(offset, limit).await?;
  info!("Fetched {} products from chain.", products.len());

  Ok(HttpResponse::Ok().json(json!({
      "message": "Chain products fetched successfully.",
      "products": products,
      "offset": offset,
      "limit": limit
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
  let product_id = path.into_inner();

  match app_state.sync.get_product_by_id(&product_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(json!({
        "message": "Product fetched successfully.",
        "product": product
    }))),
    None => {
      warn!("Product {} not found.", product_id);
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}

#[instrument(name = "handler::create_product", skip(app_state, body))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
  let new_product = body.into_inner().into_new_product()?;
  let receipt = app_state.sync.add_product(new_product).await?;

  Ok(HttpResponse::Created().json(json!({
      "message": "Product added successfully.",
      "productId": receipt.product_id,
      "transactionHash": receipt.transaction_hash
  })))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  let receipt = app_state.sync.delete_product(&product_id).await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Product deleted successfully.",
      "transactionHash": receipt.transaction_hash
  })))
}

#[instrument(name = "handler::purchase_product", skip(app_state, path, body), fields(product_id = %path.as_ref()))]
pub async fn purchase_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  body: web::Json<PurchaseRequest>,
) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  let request = body.into_inner();
  let buyer_address = request
    .buyer_address
    .map(|a| a.trim().to_string())
    .filter(|a| !a.is_empty())
    .ok_or_else(|| AppError::Validation("buyerAddress is required".to_string()))?;
  let price = request
    .price
    .ok_or_else(|| AppError::Validation("price is required".to_string()))?;

  let receipt = app_state
    .sync
    .purchase_product(&product_id, &buyer_address, price, request.buyer_key.as_deref())
    .await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Product purchased successfully.",
      "tokenId": receipt.token_id,
      "transactionHash": receipt.transaction_hash
  })))
}
