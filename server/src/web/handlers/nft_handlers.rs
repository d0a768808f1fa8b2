// threadmint_server/src/web/handlers/nft_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use threadmint::models::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
use tracing::{info, instrument};

use crate::errors::{AppError, Result};
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct HistoryQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

#[instrument(name = "handler::get_nft", skip(app_state, path), fields(token_id = %path.as_ref()))]
pub async fn get_nft_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
  let nft = app_state.sync.get_nft(&path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "NFT fetched successfully.",
      "nft": nft
  })))
}

#[instrument(name = "handler::get_user_nfts", skip(app_state, path), fields(address = %path.as_ref()))]
pub async fn get_user_nfts_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
  let nfts = app_state.sync.get_user_nfts(&path.into_inner()).await?;
  info!("Found {} NFTs for wallet.", nfts.len());
  Ok(HttpResponse::Ok().json(json!({
      "message": "User NFTs fetched successfully.",
      "nfts": nfts
  })))
}

#[instrument(name = "handler::get_user_transactions", skip(app_state, path, query), fields(address = %path.as_ref()))]
pub async fn get_user_transactions_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query: web::Query<HistoryQuery>,
) -> Result<HttpResponse> {
  let page = query.page.unwrap_or(DEFAULT_PAGE);
  let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
  if page < 1 || !(1..=MAX_LIMIT).contains(&limit) {
    return Err(AppError::Validation(format!(
      "page must be >= 1 and limit between 1 and {}",
      MAX_LIMIT
    )));
  }

  let transactions = app_state.sync.wallet_transactions(&path.into_inner(), page, limit).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Transactions fetched successfully.",
      "transactions": transactions
  })))
}
