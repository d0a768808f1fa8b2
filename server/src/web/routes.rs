// threadmint_server/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::state::AppState;
use crate::web::handlers::{nft_handlers, product_handlers};

async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({
    "status": "ok",
    "hotCache": app_state.sync.hot_cache().is_connected(),
    "categorySource": app_state.config.category_source.as_str()
  }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/shop")
          .service(
            web::scope("/products")
              .route("", web::get().to(product_handlers::list_products_handler))
              .route("", web::post().to(product_handlers::create_product_handler))
              .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
              .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler))
              .route(
                "/{product_id}/purchase",
                web::post().to(product_handlers::purchase_product_handler),
              ),
          )
          .route(
            "/chain/products",
            web::get().to(product_handlers::list_chain_products_handler),
          )
          .route("/nfts/{token_id}", web::get().to(nft_handlers::get_nft_handler))
          .service(
            web::scope("/users/{address}")
              .route("/nfts", web::get().to(nft_handlers::get_user_nfts_handler))
              .route(
                "/transactions",
                web::get().to(nft_handlers::get_user_transactions_handler),
              ),
          ),
      ),
  );
}
