// threadmint_server/src/main.rs

mod config;
mod errors;
mod state;
mod web;

use crate::config::{AppConfig, CategorySource};
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use threadmint::{
  CategoryResolver, EvmChainReader, HotCache, PgCategories, PgProductCache, PgTransactionLog, ProductSync,
  StaticCategories,
};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting threadmint server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  let db_pool = match PgPoolOptions::new()
    .max_connections(app_config.database_max_connections)
    .connect(&app_config.database_url)
    .await
  {
    Ok(pool) => {
      tracing::info!("Successfully connected to the database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  if app_config.run_migrations {
    if let Err(e) = sqlx::migrate!("./migrations").run(&db_pool).await {
      tracing::error!(error = %e, "Failed to run database migrations.");
      return Err(std::io::Error::other(e.to_string()));
    }
    tracing::info!("Database migrations applied.");
  }

  let hot_cache = Arc::new(match &app_config.redis_url {
    Some(url) => HotCache::connect(url).await,
    None => {
      tracing::info!("REDIS_URL not set; running without a hot cache.");
      HotCache::disabled()
    }
  });

  let categories: Arc<dyn CategoryResolver> = match app_config.category_source {
    CategorySource::Static => Arc::new(StaticCategories::default()),
    CategorySource::Database => Arc::new(PgCategories::new(db_pool.clone())),
  };

  let chain = match EvmChainReader::new(app_config.chain.clone(), categories) {
    Ok(reader) => reader,
    Err(e) => {
      tracing::error!(error = %e, "Invalid chain configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };
  match chain.chain_id().await {
    Ok(chain_id) => tracing::info!(chain_id, "Chain RPC reachable."),
    Err(e) => tracing::warn!(error = %e, "Chain RPC not reachable yet; requests will fail until it is."),
  }

  let sync = ProductSync::new(
    Arc::new(chain),
    Arc::new(PgProductCache::new(db_pool.clone())),
    hot_cache.clone(),
  )
  .with_ledger(Arc::new(PgTransactionLog::new(db_pool.clone())))
  .with_ttl(app_config.cache_ttl);

  let app_state = AppState {
    sync: Arc::new(sync),
    config: app_config.clone(),
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  let result = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await;

  hot_cache.close();
  db_pool.close().await;
  tracing::info!("Server stopped.");
  result
}
