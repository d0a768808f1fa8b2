// threadmint_server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use threadmint::hot_cache::CacheTtl;
use threadmint::ChainConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySource {
  Static,
  Database,
}

impl CategorySource {
  pub fn as_str(&self) -> &'static str {
    match self {
      CategorySource::Static => "static",
      CategorySource::Database => "database",
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub run_migrations: bool,

  /// `None` runs without a hot cache.
  pub redis_url: Option<String>,
  pub cache_ttl: CacheTtl,

  pub chain: ChainConfig,
  pub category_source: CategorySource,
}

fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    Some(value) => value
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
    None => Ok(default),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let optional = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = optional("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", optional("SERVER_PORT"), 8080u16)?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", optional("DATABASE_MAX_CONNECTIONS"), 10u32)?;
    let run_migrations = parse_var("RUN_MIGRATIONS", optional("RUN_MIGRATIONS"), true)?;

    let redis_url = optional("REDIS_URL");
    let cache_ttl = CacheTtl {
      list_secs: parse_var("LIST_CACHE_TTL_SECS", optional("LIST_CACHE_TTL_SECS"), CacheTtl::DEFAULT_LIST_SECS)?,
      item_secs: parse_var("ITEM_CACHE_TTL_SECS", optional("ITEM_CACHE_TTL_SECS"), CacheTtl::DEFAULT_ITEM_SECS)?,
    };

    let mut chain = ChainConfig::new(
      optional("CHAIN_RPC_URL").unwrap_or_else(|| "http://127.0.0.1:8545".to_string()),
      get_env("SHOP_CONTRACT_ADDRESS")?,
      get_env("NFT_CONTRACT_ADDRESS")?,
      get_env("CHAIN_PRIVATE_KEY")?,
    );
    chain.confirmations = parse_var("CHAIN_CONFIRMATIONS", optional("CHAIN_CONFIRMATIONS"), chain.confirmations)?;
    chain.receipt_timeout = Duration::from_secs(parse_var(
      "CHAIN_RECEIPT_TIMEOUT_SECS",
      optional("CHAIN_RECEIPT_TIMEOUT_SECS"),
      chain.receipt_timeout.as_secs(),
    )?);

    let category_source = match optional("CATEGORY_SOURCE").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("static") => CategorySource::Static,
      Some("database") => CategorySource::Database,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid CATEGORY_SOURCE '{}': expected 'static' or 'database'",
          other
        )))
      }
    };

    tracing::info!(
      server_host = %server_host,
      server_port,
      hot_cache = redis_url.is_some(),
      category_source = ?category_source,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      redis_url,
      cache_ttl,
      chain,
      category_source,
    })
  }
}
