// threadmint_server/src/state.rs
use crate::config::AppConfig;
use std::sync::Arc;
use threadmint::ProductSync;

#[derive(Clone)]
pub struct AppState {
  pub sync: Arc<ProductSync>,
  pub config: Arc<AppConfig>,
}
