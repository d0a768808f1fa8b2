// tests/category_tests.rs
mod common;
use common::*;
use threadmint::category::DEFAULT_CATEGORIES;
use threadmint::{CategoryResolver, ChainGateway, StaticCategories, UNKNOWN_CATEGORY};

#[tokio::test]
async fn default_table_resolves_every_seeded_code() {
  setup_tracing();
  let categories = StaticCategories::default();
  assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
  for (code, name) in DEFAULT_CATEGORIES {
    assert_eq!(categories.category_name(*code).await, *name);
  }
}

#[tokio::test]
async fn unmapped_codes_resolve_to_sentinel() {
  setup_tracing();
  let categories = StaticCategories::default();
  for code in [0, 16, 999, u64::MAX] {
    assert_eq!(categories.category_name(code).await, UNKNOWN_CATEGORY, "code {}", code);
  }
}

#[tokio::test]
async fn custom_table_replaces_defaults() {
  setup_tracing();
  let categories = StaticCategories::new([(1, "Capsule"), (40, "Archive")]);
  assert_eq!(categories.category_name(40).await, "Archive");
  assert_eq!(categories.category_name(2).await, UNKNOWN_CATEGORY);

  let empty = StaticCategories::new(Vec::<(u64, String)>::new());
  assert!(empty.is_empty());
  assert_eq!(empty.category_name(1).await, UNKNOWN_CATEGORY);
}

#[tokio::test]
async fn chain_gateway_delegates_category_lookup() {
  setup_tracing();
  let chain = FakeChain::default();
  assert_eq!(chain.category_name(14).await, "Streetwear");
  assert_eq!(chain.category_name(77).await, UNKNOWN_CATEGORY);
}
