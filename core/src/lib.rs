// src/lib.rs

//! Threadmint: a chain-backed clothing catalog with cache-aside reads.
//!
//! The shop contract is the system of record. Reads are served from up to three
//! tiers, each behind the [`ProductStore`] contract:
//!  - [`HotCache`]: optional key-value store (Redis or in-process) with TTLs.
//!  - [`PgProductCache`]: Postgres copy of chain products for filtered, paginated reads.
//!  - [`ChainCatalog`]: the contract itself, through a [`ChainGateway`].
//!
//! [`ProductSync`] arbitrates between them and orchestrates chain writes.

pub mod category;
pub mod chain;
pub mod error;
pub mod hot_cache;
pub mod models;
pub mod sql_cache;
pub mod store;
pub mod sync;
pub mod transactions;

pub use crate::category::{CategoryResolver, PgCategories, StaticCategories, UNKNOWN_CATEGORY};
pub use crate::chain::{ChainCatalog, ChainConfig, ChainGateway, EvmChainReader};
pub use crate::error::{SyncError, SyncResult};
pub use crate::hot_cache::{CacheTtl, HotCache, KvBackend, MemoryKvBackend, RedisBackend};
pub use crate::sql_cache::{PgProductCache, ProductCache};
pub use crate::store::ProductStore;
pub use crate::sync::{ProductSync, SyncReport};
pub use crate::transactions::{PgTransactionLog, TransactionLog};
