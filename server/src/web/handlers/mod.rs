// threadmint_server/src/web/handlers/mod.rs

pub mod nft_handlers;
pub mod product_handlers;
