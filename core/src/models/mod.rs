//! Data structures shared by every cache tier and the chain reader.

pub mod nft;
pub mod product;
pub mod query;
pub mod receipt;
pub mod transaction;

pub use nft::{Nft, NftProductInfo};
pub use product::{ChainProduct, NewProduct, Product, ProductRecord};
pub use query::{Pagination, ProductPage, ProductQuery, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
pub use receipt::{AddProductReceipt, PurchaseReceipt, TxReceipt};
pub use transaction::{NewTransaction, TransactionKind, TransactionRecord, TransactionStatus};
