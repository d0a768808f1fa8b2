// threadmint/src/sql_cache.rs

//! Relational read cache of chain products.
//!
//! Filter values only ever reach SQL through bound parameters; the WHERE clause is
//! assembled from fixed fragments.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};

use crate::error::SyncResult;
use crate::models::{Pagination, Product, ProductPage, ProductQuery, ProductRecord};
use crate::store::ProductStore;

const PRODUCT_COLUMNS: &str =
  "product_id, name, description, price, image_url, category, is_available, stock, created_at, updated_at";

#[async_trait]
pub trait ProductCache: ProductStore {
  /// Whether the table has ever been populated.
  async fn has_products(&self) -> SyncResult<bool>;

  async fn count_products(&self) -> SyncResult<i64>;

  async fn list_products(&self, query: &ProductQuery) -> SyncResult<ProductPage>;

  /// Inserts or overwrites every mutable field of the row keyed by `product_id`,
  /// bumping `updated_at`.
  async fn upsert_product(&self, record: &ProductRecord) -> SyncResult<Product>;

  /// Hard delete. Returns whether a row existed.
  async fn delete_product(&self, product_id: &str) -> SyncResult<bool>;
}

#[derive(FromRow)]
struct ListedProduct {
  #[sqlx(flatten)]
  product: Product,
  total_count: i64,
}

/// Builds the listing statement for `query`. Exposed for inspection in tests.
pub fn build_list_query(query: &ProductQuery) -> QueryBuilder<'static, Postgres> {
  let mut qb = QueryBuilder::new("SELECT ");
  qb.push(PRODUCT_COLUMNS);
  qb.push(", COUNT(*) OVER() AS total_count FROM products WHERE 1=1");

  push_filters(&mut qb, query);

  qb.push(" ORDER BY created_at DESC, product_id ASC LIMIT ");
  qb.push_bind(query.limit);
  qb.push(" OFFSET ");
  qb.push_bind(query.offset());
  qb
}

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, query: &ProductQuery) {
  if let Some(search) = &query.search {
    let pattern = format!("%{}%", escape_like(search));
    qb.push(" AND (name ILIKE ");
    qb.push_bind(pattern.clone());
    qb.push(" OR description ILIKE ");
    qb.push_bind(pattern);
    qb.push(")");
  }

  if let Some(category) = &query.category {
    qb.push(" AND category = ");
    qb.push_bind(category.clone());
  }
}

/// Makes `%`, `_` and `\` in user input match literally (backslash is the
/// default LIKE escape in Postgres).
fn escape_like(input: &str) -> String {
  let mut escaped = String::with_capacity(input.len());
  for ch in input.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(ch);
  }
  escaped
}

#[derive(Debug, Clone)]
pub struct PgProductCache {
  pool: PgPool,
}

impl PgProductCache {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

#[async_trait]
impl ProductStore for PgProductCache {
  async fn fetch_product(&self, product_id: &str) -> SyncResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products WHERE product_id = $1",
      PRODUCT_COLUMNS
    ))
    .bind(product_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(product)
  }
}

#[async_trait]
impl ProductCache for PgProductCache {
  async fn has_products(&self) -> SyncResult<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products)")
      .fetch_one(&self.pool)
      .await?;
    Ok(exists)
  }

  async fn count_products(&self) -> SyncResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }

  #[instrument(name = "sql_cache::list_products", skip(self), err(Display))]
  async fn list_products(&self, query: &ProductQuery) -> SyncResult<ProductPage> {
    let mut qb = build_list_query(query);
    let rows: Vec<ListedProduct> = qb.build_query_as().fetch_all(&self.pool).await?;

    // The window total is repeated on every row; an empty page means either no
    // matches or a page past the end, so fall back to a plain count in that case.
    let total = match rows.first() {
      Some(row) => row.total_count,
      None if query.page > 1 => self.count_matching(query).await?,
      None => 0,
    };
    debug!(returned = rows.len(), total, "Listed products from SQL cache.");

    Ok(ProductPage {
      products: rows.into_iter().map(|r| r.product).collect(),
      pagination: Pagination::new(query.page, query.limit, total),
    })
  }

  async fn upsert_product(&self, record: &ProductRecord) -> SyncResult<Product> {
    let product = sqlx::query_as::<_, Product>(&format!(
      r#"
      INSERT INTO products (
        product_id, name, description, price, image_url, category,
        is_available, stock, created_at, updated_at
      ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
      ON CONFLICT (product_id) DO UPDATE SET
        name = EXCLUDED.name,
        description = EXCLUDED.description,
        price = EXCLUDED.price,
        image_url = EXCLUDED.image_url,
        category = EXCLUDED.category,
        is_available = EXCLUDED.is_available,
        stock = EXCLUDED.stock,
        updated_at = NOW()
      RETURNING {}
      "#,
      PRODUCT_COLUMNS
    ))
    .bind(&record.product_id)
    .bind(&record.name)
    .bind(&record.description)
    .bind(record.price)
    .bind(&record.image_url)
    .bind(&record.category)
    .bind(record.is_available)
    .bind(record.stock.max(0))
    .fetch_one(&self.pool)
    .await?;
    Ok(product)
  }

  async fn delete_product(&self, product_id: &str) -> SyncResult<bool> {
    let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
      .bind(product_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}

impl PgProductCache {
  async fn count_matching(&self, query: &ProductQuery) -> SyncResult<i64> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1=1");
    push_filters(&mut qb, query);
    let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
    Ok(count)
  }
}
