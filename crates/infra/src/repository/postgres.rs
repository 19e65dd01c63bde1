//! Postgres-backed product repository.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) on insert/update | `23505` | `DuplicateSku` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / PoolTimedOut / Io / ... | N/A | `Backend` |
//!
//! The `products_sku_key` unique constraint is the authoritative SKU guard:
//! the service's lookup-then-write check can race, the constraint cannot.
//!
//! ## Thread Safety
//!
//! `PostgresProductRepository` is `Send + Sync`; the SQLx pool handles
//! connection sharing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{instrument, Span};

use stockroom_core::ProductId;
use stockroom_products::repository::page_offset;
use stockroom_products::{NewProductRecord, Product, ProductPatch, ProductRepository, RepositoryError};

use crate::config::DatabaseConfig;

/// Idempotent DDL for the `products` table.
pub const SCHEMA: &str = include_str!("../../migrations/0001_create_products.sql");

const COLUMNS: &str = "id, name, sku, price, quantity, created_at";

#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: Arc<PgPool>,
}

impl PostgresProductRepository {
    /// Create a new repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let options = config
            .connect_options()
            .map_err(|e| RepositoryError::Backend(e.to_string()))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply [`SCHEMA`]. Safe to run on every start.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self, record), fields(sku = %record.sku), err)]
    async fn create(&self, record: NewProductRecord) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products (name, sku, price, quantity) VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&record.name)
            .bind(&record.sku)
            .bind(record.price)
            .bind(record.quantity)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_write_error("create", &record.sku, e))?;

        let product = ProductRow::try_from_row(&row)
            .map_err(|e| map_sqlx_error("create", e))?
            .into();
        Ok(product)
    }

    #[instrument(skip(self), fields(row_count = tracing::field::Empty), err)]
    async fn find_page(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let pattern = search.map(|s| format!("%{}%", escape_like(s)));
        let offset = i64::try_from(page_offset(page, limit)).unwrap_or(i64::MAX);

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM products
            WHERE ($1::TEXT IS NULL OR name ILIKE $1 ESCAPE '\')
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&*self.pool)
        .await
        .and_then(|row| row.try_get("total"))
        .map_err(|e| map_sqlx_error("find_page", e))?;

        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM products
            WHERE ($1::TEXT IS NULL OR name ILIKE $1 ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(pattern.as_deref())
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_page", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let product = ProductRow::try_from_row(row).map_err(|e| map_sqlx_error("find_page", e))?;
            items.push(product.into());
        }

        Span::current().record("row_count", items.len());
        Ok((items, total.max(0) as u64))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;
        decode_optional("find_by_id", row)
    }

    #[instrument(skip(self), err)]
    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM products WHERE sku = $1");
        let row = sqlx::query(&sql)
            .bind(sku)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_sku", e))?;
        decode_optional("find_by_sku", row)
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE products SET
                name     = COALESCE($2, name),
                sku      = COALESCE($3, sku),
                price    = COALESCE($4, price),
                quantity = COALESCE($5, quantity)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let sku = patch.sku.clone().unwrap_or_default();
        let row = sqlx::query(&sql)
            .bind(id.get())
            .bind(patch.name)
            .bind(patch.sku)
            .bind(patch.price)
            .bind(patch.quantity)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_write_error("update", &sku, e))?;
        decode_optional("update", row)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn remove(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn decode_optional(operation: &str, row: Option<PgRow>) -> Result<Option<Product>, RepositoryError> {
    row.map(|r| ProductRow::try_from_row(&r).map(Product::from))
        .transpose()
        .map_err(|e| map_sqlx_error(operation, e))
}

/// Escape `LIKE` metacharacters so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Like [`map_sqlx_error`], but a unique violation names the SKU being written.
fn map_write_error(operation: &str, sku: &str, err: sqlx::Error) -> RepositoryError {
    if is_unique_violation(&err) {
        return RepositoryError::DuplicateSku(sku.to_string());
    }
    map_sqlx_error(operation, err)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            RepositoryError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            RepositoryError::Backend(format!("connection pool timed out in {}", operation))
        }
        sqlx::Error::RowNotFound => {
            // Queries use fetch_optional/fetch_all, so this is unexpected.
            RepositoryError::Backend(format!("unexpected row not found in {}", operation))
        }
        _ => RepositoryError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[derive(Debug)]
struct ProductRow {
    id: i64,
    name: String,
    sku: String,
    price: Decimal,
    quantity: i64,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn try_from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from_storage(row.id),
            name: row.name,
            sku: row.sku,
            price: row.price,
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Laptop"), "Laptop");
    }

    #[test]
    fn pool_errors_map_to_backend() {
        assert!(matches!(
            map_sqlx_error("find_by_id", sqlx::Error::PoolClosed),
            RepositoryError::Backend(_)
        ));
        assert!(matches!(
            map_sqlx_error("find_by_id", sqlx::Error::PoolTimedOut),
            RepositoryError::Backend(_)
        ));
    }

    #[test]
    fn row_not_found_is_not_a_duplicate() {
        let err = map_write_error("create", "SKU1", sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Backend(_)));
    }

    #[test]
    fn schema_declares_unique_sku() {
        assert!(SCHEMA.contains("UNIQUE (sku)"));
        assert!(SCHEMA.contains("CHECK (price > 0)"));
        assert!(SCHEMA.contains("CHECK (quantity >= 0)"));
    }
}
