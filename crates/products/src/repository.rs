//! Persistence contract for products.
//!
//! Implementations translate each call into storage reads/writes against a
//! single table and report plain records, `None` or `bool` sentinels. They own
//! no business rules: which error kind a caller sees is decided by
//! [`ProductService`](crate::ProductService) alone.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::ProductId;

use crate::product::{NewProductRecord, Product, ProductPatch};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Storage refused the write because another row already holds the SKU.
    #[error("duplicate sku: {0}")]
    DuplicateSku(String),

    /// Any other storage failure (connection, protocol, decoding, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new row; storage assigns `id` and `created_at`.
    async fn create(&self, record: NewProductRecord) -> Result<Product, RepositoryError>;

    /// Products whose name contains `search` (all products when `None`),
    /// newest first, sliced to `page`/`limit`, plus the unpaged match count.
    ///
    /// `page` is 1-based.
    async fn find_page(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Product>, u64), RepositoryError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError>;

    /// Apply the supplied fields; `None` when no row has `id`.
    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError>;

    /// `true` iff a row was actually deleted.
    async fn remove(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

#[async_trait]
impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    async fn create(&self, record: NewProductRecord) -> Result<Product, RepositoryError> {
        (**self).create(record).await
    }

    async fn find_page(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        (**self).find_page(search, page, limit).await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        (**self).find_by_sku(sku).await
    }

    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        (**self).update(id, patch).await
    }

    async fn remove(&self, id: ProductId) -> Result<bool, RepositoryError> {
        (**self).remove(id).await
    }
}

/// Number of rows to skip for a 1-based `page`.
///
/// Page 0 is treated like page 1 rather than underflowing.
pub fn page_offset(page: u32, limit: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(limit)
}
