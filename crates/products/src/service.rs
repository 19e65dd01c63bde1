//! Product domain service.
//!
//! Each operation is a stateless validate-then-delegate pipeline over a
//! [`ProductRepository`]. Checks run in a fixed order (existence, blank text,
//! uniqueness, then numeric ranges) and every mutation re-resolves the row
//! first so a vanished product surfaces as `NotFound`. Nothing reaches the
//! gateway that would break a stored product's invariants.
//!
//! SKU uniqueness is checked optimistically: no lock is held between the
//! lookup and the write. The gateway's storage-level constraint is the
//! authoritative guard, and its `DuplicateSku` report maps to the same
//! `Conflict` kind as the early check.

use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use stockroom_core::{DomainError, DomainResult, ProductId};

use crate::product::{NewProduct, NewProductRecord, Product, ProductPage, ProductPatch, ProductQuery};
use crate::repository::{ProductRepository, RepositoryError};
use crate::validation::has_valid_scale;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone)]
pub struct ProductService<R> {
    repo: R,
}

impl<R> ProductService<R>
where
    R: ProductRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub async fn create(&self, input: NewProduct) -> DomainResult<Product> {
        check_text("Name", &input.name)?;
        check_text("SKU", &input.sku)?;

        let existing = self
            .repo
            .find_by_sku(&input.sku)
            .await
            .map_err(|e| map_repository_error("create", e))?;
        if existing.is_some() {
            debug!(sku = %input.sku, "create rejected: sku taken");
            return Err(sku_conflict(&input.sku));
        }

        check_price(input.price)?;
        if let Some(quantity) = input.quantity {
            check_quantity(quantity)?;
        }

        let record = NewProductRecord::from(input);
        let created = self
            .repo
            .create(record)
            .await
            .map_err(|e| map_repository_error("create", e))?;

        debug!(product_id = %created.id, sku = %created.sku, "product created");
        Ok(created)
    }

    pub async fn find_page(&self, query: ProductQuery) -> DomainResult<ProductPage> {
        let page = query.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let limit = query.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT);
        let search = query.search.as_deref().filter(|s| !s.is_empty());

        let (items, total) = self
            .repo
            .find_page(search, page, limit)
            .await
            .map_err(|e| map_repository_error("find_page", e))?;

        Ok(ProductPage {
            items,
            total,
            page,
            limit,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> DomainResult<Product> {
        let id = ProductId::new(id)?;
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| map_repository_error("find_by_id", e))?
            .ok_or_else(|| DomainError::not_found(format!("Product with ID {id} not found")))
    }

    pub async fn update(&self, id: i64, patch: ProductPatch) -> DomainResult<Product> {
        let existing = self.find_by_id(id).await?;
        if patch.is_empty() {
            return Ok(existing);
        }

        if let Some(name) = &patch.name {
            check_text("Name", name)?;
        }
        if let Some(sku) = &patch.sku {
            check_text("SKU", sku)?;
        }

        if let Some(sku) = patch.sku.as_deref().filter(|s| *s != existing.sku) {
            let holder = self
                .repo
                .find_by_sku(sku)
                .await
                .map_err(|e| map_repository_error("update", e))?;
            if holder.is_some_and(|p| p.id != existing.id) {
                debug!(product_id = %existing.id, sku, "update rejected: sku taken");
                return Err(sku_conflict(sku));
            }
        }

        if let Some(price) = patch.price {
            check_price(price)?;
        }
        if let Some(quantity) = patch.quantity {
            check_quantity(quantity)?;
        }

        let updated = self
            .repo
            .update(existing.id, patch)
            .await
            .map_err(|e| map_repository_error("update", e))?;

        match updated {
            Some(p) => Ok(p),
            None => {
                warn!(product_id = %existing.id, "product vanished before update");
                Err(DomainError::not_found(format!(
                    "Failed to update product with ID {}",
                    existing.id
                )))
            }
        }
    }

    pub async fn remove(&self, id: i64) -> DomainResult<()> {
        let existing = self.find_by_id(id).await?;

        let deleted = self
            .repo
            .remove(existing.id)
            .await
            .map_err(|e| map_repository_error("remove", e))?;
        if !deleted {
            warn!(product_id = %existing.id, "product vanished before delete");
            return Err(DomainError::not_found(format!(
                "Failed to delete product with ID {}",
                existing.id
            )));
        }

        debug!(product_id = %existing.id, "product removed");
        Ok(())
    }
}

fn check_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_argument(format!("{field} must not be empty")));
    }
    Ok(())
}

fn check_price(price: Decimal) -> DomainResult<()> {
    if price <= Decimal::ZERO {
        return Err(DomainError::invalid_argument("Price must be positive"));
    }
    if !has_valid_scale(price) {
        return Err(DomainError::invalid_argument(
            "Price must have at most 2 decimal places",
        ));
    }
    Ok(())
}

fn check_quantity(quantity: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::invalid_argument("Quantity cannot be negative"));
    }
    Ok(())
}

fn sku_conflict(sku: &str) -> DomainError {
    DomainError::conflict(format!("Product with SKU '{sku}' already exists"))
}

fn map_repository_error(operation: &'static str, err: RepositoryError) -> DomainError {
    match err {
        RepositoryError::DuplicateSku(sku) => sku_conflict(&sku),
        RepositoryError::Backend(detail) => {
            error!(operation, %detail, "product storage failure");
            DomainError::storage("product storage is unavailable")
        }
    }
}
