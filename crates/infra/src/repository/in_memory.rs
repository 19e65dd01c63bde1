use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::ProductId;
use stockroom_products::repository::page_offset;
use stockroom_products::{NewProductRecord, Product, ProductPatch, ProductRepository, RepositoryError};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<ProductId, Product>,
    last_id: i64,
}

impl Table {
    fn sku_holder(&self, sku: &str) -> Option<&Product> {
        self.rows.values().find(|p| p.sku == sku)
    }
}

/// In-memory product table for tests/dev.
///
/// Mirrors the relational schema's guarantees: ids come from a sequence and
/// are never reused, and the SKU column is unique (writes that would break
/// that report `DuplicateSku`, like a unique index would).
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    inner: RwLock<Table>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Backend("lock poisoned".to_string())
}

fn name_matches(name: &str, needle_lower: &str) -> bool {
    name.to_lowercase().contains(needle_lower)
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, record: NewProductRecord) -> Result<Product, RepositoryError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;

        if table.sku_holder(&record.sku).is_some() {
            return Err(RepositoryError::DuplicateSku(record.sku));
        }

        table.last_id += 1;
        let id = ProductId::from_storage(table.last_id);
        let product = Product {
            id,
            name: record.name,
            sku: record.sku,
            price: record.price,
            quantity: record.quantity,
            created_at: Utc::now(),
        };
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn find_page(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        let needle = search.map(str::to_lowercase);

        let mut matches: Vec<&Product> = table
            .rows
            .values()
            .filter(|p| needle.as_deref().is_none_or(|n| name_matches(&p.name, n)))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matches.len() as u64;
        let skip = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        let items = matches
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.sku_holder(sku).cloned())
    }

    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;

        if let Some(sku) = &patch.sku {
            if table.sku_holder(sku).is_some_and(|p| p.id != id) {
                return Err(RepositoryError::DuplicateSku(sku.clone()));
            }
        }

        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        *row = row.patched(&patch);
        Ok(Some(row.clone()))
    }

    async fn remove(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        Ok(table.rows.remove(&id).is_some())
    }
}
