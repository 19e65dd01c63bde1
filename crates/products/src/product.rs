use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::ProductId;

/// A stocked product.
///
/// `id` and `created_at` are assigned by storage and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Copy of `self` with every field present in `patch` applied.
    pub fn patched(&self, patch: &ProductPatch) -> Product {
        Product {
            id: self.id,
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            sku: patch.sku.clone().unwrap_or_else(|| self.sku.clone()),
            price: patch.price.unwrap_or(self.price),
            quantity: patch.quantity.unwrap_or(self.quantity),
            created_at: self.created_at,
        }
    }
}

/// Caller input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    /// Defaults to 0 when omitted.
    pub quantity: Option<i64>,
}

/// The fully-defaulted row the gateway persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductRecord {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub quantity: i64,
}

impl From<NewProduct> for NewProductRecord {
    fn from(input: NewProduct) -> Self {
        Self {
            name: input.name,
            sku: input.sku,
            price: input.price,
            quantity: input.quantity.unwrap_or(0),
        }
    }
}

/// Partial update: only `Some` fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.sku.is_none() && self.price.is_none() && self.quantity.is_none()
    }
}

/// Listing parameters. Absent (or zero) paging values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Substring matched against `name`.
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// One page of products plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}
