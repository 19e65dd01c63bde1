use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use stockroom_core::Violations;
use stockroom_products::{NewProduct, Product, ProductPage, ProductPatch, ProductQuery};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: Option<i64>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(req: CreateProductRequest) -> Self {
        NewProduct {
            name: req.name,
            sku: req.sku,
            price: req.price,
            quantity: req.quantity,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(req: UpdateProductRequest) -> Self {
        ProductPatch {
            name: req.name,
            sku: req.sku,
            price: req.price,
            quantity: req.quantity,
        }
    }
}

/// Raw query string; numbers are parsed here so bad input yields field
/// violations instead of a bare extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListProductsQuery {
    pub fn into_query(self) -> Result<ProductQuery, Violations> {
        let mut v = Violations::new();
        let page = parse_positive(&mut v, "page", self.page.as_deref());
        let limit = parse_positive(&mut v, "limit", self.limit.as_deref());
        v.into_result()?;

        Ok(ProductQuery {
            search: self.search,
            page,
            limit,
        })
    }
}

fn parse_positive(v: &mut Violations, field: &str, raw: Option<&str>) -> Option<u32> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<i64>() {
        Ok(n) if n < 1 => {
            v.push(field, format!("{field} must not be less than 1"));
            None
        }
        Ok(n) => match u32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                v.push(field, format!("{field} is too large"));
                None
            }
        },
        Err(_) => {
            v.push(field, format!("{field} must be an integer number"));
            None
        }
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.get(),
        "name": p.name,
        "sku": p.sku,
        "price": p.price.to_f64(),
        "quantity": p.quantity,
        "createdAt": p.created_at.to_rfc3339(),
    })
}

pub fn page_to_json(page: ProductPage) -> serde_json::Value {
    serde_json::json!({
        "products": page.items.into_iter().map(product_to_json).collect::<Vec<_>>(),
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
    })
}
