//! Boundary validation.
//!
//! These checks run at the edge (HTTP handlers, CLIs) before
//! [`ProductService`](crate::ProductService) is invoked and report every
//! offending field at once. The service repeats every check itself (failing
//! on the first), so skipping this layer never lets an invalid product into
//! storage.

use rust_decimal::Decimal;

use stockroom_core::Violations;

use crate::product::{NewProduct, ProductPatch, ProductQuery};

/// Maximum number of fractional digits a price may carry.
pub const PRICE_SCALE: u32 = 2;

pub fn validate_new_product(input: &NewProduct) -> Result<(), Violations> {
    let mut v = Violations::new();
    check_name(&mut v, &input.name);
    check_sku(&mut v, &input.sku);
    check_price(&mut v, input.price);
    if let Some(quantity) = input.quantity {
        check_quantity(&mut v, quantity);
    }
    v.into_result()
}

pub fn validate_patch(patch: &ProductPatch) -> Result<(), Violations> {
    let mut v = Violations::new();
    if let Some(name) = &patch.name {
        check_name(&mut v, name);
    }
    if let Some(sku) = &patch.sku {
        check_sku(&mut v, sku);
    }
    if let Some(price) = patch.price {
        check_price(&mut v, price);
    }
    if let Some(quantity) = patch.quantity {
        check_quantity(&mut v, quantity);
    }
    v.into_result()
}

pub fn validate_query(query: &ProductQuery) -> Result<(), Violations> {
    let mut v = Violations::new();
    v.check(query.page == Some(0), "page", "page must not be less than 1");
    v.check(query.limit == Some(0), "limit", "limit must not be less than 1");
    v.into_result()
}

/// Whether `price` has at most [`PRICE_SCALE`] significant fractional digits.
pub fn has_valid_scale(price: Decimal) -> bool {
    price.normalize().scale() <= PRICE_SCALE
}

fn check_name(v: &mut Violations, name: &str) {
    v.check(name.trim().is_empty(), "name", "name should not be empty");
}

fn check_sku(v: &mut Violations, sku: &str) {
    v.check(sku.trim().is_empty(), "sku", "sku should not be empty");
}

fn check_price(v: &mut Violations, price: Decimal) {
    v.check(
        price <= Decimal::ZERO,
        "price",
        "price must be a positive number",
    );
    v.check(
        !has_valid_scale(price),
        "price",
        "price must have at most 2 decimal places",
    );
}

fn check_quantity(v: &mut Violations, quantity: i64) {
    v.check(quantity < 0, "quantity", "Quantity cannot be negative");
}
