//! Products domain module.
//!
//! This crate owns the business rules for the product catalog: the entity, the
//! persistence contract it is stored through, boundary validation and the
//! domain service that every outer layer (HTTP, CLI, ...) calls into.
//! It performs no IO of its own.

pub mod product;
pub mod repository;
pub mod service;
pub mod validation;

pub use product::{NewProduct, NewProductRecord, Product, ProductPage, ProductPatch, ProductQuery};
pub use repository::{ProductRepository, RepositoryError};
pub use service::{ProductService, DEFAULT_LIMIT, DEFAULT_PAGE};
