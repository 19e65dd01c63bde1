//! `stockroom-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use validation::{FieldViolation, Violations};
