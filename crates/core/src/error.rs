//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is terminal for the operation that produced it; callers do
/// not retry. Messages name the offending field, id or SKU so they can be
/// surfaced to API clients verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller input was malformed or out of range (id <= 0, price <= 0, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The entity does not exist, or vanished between check and write.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage failed for a reason unrelated to the request.
    ///
    /// The message is deliberately generic; the underlying cause is logged
    /// where it happens and never returned to callers.
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// The human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m) | Self::NotFound(m) | Self::Conflict(m) | Self::Storage(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = DomainError::conflict("Product with SKU 'SKU123' already exists");
        assert_eq!(
            err.to_string(),
            "conflict: Product with SKU 'SKU123' already exists"
        );
    }

    #[test]
    fn message_strips_kind_prefix() {
        let err = DomainError::not_found("Product with ID 7 not found");
        assert_eq!(err.message(), "Product with ID 7 not found");
    }
}
