//! Strongly-typed identifiers used across the domain.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a product.
///
/// Storage assigns ids from a monotonically increasing sequence, so a valid id
/// is always strictly positive. Construction from a raw integer enforces that.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Validate a raw identifier supplied by a caller.
    pub fn new(raw: i64) -> Result<Self, DomainError> {
        if raw <= 0 {
            return Err(DomainError::invalid_argument("Invalid product ID"));
        }
        Ok(Self(raw))
    }

    /// Wrap an identifier that storage just handed back.
    ///
    /// Storage sequences start at 1; this does not re-validate.
    pub fn from_storage(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_rejected() {
        assert!(matches!(ProductId::new(0), Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn serializes_as_bare_integer() {
        let id = ProductId::new(9).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
    }

    proptest! {
        #[test]
        fn non_positive_ids_are_invalid(raw in i64::MIN..=0i64) {
            prop_assert!(matches!(ProductId::new(raw), Err(DomainError::InvalidArgument(_))));
        }

        #[test]
        fn positive_ids_keep_their_value(raw in 1i64..=i64::MAX) {
            let id = ProductId::new(raw).unwrap();
            prop_assert_eq!(id.get(), raw);
            prop_assert_eq!(id.to_string(), raw.to_string());
        }
    }
}
