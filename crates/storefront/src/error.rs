//! Unified error handling for the storefront crate.
//!
//! Individual modules define errors close to their code (`CatalogError`,
//! `ProfileError`, `RatingError`, `CheckoutError`); this type unifies them
//! for hosts that want a single `Result` surface.

use thiserror::Error;

use marketplace_core::storage::StorageError;

use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::stores::profile::ProfileError;
use crate::stores::ratings::RatingError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The local storage medium failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The catalog backend could not be reached or answered badly.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A profile save was rejected before mutating any store.
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    /// A rating was rejected before mutating any store.
    #[error("rating error: {0}")]
    Rating(#[from] RatingError),

    /// Checkout validation failed.
    #[error("checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_source() {
        let err = StorefrontError::from(RatingError::OutOfRange(9));
        assert_eq!(err.to_string(), "rating error: rating must be between 1 and 5, got 9");
    }
}
