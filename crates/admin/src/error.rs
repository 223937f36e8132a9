//! Error types for admin operations.

use thiserror::Error;

use marketplace_core::storage::StorageError;

/// Errors from admin moderation operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// A custom product needs at least a title and a category.
    #[error("title and category are required")]
    MissingTitleOrCategory,

    /// The local storage medium failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
