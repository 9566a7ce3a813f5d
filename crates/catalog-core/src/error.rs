//! Error types for catalog-core

use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Lookup found nothing
    #[error("{0}")]
    NotFound(String),

    /// Reading or writing the backing file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file held something other than an item array
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store-specific failure that is neither IO nor parsing
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CatalogError {
    /// The canonical missing-item error
    pub fn item_not_found() -> Self {
        CatalogError::NotFound("Item not found".to_string())
    }

    /// True for errors a caller should report as a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}
