//! Catalog error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to write catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
