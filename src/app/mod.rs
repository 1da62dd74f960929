pub mod catalog_service;
pub mod inputs;

pub use catalog_service::{CatalogService, ReindexReport};
pub use inputs::{CarInput, LookupInput, ModelInput};

use crate::storage::StoreError;

/// Why a catalog operation was refused or failed.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Missing or malformed input.
    #[error("{0}")]
    BadRequest(String),
    /// Well-formed input that conflicts with the stored catalog.
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(msg) => CatalogError::Unprocessable(msg),
            StoreError::NotFound { .. } => CatalogError::Unprocessable(err.to_string()),
            other => CatalogError::Store(other),
        }
    }
}
