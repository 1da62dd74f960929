//! The search index contract used by the sync hooks and search endpoints.

use crate::domain::{Car, Model, PagedResponse, Paging};
use crate::search::document::CarDocument;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("search index is not configured")]
    Disabled,
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    #[error("field '{0}' cannot be propagated to the index")]
    UnknownField(String),
    #[error("index request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("index responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected index response: {0}")]
    Decode(String),
}

/// Optional per-field search input. Absent fields contribute no clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CarSearchTerms {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "bodyStyle")]
    pub body_style: Option<String>,
}

/// All reads and writes against the denormalized car index go through this trait.
#[async_trait]
pub trait CarIndex: Send + Sync {
    async fn ping(&self) -> Result<(), IndexError>;

    async fn exists(&self) -> Result<bool, IndexError>;

    /// Creates the index with its analyzer settings unless it already exists.
    async fn init_index(&self) -> Result<(), IndexError>;

    /// Creates or overwrites one document by id.
    async fn index(&self, document: &CarDocument) -> Result<(), IndexError>;

    /// Removes one document. A missing document is not an error.
    async fn delete(&self, id: i64) -> Result<(), IndexError>;

    /// Sets `field` to `value` on every document whose `{field}_id` equals `id`.
    /// Returns the number of documents updated.
    async fn bulk_update_field(&self, id: i64, field: &str, value: &str)
        -> Result<u64, IndexError>;

    /// Rewrites `model`, `make`, `body_style`, `body_style_id` and `make_id` on every
    /// document whose `model_id` equals `model.id`.
    async fn update_by_model_data(&self, model: &Model) -> Result<u64, IndexError>;

    async fn search_cars_by_term(
        &self,
        term: &str,
        paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError>;

    async fn search_cars(
        &self,
        terms: &CarSearchTerms,
        paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError>;

    async fn match_all(&self, paging: Paging) -> Result<PagedResponse<Car>, IndexError>;
}

/// Fields that may be patched through `bulk_update_field`.
pub const PROPAGATED_FIELDS: [&str; 4] = ["make", "color", "body_style", "model"];

pub fn check_document(document: &CarDocument) -> Result<(), IndexError> {
    if document.id <= 0 {
        return Err(IndexError::MalformedDocument(format!(
            "document id must be positive, got {}",
            document.id
        )));
    }
    Ok(())
}

pub fn check_propagated_field(field: &str) -> Result<(), IndexError> {
    if PROPAGATED_FIELDS.contains(&field) {
        Ok(())
    } else {
        Err(IndexError::UnknownField(field.to_string()))
    }
}

/// Stand-in used when no index URL is configured: every call fails with
/// [`IndexError::Disabled`], which hooks log and searches turn into empty pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledIndex;

#[async_trait]
impl CarIndex for DisabledIndex {
    async fn ping(&self) -> Result<(), IndexError> {
        Err(IndexError::Disabled)
    }

    async fn exists(&self) -> Result<bool, IndexError> {
        Err(IndexError::Disabled)
    }

    async fn init_index(&self) -> Result<(), IndexError> {
        Err(IndexError::Disabled)
    }

    async fn index(&self, _document: &CarDocument) -> Result<(), IndexError> {
        Err(IndexError::Disabled)
    }

    async fn delete(&self, _id: i64) -> Result<(), IndexError> {
        Err(IndexError::Disabled)
    }

    async fn bulk_update_field(
        &self,
        _id: i64,
        _field: &str,
        _value: &str,
    ) -> Result<u64, IndexError> {
        Err(IndexError::Disabled)
    }

    async fn update_by_model_data(&self, _model: &Model) -> Result<u64, IndexError> {
        Err(IndexError::Disabled)
    }

    async fn search_cars_by_term(
        &self,
        _term: &str,
        _paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError> {
        Err(IndexError::Disabled)
    }

    async fn search_cars(
        &self,
        _terms: &CarSearchTerms,
        _paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError> {
        Err(IndexError::Disabled)
    }

    async fn match_all(&self, _paging: Paging) -> Result<PagedResponse<Car>, IndexError> {
        Err(IndexError::Disabled)
    }
}
