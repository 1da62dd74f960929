//! Denormalized search index over cars.

pub mod document;
pub mod es_client;
pub mod index;
pub mod query;
pub mod service;
pub mod settings;

pub use document::CarDocument;
pub use es_client::EsClient;
pub use index::{CarIndex, CarSearchTerms, DisabledIndex, IndexError};
