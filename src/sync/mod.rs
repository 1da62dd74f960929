//! Keeps the search index in step with the relational store.

pub mod flatten;
pub mod hooks;

pub use flatten::{Flattener, ModelRelations, RelationLookup};
pub use hooks::{Outcome, SyncHooks, SyncStatsSnapshot};

use crate::search::IndexError;
use crate::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("car has no id")]
    MissingCarId,
    #[error("unable to index car with id {car_id}: model {model_id} has no resolvable make/body style")]
    UnresolvedRelations { car_id: i64, model_id: i64 },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Index(#[from] IndexError),
}
