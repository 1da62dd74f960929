//! Relational store (PostgreSQL).

pub mod catalog;
pub mod schema;

pub use catalog::{CatalogStore, CatalogFilter};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("can't find {entity} with id {id}")]
    NotFound { entity: &'static str, id: i64 },
    /// A unique or foreign-key constraint rejected the write.
    #[error("{0}")]
    Constraint(String),
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Turns constraint violations into [`StoreError::Constraint`] with a readable message.
pub(crate) fn classify(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return StoreError::Constraint(format!("{} already exists", what));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::Constraint(format!(
                    "{} is still referenced by other records",
                    what
                ));
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}
