pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod cars;
    pub mod common;
    pub mod health;
    pub mod lookups;
    pub mod models;
    pub mod search;
}

pub use error::ApiError;
pub use router::{create_router, ApiDoc};
pub use types::AppState;
