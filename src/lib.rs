pub mod app;
pub mod domain;
pub mod infra;
pub mod search;
pub mod storage;
pub mod sync;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::CatalogService;
pub use domain::{Car, CatalogEvent, EntityEvent, LookupEntity, LookupKind, Model};
pub use infra::Config;
pub use search::{CarIndex, EsClient};
pub use storage::CatalogStore;
pub use sync::SyncHooks;
