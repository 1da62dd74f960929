//! Domain types for the car catalog.

pub mod entities;
pub mod events;
pub mod paging;

pub use entities::{
    normalize_name, BodyStyle, Car, CarModel, Color, LookupEntity, LookupKind, Make, Model,
};
pub use events::{CatalogEvent, EntityEvent};
pub use paging::{PagedResponse, Paging};
