//! Resource catalog aggregate
//!
//! Parking spaces and chargers that reservations refer to.

pub mod model;
pub mod repository;

pub use model::{default_catalog, Resource, ResourceKind, DEFAULT_PARKING_LAYOUT};
pub use repository::ResourceRepository;
