//! Resource catalog use cases

pub mod service;

pub use service::{CatalogService, NewResource};
