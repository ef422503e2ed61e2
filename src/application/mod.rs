pub mod catalog;
pub mod reservations;

// Re-export key types for convenience
pub use catalog::{CatalogService, NewResource};
pub use reservations::{QueryParams, Scheduler, SchedulerConfig};
