//! Reservation use cases

pub mod access;
pub mod scheduler;

pub use scheduler::{QueryParams, Scheduler, SchedulerConfig};
