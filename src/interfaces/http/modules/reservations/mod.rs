//! Reservation module: schedule, query and cancel

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
