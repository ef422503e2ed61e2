//! Reservation aggregate
//!
//! Contains the Reservation entity, the interval model with its conflict
//! predicate, and the repository interface.

pub mod interval;
pub mod model;
pub mod repository;

pub use interval::Interval;
pub use model::{NewReservation, Reservation, ReservationFilter, ReservationStatus};
pub use repository::ReservationRepository;

/// Message used for every overlap rejection.
pub const CONFLICT_MESSAGE: &str = "Time conflict with existing reservation";
