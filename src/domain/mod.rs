pub mod identity;
pub mod repositories;
pub mod reservation;
pub mod resource;

// Re-export commonly used types
pub use identity::{CallerIdentity, IdentityProvider, ADMIN_ROLE};
pub use repositories::{DomainResult, RepositoryProvider};
pub use reservation::{
    Interval, NewReservation, Reservation, ReservationFilter, ReservationRepository,
    ReservationStatus,
};
pub use resource::{Resource, ResourceKind, ResourceRepository};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
