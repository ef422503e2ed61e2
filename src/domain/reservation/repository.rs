//! Reservation repository interface

use async_trait::async_trait;

use super::interval::Interval;
use super::model::{NewReservation, Reservation, ReservationFilter};
use crate::domain::DomainResult;

/// Store adapter for the `reservations` collection.
///
/// Implementations translate store failures into
/// [`DomainError::Dependency`](crate::domain::DomainError::Dependency) so
/// callers stay store-agnostic.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Find reservation by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Reservation>>;

    /// Find all reservations matching every set filter field
    async fn find(&self, filter: &ReservationFilter) -> DomainResult<Vec<Reservation>>;

    /// Active reservations on `resource_id` whose interval overlaps `interval`
    async fn find_conflicting(
        &self,
        resource_id: &str,
        interval: &Interval,
    ) -> DomainResult<Vec<Reservation>>;

    /// Insert the reservation unless an active overlapping one exists.
    ///
    /// The conflict check and the insert happen as one atomic unit against
    /// the store. Fails with `Conflict` when the interval is taken.
    async fn create_if_free(&self, new: NewReservation) -> DomainResult<Reservation>;

    /// Delete by ID. Fails with `NotFound` when no record exists.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
