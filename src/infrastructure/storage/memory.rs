//! In-memory storage implementation

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::reservation::CONFLICT_MESSAGE;
use crate::domain::{
    DomainError, DomainResult, Interval, NewReservation, RepositoryProvider, Reservation,
    ReservationFilter, ReservationRepository, Resource, ResourceRepository,
};
use crate::shared::ResourceLocks;

/// In-memory reservations for development and testing
#[derive(Default)]
pub struct InMemoryReservationRepository {
    reservations: DashMap<String, Reservation>,
    /// Check-then-insert runs under the lock of the target resource only
    inserts: ResourceLocks,
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Reservation>> {
        Ok(self.reservations.get(id).map(|r| r.value().clone()))
    }

    async fn find(&self, filter: &ReservationFilter) -> DomainResult<Vec<Reservation>> {
        let mut found: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| filter.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();
        found.sort_by(|a, b| b.start.cmp(&a.start));
        Ok(found)
    }

    async fn find_conflicting(
        &self,
        resource_id: &str,
        interval: &Interval,
    ) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| {
                r.is_active() && r.resource_id == resource_id && r.interval().overlaps(interval)
            })
            .map(|r| r.value().clone())
            .collect())
    }

    async fn create_if_free(&self, new: NewReservation) -> DomainResult<Reservation> {
        let _section = self.inserts.acquire(&new.resource_id).await;

        if !self
            .find_conflicting(&new.resource_id, &new.interval)
            .await?
            .is_empty()
        {
            return Err(DomainError::Conflict(CONFLICT_MESSAGE.to_string()));
        }

        let r = new.into_reservation(Uuid::new_v4().to_string(), Utc::now());
        self.reservations.insert(r.id.clone(), r.clone());
        Ok(r)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.reservations
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Reservation", "id", id))
    }
}

/// In-memory resource catalog
#[derive(Default)]
pub struct InMemoryResourceRepository {
    resources: DashMap<String, Resource>,
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Resource>> {
        Ok(self.resources.get(id).map(|r| r.value().clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Resource>> {
        let mut all: Vec<Resource> = self.resources.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn create(&self, resource: Resource) -> DomainResult<()> {
        match self.resources.entry(resource.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "Resource '{}' already exists",
                resource.id
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(resource);
                Ok(())
            }
        }
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.resources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Resource", "id", id))
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.resources.len() as u64)
    }
}

/// Repository provider that keeps everything in process memory.
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    reservations: InMemoryReservationRepository,
    resources: InMemoryResourceRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn resources(&self) -> &dyn ResourceRepository {
        &self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceKind;
    use chrono::{Duration, TimeZone};

    fn interval(start_min: i64, end_min: i64) -> Interval {
        let base = Utc.with_ymd_and_hms(2031, 3, 1, 10, 0, 0).unwrap();
        Interval::new(
            base + Duration::minutes(start_min),
            base + Duration::minutes(end_min),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn rejects_overlap_accepts_adjacent() {
        let repos = InMemoryRepositoryProvider::new();
        let res = repos.reservations();

        res.create_if_free(NewReservation::new("A1", "U1", interval(0, 60)))
            .await
            .unwrap();
        let err = res
            .create_if_free(NewReservation::new("A1", "U2", interval(59, 61)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref m) if m == CONFLICT_MESSAGE));

        res.create_if_free(NewReservation::new("A1", "U2", interval(60, 90)))
            .await
            .unwrap();
        assert_eq!(res.find(&ReservationFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn find_orders_latest_first() {
        let repos = InMemoryRepositoryProvider::new();
        let res = repos.reservations();
        res.create_if_free(NewReservation::new("A1", "U1", interval(0, 10)))
            .await
            .unwrap();
        res.create_if_free(NewReservation::new("A1", "U1", interval(20, 30)))
            .await
            .unwrap();

        let all = res.find(&ReservationFilter::default()).await.unwrap();
        assert!(all[0].start > all[1].start);
    }

    #[tokio::test]
    async fn resource_crud() {
        let repos = InMemoryRepositoryProvider::new();
        let catalog = repos.resources();
        catalog
            .create(Resource::new("B2", ResourceKind::ParkingSpace, 0.3, 0.2))
            .await
            .unwrap();
        catalog
            .create(Resource::new("A1", ResourceKind::ParkingSpace, 0.4, 0.5))
            .await
            .unwrap();
        assert!(matches!(
            catalog
                .create(Resource::new("A1", ResourceKind::Charger, 0.0, 0.0))
                .await
                .unwrap_err(),
            DomainError::Conflict(_)
        ));

        let ids: Vec<_> = catalog
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["A1", "B2"]);

        catalog.delete("A1").await.unwrap();
        assert_eq!(catalog.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn held_resource_does_not_block_other_inserts() {
        let repo = InMemoryReservationRepository::default();
        let _held = repo.inserts.acquire("A1").await;

        let other = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            repo.create_if_free(NewReservation::new("B1", "U1", interval(0, 60))),
        )
        .await;
        assert!(other.unwrap().is_ok());

        let same = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            repo.create_if_free(NewReservation::new("A1", "U1", interval(0, 60))),
        )
        .await;
        assert!(same.is_err());
    }
}
