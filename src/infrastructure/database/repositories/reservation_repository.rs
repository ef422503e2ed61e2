//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::reservation::{
    Interval, NewReservation, Reservation, ReservationFilter, ReservationRepository,
    ReservationStatus, CONFLICT_MESSAGE,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::reservation;

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    let status = ReservationStatus::parse(&m.status).ok_or_else(|| {
        DomainError::Dependency(format!(
            "Reservation {} has unknown status '{}'",
            m.id, m.status
        ))
    })?;
    Ok(Reservation {
        id: m.id,
        resource_id: m.resource_id,
        owner_id: m.owner_id,
        start: m.starts_at,
        end: m.ends_at,
        status,
        created_at: m.created_at,
    })
}

fn models_to_domain(models: Vec<reservation::Model>) -> DomainResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

/// Overlap predicate pushed down as a range filter:
/// stored `start < end AND stored end > start`.
async fn query_conflicting<C: ConnectionTrait>(
    conn: &C,
    resource_id: &str,
    interval: &Interval,
    excluding: Option<&str>,
) -> DomainResult<Vec<reservation::Model>> {
    let mut query = reservation::Entity::find()
        .filter(reservation::Column::ResourceId.eq(resource_id))
        .filter(reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
        .filter(reservation::Column::StartsAt.lt(interval.end))
        .filter(reservation::Column::EndsAt.gt(interval.start));
    if let Some(id) = excluding {
        query = query.filter(reservation::Column::Id.ne(id));
    }
    Ok(query.all(conn).await?)
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find(&self, filter: &ReservationFilter) -> DomainResult<Vec<Reservation>> {
        let mut query = reservation::Entity::find();
        if let Some(owner_id) = &filter.owner_id {
            query = query.filter(reservation::Column::OwnerId.eq(owner_id.as_str()));
        }
        if let Some(resource_id) = &filter.resource_id {
            query = query.filter(reservation::Column::ResourceId.eq(resource_id.as_str()));
        }
        if let Some(from) = filter.starts_from {
            query = query.filter(reservation::Column::StartsAt.gte(from));
        }
        if let Some(until) = filter.ends_until {
            query = query.filter(reservation::Column::EndsAt.lte(until));
        }

        let models = query
            .order_by_desc(reservation::Column::StartsAt)
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }

    async fn find_conflicting(
        &self,
        resource_id: &str,
        interval: &Interval,
    ) -> DomainResult<Vec<Reservation>> {
        models_to_domain(query_conflicting(&self.db, resource_id, interval, None).await?)
    }

    async fn create_if_free(&self, new: NewReservation) -> DomainResult<Reservation> {
        let r = new.into_reservation(Uuid::new_v4().to_string(), Utc::now());
        let txn = self.db.begin().await?;

        // Write first: the insert takes SQLite's write lock at statement start,
        // where the busy timeout applies. A deferred read upgraded to a write
        // fails with SQLITE_BUSY as soon as another writer is active.
        let model = reservation::ActiveModel {
            id: Set(r.id.clone()),
            resource_id: Set(r.resource_id.clone()),
            owner_id: Set(r.owner_id.clone()),
            starts_at: Set(r.start),
            ends_at: Set(r.end),
            status: Set(r.status.as_str().to_string()),
            created_at: Set(r.created_at),
        };
        model.insert(&txn).await?;

        let conflicts =
            query_conflicting(&txn, &r.resource_id, &r.interval(), Some(&r.id)).await?;
        if !conflicts.is_empty() {
            debug!(
                resource_id = %r.resource_id,
                conflicts = conflicts.len(),
                "Rejecting overlapping reservation"
            );
            txn.rollback().await?;
            return Err(DomainError::Conflict(CONFLICT_MESSAGE.to_string()));
        }

        txn.commit().await?;
        debug!(id = %r.id, resource_id = %r.resource_id, "Saved reservation");
        Ok(r)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = reservation::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Reservation", "id", id));
        }
        debug!(id, "Deleted reservation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_database;
    use chrono::{DateTime, Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 3, 1, 10, 0, 0).unwrap()
    }

    fn new_res(resource: &str, owner: &str, start_min: i64, end_min: i64) -> NewReservation {
        let interval = Interval::new(
            base() + Duration::minutes(start_min),
            base() + Duration::minutes(end_min),
        )
        .unwrap();
        NewReservation::new(resource, owner, interval)
    }

    #[tokio::test]
    async fn create_then_find_by_id() {
        let repo = SeaOrmReservationRepository::new(test_database().await);
        let created = repo.create_if_free(new_res("A1", "U1", 0, 60)).await.unwrap();

        let found = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.owner_id, "U1");
        assert_eq!(found.start, base());
        assert_eq!(found.end, base() + Duration::minutes(60));
        assert!(found.is_active());
    }

    #[tokio::test]
    async fn overlapping_insert_is_rejected() {
        let repo = SeaOrmReservationRepository::new(test_database().await);
        repo.create_if_free(new_res("A1", "U1", 0, 60)).await.unwrap();

        let err = repo
            .create_if_free(new_res("A1", "U2", 30, 90))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let all = repo
            .find(&ReservationFilter {
                resource_id: Some("A1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn adjacent_and_other_resource_inserts_succeed() {
        let repo = SeaOrmReservationRepository::new(test_database().await);
        repo.create_if_free(new_res("A1", "U1", 0, 60)).await.unwrap();
        repo.create_if_free(new_res("A1", "U2", 60, 120)).await.unwrap();
        repo.create_if_free(new_res("A2", "U2", 0, 60)).await.unwrap();
    }

    #[tokio::test]
    async fn find_conflicting_uses_half_open_bounds() {
        let repo = SeaOrmReservationRepository::new(test_database().await);
        repo.create_if_free(new_res("A1", "U1", 60, 120)).await.unwrap();

        let before = Interval::new(base(), base() + Duration::minutes(60)).unwrap();
        assert!(repo.find_conflicting("A1", &before).await.unwrap().is_empty());

        let straddle = Interval::new(
            base() + Duration::minutes(119),
            base() + Duration::minutes(180),
        )
        .unwrap();
        assert_eq!(repo.find_conflicting("A1", &straddle).await.unwrap().len(), 1);
        assert!(repo.find_conflicting("A2", &straddle).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_applies_every_filter() {
        let repo = SeaOrmReservationRepository::new(test_database().await);
        repo.create_if_free(new_res("A1", "U1", 0, 60)).await.unwrap();
        repo.create_if_free(new_res("A1", "U2", 120, 180)).await.unwrap();
        repo.create_if_free(new_res("B1", "U1", 0, 60)).await.unwrap();

        let by_owner = repo
            .find(&ReservationFilter {
                owner_id: Some("U1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_owner.len(), 2);

        let windowed = repo
            .find(&ReservationFilter {
                resource_id: Some("A1".into()),
                starts_from: Some(base() + Duration::minutes(60)),
                ends_until: Some(base() + Duration::minutes(180)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].owner_id, "U2");
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = SeaOrmReservationRepository::new(test_database().await);
        let created = repo.create_if_free(new_res("A1", "U1", 0, 60)).await.unwrap();

        repo.delete(&created.id).await.unwrap();
        assert!(repo.find_by_id(&created.id).await.unwrap().is_none());

        let err = repo.delete(&created.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn freed_interval_can_be_rebooked() {
        let repo = SeaOrmReservationRepository::new(test_database().await);
        let first = repo.create_if_free(new_res("A1", "U1", 0, 60)).await.unwrap();
        repo.delete(&first.id).await.unwrap();
        repo.create_if_free(new_res("A1", "U2", 0, 60)).await.unwrap();
    }
}
