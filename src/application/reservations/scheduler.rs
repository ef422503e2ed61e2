//! Reservation scheduling: validate, check for conflicts, commit.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, SubsecRound, Timelike, Utc};
use tracing::{debug, info, warn};

use super::access;
use crate::domain::{
    CallerIdentity, DomainError, DomainResult, Interval, NewReservation, RepositoryProvider,
    Reservation, ReservationFilter,
};
use crate::shared::{parse_timestamp, ResourceLocks};

const INVALID_TIMESTAMP: &str = "Invalid timestamp format. Use ISO 8601 format";
const FRACTIONAL_TIMESTAMP: &str = "Timestamps must be whole seconds";

/// Scheduling knobs, filled from the `[scheduling]` config section.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Reject reservations for resources missing from the catalog
    pub require_known_resource: bool,
    /// Upper bound on every store call
    pub store_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            require_known_resource: false,
            store_timeout: Duration::from_secs(10),
        }
    }
}

/// Raw query filters as they arrive from the caller.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub reservation_id: Option<String>,
    pub owner_id: Option<String>,
    pub resource_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl QueryParams {
    fn without_blanks(self) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            reservation_id: present(self.reservation_id),
            owner_id: present(self.owner_id),
            resource_id: present(self.resource_id),
            start: present(self.start),
            end: present(self.end),
        }
    }
}

/// Owns the schedule / cancel / query use cases.
pub struct Scheduler {
    repos: Arc<dyn RepositoryProvider>,
    locks: ResourceLocks,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(repos: Arc<dyn RepositoryProvider>, config: SchedulerConfig) -> Self {
        Self {
            repos,
            locks: ResourceLocks::new(),
            config,
        }
    }

    /// Bound a store call by the configured timeout.
    async fn bounded<T>(&self, call: impl Future<Output = DomainResult<T>>) -> DomainResult<T> {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.config.store_timeout, "Store call timed out");
                Err(DomainError::Dependency("Store call timed out".into()))
            }
        }
    }

    /// Claim `[start, end)` on `resource_id` for `owner_id`.
    pub async fn schedule(
        &self,
        owner_id: &str,
        resource_id: &str,
        start: &str,
        end: &str,
    ) -> DomainResult<Reservation> {
        let interval = parse_interval(start, end)?;
        if !interval.starts_after(Utc::now()) {
            return Err(DomainError::validation("Start time must be in the future"));
        }
        let resource_id = resource_id.trim();
        if resource_id.is_empty() {
            return Err(DomainError::validation("resource_id must not be empty"));
        }

        if self.config.require_known_resource
            && self
                .bounded(self.repos.resources().find_by_id(resource_id))
                .await?
                .is_none()
        {
            return Err(DomainError::not_found("Resource", "id", resource_id));
        }

        let _section = self.locks.acquire(resource_id).await;
        let new = NewReservation::new(resource_id, owner_id, interval);
        match self
            .bounded(self.repos.reservations().create_if_free(new))
            .await
        {
            Ok(r) => {
                metrics::counter!("reservations_scheduled_total").increment(1);
                info!(
                    id = %r.id,
                    resource_id = %r.resource_id,
                    owner_id = %r.owner_id,
                    start = %r.start,
                    end = %r.end,
                    "Reservation scheduled"
                );
                Ok(r)
            }
            Err(e @ DomainError::Conflict(_)) => {
                metrics::counter!("reservation_conflicts_total").increment(1);
                let blocking: Vec<String> = self
                    .bounded(self.repos.reservations().find_conflicting(resource_id, &interval))
                    .await
                    .map(|found| found.into_iter().map(|r| r.id).collect())
                    .unwrap_or_default();
                info!(
                    resource_id,
                    start = %interval.start,
                    end = %interval.end,
                    ?blocking,
                    "Reservation conflict"
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a reservation on behalf of its owner.
    pub async fn cancel(&self, caller: &CallerIdentity, reservation_id: &str) -> DomainResult<()> {
        let reservation = self.get(reservation_id).await?;
        if !access::can_cancel(caller, &reservation) {
            warn!(
                id = reservation_id,
                caller = %caller.user_id,
                "Cancel refused for non-owner"
            );
            return Err(DomainError::Forbidden(
                "Not authorized to delete this reservation".into(),
            ));
        }

        let _section = self.locks.acquire(&reservation.resource_id).await;
        self.bounded(self.repos.reservations().delete(reservation_id))
            .await?;
        metrics::counter!("reservations_cancelled_total").increment(1);
        info!(id = reservation_id, owner_id = %caller.user_id, "Reservation cancelled");
        Ok(())
    }

    pub async fn get(&self, reservation_id: &str) -> DomainResult<Reservation> {
        self.bounded(self.repos.reservations().find_by_id(reservation_id))
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", "id", reservation_id))
    }

    /// Filtered listing. An id filter short-circuits every other filter.
    /// Blank values count as absent.
    pub async fn query(&self, params: QueryParams) -> DomainResult<Vec<Reservation>> {
        let params = params.without_blanks();
        if let Some(id) = params.reservation_id.as_deref() {
            return Ok(vec![self.get(id).await?]);
        }

        let starts_from = parse_filter(params.start.as_deref(), "start_timestamp")?;
        let ends_until = parse_filter(params.end.as_deref(), "end_timestamp")?;
        if let (Some(s), Some(e)) = (starts_from, ends_until) {
            if s >= e {
                return Err(DomainError::validation("Start time must be before end time"));
            }
        }

        // Stored bounds are whole seconds, so rounding the filter bounds
        // inward keeps the comparison exact.
        let filter = ReservationFilter {
            owner_id: params.owner_id,
            resource_id: params.resource_id,
            starts_from: starts_from.map(ceil_to_second),
            ends_until: ends_until.map(|e| e.trunc_subsecs(0)),
        };
        self.bounded(self.repos.reservations().find(&filter)).await
    }

    pub async fn for_owner(&self, caller: &CallerIdentity) -> DomainResult<Vec<Reservation>> {
        self.query(QueryParams {
            owner_id: Some(caller.user_id.clone()),
            ..Default::default()
        })
        .await
    }
}

fn parse_interval(start: &str, end: &str) -> DomainResult<Interval> {
    let start = parse_timestamp(start).ok_or_else(|| DomainError::validation(INVALID_TIMESTAMP))?;
    let end = parse_timestamp(end).ok_or_else(|| DomainError::validation(INVALID_TIMESTAMP))?;
    // Reservations are stored at second precision.
    if start.nanosecond() != 0 || end.nanosecond() != 0 {
        return Err(DomainError::validation(FRACTIONAL_TIMESTAMP));
    }
    Interval::new(start, end)
}

fn ceil_to_second(t: DateTime<Utc>) -> DateTime<Utc> {
    let floor = t.trunc_subsecs(0);
    if floor == t {
        t
    } else {
        floor + ChronoDuration::seconds(1)
    }
}

fn parse_filter(raw: Option<&str>, field: &str) -> DomainResult<Option<DateTime<Utc>>> {
    raw.map(|value| {
        parse_timestamp(value).ok_or_else(|| {
            DomainError::validation(format!(
                "Invalid format for {}. Expected ISO format.",
                field
            ))
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Resource, ResourceKind};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::{Duration as ChronoDuration, SubsecRound};

    fn scheduler() -> Scheduler {
        Scheduler::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            SchedulerConfig::default(),
        )
    }

    /// Offsets in hours from a fixed point one day ahead.
    fn fixed_times() -> impl Fn(f64) -> String {
        let base = (Utc::now() + ChronoDuration::days(1)).trunc_subsecs(0);
        move |hours| (base + ChronoDuration::minutes((hours * 60.0) as i64)).to_rfc3339()
    }

    #[tokio::test]
    async fn adjacent_intervals_both_succeed() {
        let s = scheduler();
        let t = fixed_times();
        s.schedule("U1", "A1", &t(10.0), &t(11.0)).await.unwrap();
        s.schedule("U2", "A1", &t(11.0), &t(12.0)).await.unwrap();
    }

    #[tokio::test]
    async fn overlapping_interval_conflicts() {
        let s = scheduler();
        let t = fixed_times();
        s.schedule("U1", "A1", &t(10.0), &t(11.0)).await.unwrap();

        let err = s
            .schedule("U2", "A1", &t(10.5), &t(11.5))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert_eq!(err.message(), "Time conflict with existing reservation");
    }

    #[tokio::test]
    async fn other_resources_are_independent() {
        let s = scheduler();
        let t = fixed_times();
        s.schedule("U1", "A1", &t(10.0), &t(11.0)).await.unwrap();
        s.schedule("U1", "A2", &t(10.0), &t(11.0)).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_past_and_inverted_intervals() {
        let s = scheduler();
        let t = fixed_times();
        let past = (Utc::now() - ChronoDuration::hours(1)).to_rfc3339();
        let soon = (Utc::now() + ChronoDuration::hours(1)).to_rfc3339();

        let err = s.schedule("U1", "A1", &past, &soon).await.unwrap_err();
        assert_eq!(err.message(), "Start time must be in the future");

        let err = s.schedule("U1", "A1", &t(2.0), &t(1.0)).await.unwrap_err();
        assert_eq!(err.message(), "Start time must be before end time");

        let err = s.schedule("U1", "A1", &t(1.0), &t(1.0)).await.unwrap_err();
        assert_eq!(err.message(), "Start time must be before end time");
    }

    #[tokio::test]
    async fn rejects_malformed_input() {
        let s = scheduler();
        let at = fixed_times();
        let err = s
            .schedule("U1", "A1", "next tuesday", &at(1.0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.message(), INVALID_TIMESTAMP);

        let err = s.schedule("U1", "  ", &at(1.0), &at(2.0)).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[tokio::test]
    async fn only_owner_cancels_and_record_disappears() {
        let s = scheduler();
        let t = fixed_times();
        let r = s.schedule("U1", "A1", &t(1.0), &t(2.0)).await.unwrap();

        let err = s
            .cancel(&CallerIdentity::new("U2"), &r.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "forbidden");
        assert_eq!(err.message(), "Not authorized to delete this reservation");

        s.cancel(&CallerIdentity::new("U1"), &r.id).await.unwrap();
        let err = s.get(&r.id).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn cancel_of_missing_is_not_found() {
        let s = scheduler();
        let t = fixed_times();
        let caller = CallerIdentity::new("U1");
        let err = s.cancel(&caller, "never-existed").await.unwrap_err();
        assert_eq!(err.message(), "Reservation not found");

        let r = s.schedule("U1", "A1", &t(1.0), &t(2.0)).await.unwrap();
        s.cancel(&caller, &r.id).await.unwrap();
        assert_eq!(s.cancel(&caller, &r.id).await.unwrap_err().kind(), "not_found");
    }

    #[tokio::test]
    async fn cancelled_interval_can_be_rebooked() {
        let s = scheduler();
        let t = fixed_times();
        let r = s.schedule("U1", "A1", &t(1.0), &t(2.0)).await.unwrap();
        s.cancel(&CallerIdentity::new("U1"), &r.id).await.unwrap();
        s.schedule("U2", "A1", &t(1.0), &t(2.0)).await.unwrap();
    }

    #[tokio::test]
    async fn conflict_scenario_leaves_only_first() {
        let s = scheduler();
        let t = fixed_times();
        let first = s.schedule("U1", "A1", &t(1.0), &t(2.0)).await.unwrap();
        assert!(!first.id.is_empty());

        let err = s
            .schedule("U2", "A1", &t(1.5), &t(2.5))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let found = s
            .query(QueryParams {
                resource_id: Some("A1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, first.id);
    }

    #[tokio::test]
    async fn concurrent_overlaps_yield_one_winner() {
        let s = Arc::new(scheduler());
        let t = fixed_times();
        let (start, end) = (t(3.0), t(4.0));

        let mut handles = Vec::new();
        for i in 0..16 {
            let s = s.clone();
            let (start, end) = (start.clone(), end.clone());
            handles.push(tokio::spawn(async move {
                s.schedule(&format!("U{}", i), "A1", &start, &end).await
            }));
        }

        let mut ok = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert_eq!(e.kind(), "conflict"),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn query_filters() {
        let s = scheduler();
        let t = fixed_times();
        let a = s.schedule("U1", "A1", &t(1.0), &t(2.0)).await.unwrap();
        s.schedule("U2", "A1", &t(3.0), &t(4.0)).await.unwrap();
        s.schedule("U1", "B1", &t(1.0), &t(2.0)).await.unwrap();

        let by_id = s
            .query(QueryParams {
                reservation_id: Some(a.id.clone()),
                owner_id: Some("someone-else".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id, a.id);

        let window = s
            .query(QueryParams {
                start: Some(t(2.5)),
                end: Some(t(4.0)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].owner_id, "U2");

        let mine = s.for_owner(&CallerIdentity::new("U1")).await.unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[tokio::test]
    async fn query_rejects_bad_filters() {
        let s = scheduler();
        let at = fixed_times();
        let err = s
            .query(QueryParams {
                start: Some("yesterday".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid format for start_timestamp. Expected ISO format."
        );

        let err = s
            .query(QueryParams {
                start: Some(at(2.0)),
                end: Some(at(1.0)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");

        let err = s
            .query(QueryParams {
                reservation_id: Some("missing".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn unknown_resource_rejected_when_enforced() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        repos
            .resources()
            .create(Resource::new("A1", ResourceKind::ParkingSpace, 0.4, 0.5))
            .await
            .unwrap();
        let s = Scheduler::new(
            repos,
            SchedulerConfig {
                require_known_resource: true,
                ..Default::default()
            },
        );
        let t = fixed_times();

        s.schedule("U1", "A1", &t(1.0), &t(2.0)).await.unwrap();
        let err = s
            .schedule("U1", "Z9", &t(1.0), &t(2.0))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Resource not found");
    }

    #[tokio::test]
    async fn fractional_seconds_are_rejected_not_rounded() {
        let s = scheduler();
        let base = (Utc::now() + ChronoDuration::days(1)).trunc_subsecs(0);
        let ms = |millis: i64| (base + ChronoDuration::milliseconds(millis)).to_rfc3339();

        let err = s.schedule("U1", "A1", &ms(200), &ms(800)).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.message(), FRACTIONAL_TIMESTAMP);

        let err = s
            .schedule("U1", "A1", &ms(0), &ms(3_600_500))
            .await
            .unwrap_err();
        assert_eq!(err.message(), FRACTIONAL_TIMESTAMP);

        // An explicit zero fraction is still a whole second.
        let start = format!("{}", base.format("%Y-%m-%dT%H:%M:%S%.3fZ"));
        let end = (base + ChronoDuration::hours(1)).to_rfc3339();
        let r = s.schedule("U1", "A1", &start, &end).await.unwrap();
        assert_eq!(r.start, base);
    }

    #[tokio::test]
    async fn fractional_filters_round_inward() {
        let s = scheduler();
        let t = fixed_times();
        s.schedule("U1", "A1", &t(1.0), &t(2.0)).await.unwrap();

        let just_after_start = (parse_timestamp(&t(1.0)).unwrap()
            + ChronoDuration::milliseconds(1))
        .to_rfc3339();
        let excluded = s
            .query(QueryParams {
                start: Some(just_after_start),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(excluded.is_empty());

        let just_after_end = (parse_timestamp(&t(2.0)).unwrap()
            + ChronoDuration::milliseconds(999))
        .to_rfc3339();
        let included = s
            .query(QueryParams {
                end: Some(just_after_end),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(included.len(), 1);
    }

    #[tokio::test]
    async fn blank_filters_are_ignored() {
        let s = scheduler();
        let t = fixed_times();
        s.schedule("U1", "A1", &t(1.0), &t(2.0)).await.unwrap();

        let found = s
            .query(QueryParams {
                reservation_id: Some(String::new()),
                owner_id: Some("".into()),
                resource_id: Some("   ".into()),
                start: Some("".into()),
                end: Some(" ".into()),
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    async fn file_backed_scheduler(path: &std::path::Path) -> Scheduler {
        use crate::infrastructure::database::migrator::Migrator;
        use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
        use crate::infrastructure::database::{init_database, DatabaseConfig};
        use sea_orm_migration::MigratorTrait;

        let db = init_database(&DatabaseConfig::sqlite(&path.to_string_lossy()))
            .await
            .unwrap();
        Migrator::up(&db, None).await.unwrap();
        Scheduler::new(
            Arc::new(SeaOrmRepositoryProvider::new(db)),
            SchedulerConfig::default(),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sqlite_file_store_handles_parallel_writers() {
        let path = std::env::temp_dir().join(format!("slotkeeper-{}.db", uuid::Uuid::new_v4()));
        let s = Arc::new(file_backed_scheduler(&path).await);
        let t = fixed_times();

        let mut handles = Vec::new();
        for i in 0..64 {
            let s = s.clone();
            let (start, end) = (t(1.0), t(2.0));
            handles.push(tokio::spawn(async move {
                s.schedule("U1", &format!("R{}", i), &start, &end).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..16 {
            let s = s.clone();
            let (start, end) = (t(3.0), t(4.0));
            handles.push(tokio::spawn(async move {
                s.schedule(&format!("U{}", i), "R0", &start, &end).await
            }));
        }
        let mut ok = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert_eq!(e.kind(), "conflict"),
            }
        }
        assert_eq!(ok, 1);

        let all = s.query(QueryParams::default()).await.unwrap();
        assert_eq!(all.len(), 65);

        drop(s);
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
