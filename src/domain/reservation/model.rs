//! Reservation domain entity

use chrono::{DateTime, Utc};

use super::interval::Interval;

/// Reservation status
///
/// Cancellation deletes the record, so `Active` is the only persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Active,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed claim on one resource for one interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    /// Store-assigned identifier
    pub id: String,
    /// Bookable unit (parking space or charger)
    pub resource_id: String,
    /// Verified caller that created the reservation
    pub owner_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Input to the store adapter's atomic insert. The id and `created_at`
/// are assigned by the adapter.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub resource_id: String,
    pub owner_id: String,
    pub interval: Interval,
}

impl NewReservation {
    pub fn new(
        resource_id: impl Into<String>,
        owner_id: impl Into<String>,
        interval: Interval,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            owner_id: owner_id.into(),
            interval,
        }
    }

    /// Materialize the record the adapter will persist.
    pub fn into_reservation(self, id: String, created_at: DateTime<Utc>) -> Reservation {
        Reservation {
            id,
            resource_id: self.resource_id,
            owner_id: self.owner_id,
            start: self.interval.start,
            end: self.interval.end,
            status: ReservationStatus::Active,
            created_at,
        }
    }
}

/// Query filters over stored reservations. All fields are conjunctive;
/// `None` means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub owner_id: Option<String>,
    pub resource_id: Option<String>,
    /// Stored `start >= starts_from`
    pub starts_from: Option<DateTime<Utc>>,
    /// Stored `end <= ends_until`
    pub ends_until: Option<DateTime<Utc>>,
}

impl ReservationFilter {
    pub fn matches(&self, r: &Reservation) -> bool {
        self.owner_id.as_deref().map_or(true, |o| r.owner_id == o)
            && self.resource_id.as_deref().map_or(true, |res| r.resource_id == res)
            && self.starts_from.map_or(true, |s| r.start >= s)
            && self.ends_until.map_or(true, |e| r.end <= e)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap()
    }

    fn sample(id: &str, resource: &str, owner: &str, start_h: i64, end_h: i64) -> Reservation {
        let interval = Interval::new(t0() + Duration::hours(start_h), t0() + Duration::hours(end_h))
            .unwrap();
        NewReservation::new(resource, owner, interval).into_reservation(id.into(), t0())
    }

    #[test]
    fn new_reservation_is_active() {
        let r = sample("r1", "A1", "U1", 0, 1);
        assert!(r.is_active());
        assert_eq!(r.status.as_str(), "active");
        assert!(r.is_owned_by("U1"));
        assert!(!r.is_owned_by("U2"));
    }

    #[test]
    fn status_parse() {
        assert_eq!(ReservationStatus::parse("active"), Some(ReservationStatus::Active));
        assert_eq!(ReservationStatus::parse("Cancelled"), None);
    }

    #[test]
    fn filter_matches_bounds_inclusively() {
        let r = sample("r1", "A1", "U1", 1, 2);
        let exact = ReservationFilter {
            starts_from: Some(r.start),
            ends_until: Some(r.end),
            ..Default::default()
        };
        assert!(exact.matches(&r));

        let late = ReservationFilter {
            starts_from: Some(r.start + Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!late.matches(&r));

        let other_owner = ReservationFilter {
            owner_id: Some("U2".into()),
            ..Default::default()
        };
        assert!(!other_owner.matches(&r));
        assert!(ReservationFilter::default().matches(&r));
    }
}
