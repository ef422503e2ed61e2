//! Reservation DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::reservations::{access, QueryParams};
use crate::domain::{CallerIdentity, Reservation};

/// Request to claim an interval on a resource
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    /// Parking space or charger id, e.g. `A1`
    #[validate(length(min = 1, max = 128))]
    pub resource_id: String,
    /// Interval start (ISO 8601, UTC if no offset is given)
    #[schema(example = "2030-01-01T10:00:00Z")]
    pub start: String,
    /// Interval end, exclusive
    #[schema(example = "2030-01-01T11:00:00Z")]
    pub end: String,
}

/// Reservation details in API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: String,
    pub resource_id: String,
    /// Present only on the caller's own reservations
    pub owner_id: Option<String>,
    pub start: String,
    pub end: String,
    pub status: String,
    pub created_at: String,
}

impl ReservationDto {
    pub fn for_caller(caller: &CallerIdentity, r: &Reservation) -> Self {
        Self {
            id: r.id.clone(),
            resource_id: r.resource_id.clone(),
            owner_id: access::redact_for(caller, r).map(String::from),
            start: r.start.to_rfc3339(),
            end: r.end.to_rfc3339(),
            status: r.status.to_string(),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Query-string filters for `GET /api/v1/reservations`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReservationQuery {
    /// Exact id; other filters are ignored when set
    pub reservation_id: Option<String>,
    pub owner_id: Option<String>,
    pub resource_id: Option<String>,
    /// Reservations starting at or after this instant
    pub start: Option<String>,
    /// Reservations ending at or before this instant
    pub end: Option<String>,
}

impl From<ReservationQuery> for QueryParams {
    fn from(q: ReservationQuery) -> Self {
        QueryParams {
            reservation_id: q.reservation_id,
            owner_id: q.owner_id,
            resource_id: q.resource_id,
            start: q.start,
            end: q.end,
        }
    }
}
