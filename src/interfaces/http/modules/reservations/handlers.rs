//! Reservation HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::application::Scheduler;
use crate::domain::CallerIdentity;
use crate::interfaces::http::common::{ApiResponse, ApiResult, MessageResponse, ValidatedJson};

use super::dto::*;

/// Application state for reservation handlers.
#[derive(Clone)]
pub struct ReservationAppState {
    pub scheduler: Arc<Scheduler>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid or past interval"),
        (status = 401, description = "Missing or rejected credentials"),
        (status = 404, description = "Unknown resource (when enforced)"),
        (status = 409, description = "Interval overlaps an existing reservation")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationAppState>,
    Extension(caller): Extension<CallerIdentity>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ReservationDto>>)> {
    let reservation = state
        .scheduler
        .schedule(
            &caller.user_id,
            &request.resource_id,
            &request.start,
            &request.end,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ReservationDto::for_caller(
            &caller,
            &reservation,
        ))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(ReservationQuery),
    responses(
        (status = 200, description = "Matching reservations", body = ApiResponse<Vec<ReservationDto>>),
        (status = 400, description = "Malformed timestamp filter"),
        (status = 404, description = "reservation_id given but not found")
    )
)]
pub async fn list_reservations(
    State(state): State<ReservationAppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<ReservationQuery>,
) -> ApiResult<Json<ApiResponse<Vec<ReservationDto>>>> {
    let found = state.scheduler.query(query.into()).await?;
    Ok(Json(ApiResponse::success(
        found
            .iter()
            .map(|r| ReservationDto::for_caller(&caller, r))
            .collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/mine",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's reservations", body = ApiResponse<Vec<ReservationDto>>)
    )
)]
pub async fn my_reservations(
    State(state): State<ReservationAppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<ApiResponse<Vec<ReservationDto>>>> {
    let mine = state.scheduler.for_owner(&caller).await?;
    Ok(Json(ApiResponse::success(
        mine.iter()
            .map(|r| ReservationDto::for_caller(&caller, r))
            .collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{reservation_id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("reservation_id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationAppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(reservation_id): Path<String>,
) -> ApiResult<Json<ApiResponse<ReservationDto>>> {
    let reservation = state.scheduler.get(&reservation_id).await?;
    Ok(Json(ApiResponse::success(ReservationDto::for_caller(
        &caller,
        &reservation,
    ))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{reservation_id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("reservation_id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation deleted", body = ApiResponse<MessageResponse>),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn cancel_reservation(
    State(state): State<ReservationAppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(reservation_id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.scheduler.cancel(&caller, &reservation_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Reservation deleted successfully",
    ))))
}
