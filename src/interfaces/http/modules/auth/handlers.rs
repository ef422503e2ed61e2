//! Authentication API handlers

use axum::extract::State;
use axum::{Extension, Json};

use super::dto::UserInfo;
use crate::domain::CallerIdentity;
use crate::interfaces::http::common::{ApiResponse, ApiResult, MessageResponse};
use crate::interfaces::http::middleware::{AuthState, BearerToken};

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller identity", body = ApiResponse<UserInfo>),
        (status = 401, description = "Missing or rejected credentials")
    )
)]
pub async fn get_current_user(
    Extension(caller): Extension<CallerIdentity>,
) -> Json<ApiResponse<UserInfo>> {
    Json(ApiResponse::success(caller.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token revoked", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Missing or rejected credentials")
    )
)]
pub async fn logout(
    State(state): State<AuthState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.identity.revoke(&token).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Logged out successfully",
    ))))
}
