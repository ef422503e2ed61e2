//! Resource catalog HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::application::{CatalogService, NewResource};
use crate::domain::{CallerIdentity, DomainError, ResourceKind};
use crate::interfaces::http::common::{ApiResponse, ApiResult, MessageResponse, ValidatedJson};

use super::dto::*;

#[derive(Clone)]
pub struct ResourceAppState {
    pub catalog: Arc<CatalogService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/resources",
    tag = "Resources",
    responses(
        (status = 200, description = "All bookable resources", body = ApiResponse<Vec<ResourceDto>>)
    )
)]
pub async fn list_resources(
    State(state): State<ResourceAppState>,
) -> ApiResult<Json<ApiResponse<Vec<ResourceDto>>>> {
    let all = state.catalog.list().await?;
    Ok(Json(ApiResponse::success(
        all.into_iter().map(ResourceDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/resources/{resource_id}",
    tag = "Resources",
    params(("resource_id" = String, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource details", body = ApiResponse<ResourceDto>),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn get_resource(
    State(state): State<ResourceAppState>,
    Path(resource_id): Path<String>,
) -> ApiResult<Json<ApiResponse<ResourceDto>>> {
    let resource = state.catalog.get(&resource_id).await?;
    Ok(Json(ApiResponse::success(resource.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/resources",
    tag = "Resources",
    security(("bearer_auth" = [])),
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Resource created", body = ApiResponse<ResourceDto>),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Resource id already exists")
    )
)]
pub async fn create_resource(
    State(state): State<ResourceAppState>,
    Extension(caller): Extension<CallerIdentity>,
    ValidatedJson(request): ValidatedJson<CreateResourceRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ResourceDto>>)> {
    let kind = ResourceKind::parse(&request.kind).ok_or_else(|| {
        DomainError::validation(format!("Unknown resource kind '{}'", request.kind))
    })?;
    let resource = state
        .catalog
        .create(
            &caller,
            NewResource {
                id: request.id,
                kind,
                name: request.name,
                x: request.x,
                y: request.y,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(resource.into())),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/resources/{resource_id}",
    tag = "Resources",
    security(("bearer_auth" = [])),
    params(("resource_id" = String, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource deleted", body = ApiResponse<MessageResponse>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn delete_resource(
    State(state): State<ResourceAppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(resource_id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.catalog.delete(&caller, &resource_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Resource {} deleted",
        resource_id
    )))))
}
