//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{CatalogService, Scheduler};
use crate::domain::IdentityProvider;
use crate::interfaces::http::common::{ErrorBody, MessageResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    auth, health, metrics as metrics_mod, request_id, reservations, resources,
};

/// Everything the HTTP layer needs, constructed by the server and injected.
#[derive(Clone)]
pub struct ApiContext {
    pub scheduler: Arc<Scheduler>,
    pub catalog: Arc<CatalogService>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Database handle for health pings; `None` on the in-memory store
    pub db: Option<DatabaseConnection>,
    /// Prometheus handle; `/metrics` is only mounted when present
    pub metrics: Option<PrometheusHandle>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::get_current_user,
        auth::logout,
        reservations::create_reservation,
        reservations::list_reservations,
        reservations::my_reservations,
        reservations::get_reservation,
        reservations::cancel_reservation,
        resources::list_resources,
        resources::get_resource,
        resources::create_resource,
        resources::delete_resource,
    ),
    components(
        schemas(
            ErrorBody,
            MessageResponse,
            health::HealthResponse,
            health::ComponentHealth,
            auth::UserInfo,
            reservations::CreateReservationRequest,
            reservations::ReservationDto,
            resources::CreateResourceRequest,
            resources::ResourceDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Authentication", description = "Caller identity and token revocation"),
        (name = "Reservations", description = "Schedule, query and cancel time-sliced reservations"),
        (name = "Resources", description = "Catalog of bookable parking spaces and chargers"),
    ),
    info(
        title = "Slotkeeper Reservation API",
        version = "1.0.0",
        description = "Conflict-free booking of parking spaces and charger slots",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState {
        identity: ctx.identity.clone(),
    };
    let require_auth = middleware::from_fn_with_state(auth_state.clone(), auth_middleware);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (protected)
    let auth_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/logout", post(auth::logout))
        .layer(require_auth.clone())
        .with_state(auth_state);

    // Reservation routes (protected)
    let reservation_routes = Router::new()
        .route(
            "/",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route("/mine", get(reservations::my_reservations))
        .route(
            "/{reservation_id}",
            get(reservations::get_reservation).delete(reservations::cancel_reservation),
        )
        .layer(require_auth.clone())
        .with_state(reservations::ReservationAppState {
            scheduler: ctx.scheduler.clone(),
        });

    // Resource routes: reads are public, mutations need a verified admin
    let resource_routes = Router::new()
        .route(
            "/",
            get(resources::list_resources)
                .merge(post(resources::create_resource).route_layer(require_auth.clone())),
        )
        .route(
            "/{resource_id}",
            get(resources::get_resource)
                .merge(delete(resources::delete_resource).route_layer(require_auth)),
        )
        .with_state(resources::ResourceAppState {
            catalog: ctx.catalog.clone(),
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: ctx.db.clone(),
            started_at: Arc::new(Instant::now()),
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/reservations", reservation_routes)
        .nest("/api/v1/resources", resource_routes);

    if let Some(handle) = ctx.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics_mod::prometheus_metrics))
                .with_state(metrics_mod::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics_mod::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
