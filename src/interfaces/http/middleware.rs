//! Authentication middleware for Axum
//!
//! Verifies the bearer credential before any handler runs and attaches the
//! resulting [`CallerIdentity`] to the request extensions.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::domain::{CallerIdentity, DomainError, IdentityProvider};
use crate::interfaces::http::common::ApiError;

const MISSING_CREDENTIALS: &str = "Authorization header missing or invalid";

/// Authentication state: the identity provider that verifies tokens
#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<dyn IdentityProvider>,
}

/// Raw bearer token of the current request, kept for logout.
#[derive(Clone, Debug)]
pub struct BearerToken(pub String);

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Bearer authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
        .map(String::from);
    let Some(token) = token else {
        return ApiError(DomainError::AuthMissing(MISSING_CREDENTIALS.into())).into_response();
    };

    let caller: CallerIdentity = match auth_state.identity.verify(&token).await {
        Ok(caller) => caller,
        Err(e) => return ApiError(e).into_response(),
    };
    debug!(user_id = %caller.user_id, "Authenticated request");

    request.extensions_mut().insert(caller);
    request.extensions_mut().insert(BearerToken(token));
    next.run(request).await
}
