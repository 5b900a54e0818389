//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use domain_claims::{document_owner, Actor};

use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token and stores the resulting [`Actor`] in the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!(uri = %request.uri(), "Missing or invalid Authorization header");
        return Err(ApiError::Unauthorized("missing bearer token".to_string()));
    };

    let actor = crate::auth::validate_token(token, &state.config.jwt_secret)
        .and_then(|claims| claims.actor())
        .map_err(|e| {
            warn!(error = %e, "Token rejected");
            ApiError::from(e)
        })?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Restricts stored documents to their holder and to insurance workers
///
/// Runs inside the `/documents` nest, so the path starts at the holder
/// segment written by the document store.
pub async fn document_access_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let actor = request
        .extensions()
        .get::<Actor>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    if !actor.is_reviewer() && document_owner(request.uri().path()) != Some(actor.id) {
        warn!(user = %actor.id, path = %request.uri().path(), "Document access denied");
        return Err(ApiError::Forbidden(
            "documents are readable only by their policy holder and insurance workers".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Audit logging middleware
///
/// Logs every API request with the acting user and outcome.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let (user, role) = request
        .extensions()
        .get::<Actor>()
        .map(|a| (a.id.to_string(), a.role.as_str()))
        .unwrap_or_else(|| ("anonymous".to_string(), "none"));

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user,
        role = role,
        status = status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
