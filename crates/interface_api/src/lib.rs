//! HTTP API Layer
//!
//! REST API for the claims engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: claim filing, verification, decisions, payout capture,
//!   policy-number classification and health probes
//! - **Middleware**: bearer-token authentication and audit logging
//! - **DTOs**: request/response bodies
//! - **Error Handling**: `ClaimError` to status code and JSON body
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(lifecycle, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use domain_claims::ClaimLifecycle;

use crate::config::ApiConfig;
use crate::handlers::{claims, health, policy_numbers};
use crate::middleware::{audit_middleware, auth_middleware, document_access_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<ClaimLifecycle>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// Everything under `/api/v1` requires a bearer token; `/health` and
/// `/health/ready` are public. `/api/v1/documents/<holder>/...` is further
/// limited to that holder and to insurance workers.
pub fn create_router(lifecycle: Arc<ClaimLifecycle>, config: ApiConfig) -> Router {
    let body_limit = config.max_request_bytes;
    let document_root = config.document_root.clone();
    let state = AppState { lifecycle, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/", post(claims::create_claim).get(claims::list_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/verify", post(claims::verify_claim))
        .route("/:id/approve", post(claims::approve_claim))
        .route("/:id/reject", post(claims::reject_claim))
        .route("/:id/payout-account", put(claims::add_payout_account));

    // Stored files, one directory per policy holder
    let documents = ServiceBuilder::new()
        .layer(axum_middleware::from_fn(document_access_middleware))
        .service(ServeDir::new(document_root));

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .route(
            "/policy-numbers/classify",
            post(policy_numbers::classify_policy_number),
        )
        .nest_service("/documents", documents)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
