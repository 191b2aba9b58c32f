//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the LaserCalc backend.
//! It includes:
//! - Calculator endpoints
//! - Article API endpoints (public and admin)
//! - Subscriber API endpoints (public and admin)
//! - Calculation analytics endpoints (admin)
//! - Health check

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod articles;
pub mod calculate;
pub mod middleware;
pub mod subscribers;

pub use middleware::{ApiError, AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health - Service and database health
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.db.ping().await.map_err(|e| {
        tracing::error!(error = %e, "Health check failed");
        ApiError::internal_error("Database unavailable")
    })?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (require the configured admin token)
    let admin_routes = Router::new()
        .nest("/admin/articles", articles::admin_router())
        .nest("/admin/subscribers", subscribers::admin_router())
        .nest("/admin/calculations", calculate::admin_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_admin,
        ));

    // Public routes
    Router::new()
        .route("/health", get(health))
        .nest("/calculate", calculate::public_router())
        .nest("/articles", articles::public_router())
        .nest("/subscribe", subscribers::public_router())
        .merge(admin_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
            .allow_credentials(true),
        Err(e) => {
            tracing::warn!(cors_origin, error = %e, "Invalid CORS origin, allowing none");
            CorsLayer::new()
        }
    };

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
