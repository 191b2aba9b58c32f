//! API middleware
//!
//! Contains middleware for:
//! - Admin authentication (bearer token or cookie)
//! - The shared application state
//! - The JSON error envelope used by every endpoint

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::services::article::{ArticleService, ArticleServiceError};
use crate::services::calculation::{CalculationService, CalculationServiceError};
use crate::services::subscriber::{SubscriberService, SubscriberServiceError};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub article_service: Arc<ArticleService>,
    pub subscriber_service: Arc<SubscriberService>,
    pub calculation_service: Arc<CalculationService>,
}

impl AppState {
    /// Wire up all services over a connected database
    pub fn new(db: Database, config: Config) -> Self {
        use crate::db::repositories::{
            SqlxArticleRepository, SqlxCalculationRepository, SqlxSubscriberRepository,
        };

        let pool = db.pool().clone();
        Self {
            db,
            config: Arc::new(config),
            article_service: Arc::new(ArticleService::new(SqlxArticleRepository::shared(
                pool.clone(),
            ))),
            subscriber_service: Arc::new(SubscriberService::new(SqlxSubscriberRepository::shared(
                pool.clone(),
            ))),
            calculation_service: Arc::new(CalculationService::new(
                SqlxCalculationRepository::shared(pool),
            )),
        }
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<ArticleServiceError> for ApiError {
    fn from(err: ArticleServiceError) -> Self {
        match err {
            ArticleServiceError::NotFound(msg) => ApiError::not_found(msg),
            ArticleServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ArticleServiceError::DuplicateSlug(slug) => {
                ApiError::conflict(format!("Article slug already exists: {}", slug))
            }
            ArticleServiceError::InternalError(e) => {
                tracing::error!(error = %e, "Article service error");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<SubscriberServiceError> for ApiError {
    fn from(err: SubscriberServiceError) -> Self {
        match err {
            SubscriberServiceError::NotFound(msg) => ApiError::not_found(msg),
            SubscriberServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            SubscriberServiceError::AlreadySubscribed => {
                ApiError::conflict("Email already subscribed")
            }
            SubscriberServiceError::InternalError(e) => {
                tracing::error!(error = %e, "Subscriber service error");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<CalculationServiceError> for ApiError {
    fn from(err: CalculationServiceError) -> Self {
        match err {
            CalculationServiceError::UnknownTool(tool) => {
                ApiError::validation_error(format!("unknown tool type: {}", tool))
            }
            CalculationServiceError::InvalidParams(msg) => ApiError::validation_error(msg),
            CalculationServiceError::ValidationError(e) => ApiError::validation_error(e.to_string()),
            CalculationServiceError::InternalError(e) => {
                tracing::error!(error = %e, "Calculation service error");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

/// Extract the admin token from the Authorization header or cookie
fn extract_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("admin_token=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Middleware requiring the configured admin token
///
/// An empty configured token locks admin endpoints entirely.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = &state.config.auth.admin_token;
    if expected.is_empty() {
        return Err(ApiError::unauthorized("Admin access is not configured"));
    }

    match extract_token(&request) {
        Some(token) if token == *expected => Ok(next.run(request).await),
        Some(_) => Err(ApiError::unauthorized("Invalid admin token")),
        None => Err(ApiError::unauthorized("Missing admin token")),
    }
}
