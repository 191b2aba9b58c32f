//! Subscriber API endpoints
//!
//! Handles HTTP requests for newsletter subscriptions:
//! - POST /api/subscribe - Sign up an email address
//! - POST /api/subscribe/confirm - Confirm via token
//! - PUT /api/subscribe/preferences - Replace topic preferences
//! - POST /api/subscribe/unsubscribe - Opt out
//! - GET /api/admin/subscribers - List active subscribers
//! - GET /api/admin/subscribers/stats - Aggregate statistics
//! - DELETE /api/admin/subscribers/{id} - Remove a subscriber

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateSubscriberInput, ListParams, Subscriber, SubscriberStats};

/// Request body for subscribing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub email: String,
    pub source_tool: Option<String>,
    pub source_page: Option<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    pub frequency: Option<String>,
}

/// Request body for confirming a subscription
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub token: String,
}

/// Request body for replacing topic preferences
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub email: String,
    #[serde(default)]
    pub preferences: Vec<String>,
    pub frequency: Option<String>,
}

/// Request body for unsubscribing
#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub email: String,
    pub reason: Option<String>,
}

/// Response for a single subscriber
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberResponse {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_tool: Option<String>,
    pub is_confirmed: bool,
    pub subscribed_at: String,
    pub preferences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(subscriber: Subscriber) -> Self {
        Self {
            id: subscriber.id,
            email: subscriber.email,
            source_tool: subscriber.source_tool,
            is_confirmed: subscriber.is_confirmed,
            subscribed_at: subscriber.subscribed_at.to_rfc3339(),
            preferences: subscriber.preferences,
            frequency: subscriber.frequency,
        }
    }
}

/// Response for subscriber lists
#[derive(Debug, Serialize)]
pub struct SubscriberListResponse {
    pub subscribers: Vec<SubscriberResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Query parameters for listing subscribers
#[derive(Debug, Deserialize)]
pub struct ListSubscribersQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    50
}

/// Build the public subscription router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", post(subscribe))
        .route("/confirm", post(confirm))
        .route("/preferences", put(update_preferences))
        .route("/unsubscribe", post(unsubscribe))
}

/// Build the admin subscribers router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subscribers))
        .route("/stats", get(subscriber_stats))
        .route("/{id}", delete(delete_subscriber))
}

/// POST /api/subscribe - Sign up an email address
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscriberResponse>), ApiError> {
    let input = CreateSubscriberInput {
        email: request.email,
        source_tool: request.source_tool,
        source_page: request.source_page,
        ip_address: None,
        user_agent: None,
        preferences: request.preferences,
        frequency: request.frequency,
    };

    let subscriber = state.subscriber_service.subscribe(input).await?;

    Ok((StatusCode::CREATED, Json(subscriber.into())))
}

/// POST /api/subscribe/confirm - Confirm via token
pub async fn confirm(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<SubscriberResponse>, ApiError> {
    let subscriber = state.subscriber_service.confirm(&request.token).await?;
    Ok(Json(subscriber.into()))
}

/// PUT /api/subscribe/preferences - Replace topic preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<SubscriberResponse>, ApiError> {
    let subscriber = state
        .subscriber_service
        .update_preferences(&request.email, request.preferences, request.frequency)
        .await?;
    Ok(Json(subscriber.into()))
}

/// POST /api/subscribe/unsubscribe - Opt out
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(request): Json<UnsubscribeRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .subscriber_service
        .unsubscribe(&request.email, request.reason.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/subscribers - List active subscribers
pub async fn list_subscribers(
    State(state): State<AppState>,
    Query(query): Query<ListSubscribersQuery>,
) -> Result<Json<SubscriberListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.page_size);
    let result = state.subscriber_service.list(&params).await?;

    let total = result.total;
    let page = result.page;
    let page_size = result.per_page;
    let total_pages = result.total_pages();

    Ok(Json(SubscriberListResponse {
        subscribers: result.items.into_iter().map(Into::into).collect(),
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// GET /api/admin/subscribers/stats - Aggregate statistics
pub async fn subscriber_stats(
    State(state): State<AppState>,
) -> Result<Json<SubscriberStats>, ApiError> {
    Ok(Json(state.subscriber_service.stats().await?))
}

/// DELETE /api/admin/subscribers/{id} - Remove a subscriber
pub async fn delete_subscriber(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.subscriber_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
