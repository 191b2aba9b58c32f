//! Article API endpoints
//!
//! Handles HTTP requests for article management:
//! - GET /api/articles - List published articles
//! - GET /api/articles/{slug} - Get a published article (counts the view)
//! - GET /api/admin/articles - List all articles with filters
//! - POST /api/admin/articles - Create article
//! - GET/PUT/DELETE /api/admin/articles/{id} - Manage a single article
//! - POST /api/admin/articles/publish-due - Publish scheduled drafts
//! - GET /api/admin/articles/stats - Aggregate statistics

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{
    Article, ArticleCategory, ArticleFilters, ArticleStats, ArticleStatus, CreateArticleInput,
    ListParams, UpdateArticleInput,
};

/// Query parameters for listing articles
#[derive(Debug, Deserialize)]
pub struct ListArticlesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Filter by status (admin listing only)
    pub status: Option<String>,
    /// Filter by category slug
    pub category: Option<String>,
    /// Filter by tag
    pub tag: Option<String>,
    /// Substring search over title, content and excerpt
    pub search: Option<String>,
}

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    10
}

impl ListArticlesQuery {
    fn filters(&self) -> Result<ArticleFilters, ApiError> {
        let status = match &self.status {
            Some(s) => Some(
                ArticleStatus::from_str(s)
                    .ok_or_else(|| ApiError::validation_error(format!("Invalid status: {}", s)))?,
            ),
            None => None,
        };
        let category = match &self.category {
            Some(c) => Some(ArticleCategory::from_str(c).ok_or_else(|| {
                ApiError::validation_error(format!("Invalid category: {}", c))
            })?),
            None => None,
        };

        Ok(ArticleFilters {
            status,
            category,
            tag: self.tag.clone(),
            search: self.search.clone(),
            author_id: None,
        })
    }
}

/// Response for a single article
#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub status: String,
    pub views: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            slug: article.slug,
            excerpt: article.excerpt,
            content: article.content,
            category: article.category.map(|c| c.to_string()),
            tags: article.tags,
            featured_image: article.featured_image,
            status: article.status.to_string(),
            views: article.views,
            reading_time: article.reading_time,
            meta_title: article.meta_title,
            meta_description: article.meta_description,
            created_at: article.created_at.to_rfc3339(),
            updated_at: article.updated_at.to_rfc3339(),
            published_at: article.published_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Response for article lists
#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Response for the publish-due sweep
#[derive(Debug, Serialize)]
pub struct PublishDueResponse {
    pub published: Vec<ArticleResponse>,
    pub count: usize,
}

/// Build the public articles router (published content only)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published_articles))
        .route("/{slug}", get(get_published_article))
}

/// Build the admin articles router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_articles))
        .route("/", post(create_article))
        .route("/stats", get(article_stats))
        .route("/publish-due", post(publish_due))
        .route("/{id}", get(get_article_by_id))
        .route("/{id}", put(update_article))
        .route("/{id}", delete(delete_article))
}

/// GET /api/articles - List published articles
pub async fn list_published_articles(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.page_size);
    let mut filters = query.filters()?;
    // The public listing never exposes drafts
    filters.status = Some(ArticleStatus::Published);

    let result = state.article_service.list(&filters, &params).await?;

    Ok(Json(to_list_response(result)))
}

/// GET /api/articles/{slug} - Get a published article and count the view
pub async fn get_published_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state.article_service.get_published_by_slug(&slug).await?;
    Ok(Json(article.into()))
}

/// GET /api/admin/articles - List all articles with filters
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.page_size);
    let filters = query.filters()?;

    let result = state.article_service.list(&filters, &params).await?;

    Ok(Json(to_list_response(result)))
}

/// POST /api/admin/articles - Create article
pub async fn create_article(
    State(state): State<AppState>,
    Json(input): Json<CreateArticleInput>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    let article = state.article_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(article.into())))
}

/// GET /api/admin/articles/{id} - Get article by ID
pub async fn get_article_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state.article_service.get_by_id(id).await?;
    Ok(Json(article.into()))
}

/// PUT /api/admin/articles/{id} - Update article
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateArticleInput>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state.article_service.update(id, input).await?;
    Ok(Json(article.into()))
}

/// DELETE /api/admin/articles/{id} - Delete article
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.article_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/articles/publish-due - Publish scheduled drafts
pub async fn publish_due(
    State(state): State<AppState>,
) -> Result<Json<PublishDueResponse>, ApiError> {
    let published = state.article_service.publish_due().await?;
    let count = published.len();

    Ok(Json(PublishDueResponse {
        published: published.into_iter().map(Into::into).collect(),
        count,
    }))
}

/// GET /api/admin/articles/stats - Aggregate statistics
pub async fn article_stats(
    State(state): State<AppState>,
) -> Result<Json<ArticleStats>, ApiError> {
    Ok(Json(state.article_service.stats().await?))
}

fn to_list_response(result: crate::models::PagedResult<Article>) -> ArticleListResponse {
    let total = result.total;
    let page = result.page;
    let page_size = result.per_page;
    let total_pages = result.total_pages();

    ArticleListResponse {
        articles: result.items.into_iter().map(Into::into).collect(),
        total,
        page,
        page_size,
        total_pages,
    }
}
