//! Article service
//!
//! Implements business logic for article management:
//! - Create, read, update, delete articles
//! - Slug generation and uniqueness checks
//! - Scheduled publishing
//! - Validation

use crate::db::repositories::ArticleRepository;
use crate::models::{
    Article, ArticleFilters, ArticleStats, CreateArticleInput, ListParams, PagedResult,
    UpdateArticleInput,
};
use anyhow::Context;
use std::sync::Arc;

/// Maximum article title length
const MAX_TITLE_LEN: usize = 200;

/// Maximum excerpt length
const MAX_EXCERPT_LEN: usize = 500;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Article not found
    #[error("Article not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Article slug already exists: {0}")]
    DuplicateSlug(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Article service for managing blog articles
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
}

impl ArticleService {
    /// Create a new article service
    pub fn new(repo: Arc<dyn ArticleRepository>) -> Self {
        Self { repo }
    }

    /// Create a new article
    ///
    /// The slug is generated from the title when not provided. Creating with
    /// status `published` stamps `published_at`; a draft may carry a future
    /// `published_at` as its schedule.
    pub async fn create(&self, input: CreateArticleInput) -> Result<Article, ArticleServiceError> {
        self.validate_create_input(&input)?;

        let slug = match &input.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_string(),
            _ => generate_slug(&input.title),
        };
        if slug.is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Could not derive a slug from the title".to_string(),
            ));
        }

        if self
            .repo
            .exists_by_slug(&slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(ArticleServiceError::DuplicateSlug(slug));
        }

        let article = self
            .repo
            .create(&slug, &input)
            .await
            .context("Failed to create article")?;

        tracing::info!(article_id = article.id, slug = %article.slug, "Article created");

        Ok(article)
    }

    /// Get an article by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Article, ArticleServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound(format!("id {}", id)))
    }

    /// Get an article by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Article, ArticleServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound(slug.to_string()))
    }

    /// Get a published article by slug and count the view
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Article, ArticleServiceError> {
        let article = self.get_by_slug(slug).await?;
        if article.status != crate::models::ArticleStatus::Published {
            return Err(ArticleServiceError::NotFound(slug.to_string()));
        }

        self.repo
            .increment_views(article.id)
            .await
            .context("Failed to increment views")?;

        Ok(article)
    }

    /// List articles matching the filters with pagination
    pub async fn list(
        &self,
        filters: &ArticleFilters,
        params: &ListParams,
    ) -> Result<PagedResult<Article>, ArticleServiceError> {
        let items = self
            .repo
            .list(filters, params.offset(), params.limit())
            .await
            .context("Failed to list articles")?;
        let total = self
            .repo
            .count(filters)
            .await
            .context("Failed to count articles")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Update an existing article
    pub async fn update(
        &self,
        id: i64,
        input: UpdateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        if !input.has_changes() {
            return Err(ArticleServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }
        self.validate_update_input(&input)?;

        // Ensure the article exists before touching the slug index
        self.get_by_id(id).await?;

        if let Some(slug) = &input.slug {
            if self
                .repo
                .exists_by_slug_excluding(slug, id)
                .await
                .context("Failed to check slug uniqueness")?
            {
                return Err(ArticleServiceError::DuplicateSlug(slug.clone()));
            }
        }

        let article = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update article")?;

        tracing::info!(article_id = article.id, "Article updated");

        Ok(article)
    }

    /// Delete an article
    pub async fn delete(&self, id: i64) -> Result<(), ArticleServiceError> {
        self.get_by_id(id).await?;
        self.repo
            .delete(id)
            .await
            .context("Failed to delete article")?;

        tracing::info!(article_id = id, "Article deleted");

        Ok(())
    }

    /// Publish all drafts whose scheduled time has passed
    pub async fn publish_due(&self) -> Result<Vec<Article>, ArticleServiceError> {
        let published = self
            .repo
            .publish_due()
            .await
            .context("Failed to publish due articles")?;

        if !published.is_empty() {
            tracing::info!(count = published.len(), "Published scheduled articles");
        }

        Ok(published)
    }

    /// Aggregate article statistics
    pub async fn stats(&self) -> Result<ArticleStats, ArticleServiceError> {
        Ok(self
            .repo
            .stats()
            .await
            .context("Failed to get article stats")?)
    }

    fn validate_create_input(&self, input: &CreateArticleInput) -> Result<(), ArticleServiceError> {
        if input.title.trim().is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if input.title.chars().count() > MAX_TITLE_LEN {
            return Err(ArticleServiceError::ValidationError(format!(
                "Title cannot exceed {} characters",
                MAX_TITLE_LEN
            )));
        }
        if input.content.trim().is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Content cannot be empty".to_string(),
            ));
        }
        if let Some(excerpt) = &input.excerpt {
            if excerpt.chars().count() > MAX_EXCERPT_LEN {
                return Err(ArticleServiceError::ValidationError(format!(
                    "Excerpt cannot exceed {} characters",
                    MAX_EXCERPT_LEN
                )));
            }
        }
        Ok(())
    }

    fn validate_update_input(&self, input: &UpdateArticleInput) -> Result<(), ArticleServiceError> {
        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(ArticleServiceError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
            if title.chars().count() > MAX_TITLE_LEN {
                return Err(ArticleServiceError::ValidationError(format!(
                    "Title cannot exceed {} characters",
                    MAX_TITLE_LEN
                )));
            }
        }
        if let Some(content) = &input.content {
            if content.trim().is_empty() {
                return Err(ArticleServiceError::ValidationError(
                    "Content cannot be empty".to_string(),
                ));
            }
        }
        if let Some(excerpt) = &input.excerpt {
            if excerpt.chars().count() > MAX_EXCERPT_LEN {
                return Err(ArticleServiceError::ValidationError(format!(
                    "Excerpt cannot exceed {} characters",
                    MAX_EXCERPT_LEN
                )));
            }
        }
        Ok(())
    }
}

/// Generate a URL-friendly slug from a title
pub fn generate_slug(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c
            } else {
                '-'
            }
        })
        .collect();

    // Collapse consecutive hyphens and trim hyphens from the ends
    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in slug.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxArticleRepository;
    use crate::db::{migrations, Database};
    use crate::models::ArticleStatus;
    use chrono::{Duration, Utc};

    async fn setup_service() -> ArticleService {
        let db = Database::connect_test()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");
        ArticleService::new(SqlxArticleRepository::shared(db.pool().clone()))
    }

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
        assert_eq!(
            generate_slug("Laser Cutting: Cost & Speed!"),
            "laser-cutting-cost-speed"
        );
        assert_eq!(generate_slug("  --Multiple---Hyphens--  "), "multiple-hyphens");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[tokio::test]
    async fn test_create_generates_slug() {
        let service = setup_service().await;

        let article = service
            .create(CreateArticleInput::new("Fiber Laser Basics", "Content"))
            .await
            .expect("Failed to create article");

        assert_eq!(article.slug, "fiber-laser-basics");
        assert_eq!(article.status, ArticleStatus::Draft);
    }

    #[tokio::test]
    async fn test_create_uses_explicit_slug() {
        let service = setup_service().await;

        let input = CreateArticleInput::new("Some Title", "Content").with_slug("custom-slug");
        let article = service.create(input).await.unwrap();
        assert_eq!(article.slug, "custom-slug");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_slug() {
        let service = setup_service().await;

        service
            .create(CreateArticleInput::new("Same Title", "Content"))
            .await
            .unwrap();
        let err = service
            .create(CreateArticleInput::new("Same Title", "Other content"))
            .await
            .unwrap_err();

        assert!(matches!(err, ArticleServiceError::DuplicateSlug(_)));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let service = setup_service().await;

        let err = service
            .create(CreateArticleInput::new("", "Content"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleServiceError::ValidationError(_)));

        let err = service
            .create(CreateArticleInput::new("Title", "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleServiceError::ValidationError(_)));

        let long_title = "x".repeat(MAX_TITLE_LEN + 1);
        let err = service
            .create(CreateArticleInput::new(long_title, "Content"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_get_published_counts_view() {
        let service = setup_service().await;

        let input =
            CreateArticleInput::new("Published", "Content").with_status(ArticleStatus::Published);
        let created = service.create(input).await.unwrap();

        service.get_published_by_slug(&created.slug).await.unwrap();
        service.get_published_by_slug(&created.slug).await.unwrap();

        let fresh = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fresh.views, 2);
    }

    #[tokio::test]
    async fn test_get_published_hides_drafts() {
        let service = setup_service().await;

        let created = service
            .create(CreateArticleInput::new("Draft", "Content"))
            .await
            .unwrap();

        let err = service
            .get_published_by_slug(&created.slug)
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_input_and_slug_conflicts() {
        let service = setup_service().await;

        let first = service
            .create(CreateArticleInput::new("First", "Content"))
            .await
            .unwrap();
        let second = service
            .create(CreateArticleInput::new("Second", "Content"))
            .await
            .unwrap();

        let err = service
            .update(first.id, UpdateArticleInput::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleServiceError::ValidationError(_)));

        let err = service
            .update(second.id, UpdateArticleInput::new().with_slug("first"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleServiceError::DuplicateSlug(_)));

        // Keeping your own slug is fine
        let updated = service
            .update(
                second.id,
                UpdateArticleInput::new()
                    .with_slug("second")
                    .with_title("Second, revised"),
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Second, revised");
    }

    #[tokio::test]
    async fn test_update_missing_article() {
        let service = setup_service().await;

        let err = service
            .update(4242, UpdateArticleInput::new().with_title("Nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = setup_service().await;

        let created = service
            .create(CreateArticleInput::new("Doomed", "Content"))
            .await
            .unwrap();
        service.delete(created.id).await.unwrap();

        let err = service.get_by_id(created.id).await.unwrap_err();
        assert!(matches!(err, ArticleServiceError::NotFound(_)));

        let err = service.delete(created.id).await.unwrap_err();
        assert!(matches!(err, ArticleServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_publish_due() {
        let service = setup_service().await;

        let mut input = CreateArticleInput::new("Scheduled", "Content");
        input.published_at = Some(Utc::now() - Duration::minutes(5));
        let scheduled = service.create(input).await.unwrap();

        let published = service.publish_due().await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, scheduled.id);

        let fresh = service.get_by_id(scheduled.id).await.unwrap();
        assert_eq!(fresh.status, ArticleStatus::Published);
    }

    #[tokio::test]
    async fn test_list_and_stats() {
        let service = setup_service().await;

        service
            .create(CreateArticleInput::new("Draft One", "Content"))
            .await
            .unwrap();
        service
            .create(
                CreateArticleInput::new("Published One", "Content")
                    .with_status(ArticleStatus::Published),
            )
            .await
            .unwrap();

        let page = service
            .list(&ArticleFilters::default(), &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        let published = service
            .list(&ArticleFilters::published(), &ListParams::default())
            .await
            .unwrap();
        assert_eq!(published.total, 1);

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.draft, 1);
        assert_eq!(stats.published, 1);
    }
}
