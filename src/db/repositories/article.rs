//! Article repository
//!
//! Database operations for articles.
//!
//! This module provides:
//! - `ArticleRepository` trait defining the interface for article data access
//! - `SqlxArticleRepository` implementing the trait for SQLite

use crate::models::{
    Article, ArticleCategory, ArticleFilters, ArticleStats, ArticleStatus, CreateArticleInput,
    UpdateArticleInput,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create a new article with an already-resolved slug
    async fn create(&self, slug: &str, input: &CreateArticleInput) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Get article by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// List articles matching the filters, newest first
    async fn list(&self, filters: &ArticleFilters, offset: i64, limit: i64)
        -> Result<Vec<Article>>;

    /// Count articles matching the filters
    async fn count(&self, filters: &ArticleFilters) -> Result<i64>;

    /// Update an article
    async fn update(&self, id: i64, input: &UpdateArticleInput) -> Result<Article>;

    /// Delete an article
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Check if a slug exists for a different article (for updates)
    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool>;

    /// Publish drafts whose scheduled time has passed, returning them
    async fn publish_due(&self) -> Result<Vec<Article>>;

    /// Aggregate counts by status plus total views
    async fn stats(&self) -> Result<ArticleStats>;

    /// Increment the view counter for an article
    async fn increment_views(&self, id: i64) -> Result<()>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: SqlitePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn shared(pool: SqlitePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

const ARTICLE_COLUMNS: &str = "id, title, slug, excerpt, content, category, tags, featured_image, \
     author_id, status, views, reading_time, meta_title, meta_description, \
     created_at, updated_at, published_at";

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, slug: &str, input: &CreateArticleInput) -> Result<Article> {
        let now = Utc::now();
        let status = input.status.unwrap_or_default();
        // Published articles get stamped now; drafts may carry a schedule
        let published_at = if status == ArticleStatus::Published {
            Some(now)
        } else {
            input.published_at
        };
        let tags_json =
            serde_json::to_string(&input.tags).context("Failed to serialize article tags")?;

        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, slug, excerpt, content, category, tags, featured_image, author_id, status, views, reading_time, meta_title, meta_description, created_at, updated_at, published_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(slug)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(input.category.map(|c| c.as_str()))
        .bind(&tags_json)
        .bind(&input.featured_image)
        .bind(input.author_id)
        .bind(status.as_str())
        .bind(input.reading_time)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .bind(now)
        .bind(now)
        .bind(published_at)
        .execute(&self.pool)
        .await
        .context("Failed to create article")?;

        let id = result.last_insert_rowid();

        Ok(Article {
            id,
            title: input.title.clone(),
            slug: slug.to_string(),
            excerpt: input.excerpt.clone(),
            content: input.content.clone(),
            category: input.category,
            tags: input.tags.clone(),
            featured_image: input.featured_image.clone(),
            author_id: input.author_id,
            status,
            views: 0,
            reading_time: input.reading_time,
            meta_title: input.meta_title.clone(),
            meta_description: input.meta_description.clone(),
            created_at: now,
            updated_at: now,
            published_at,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE id = ?",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get article by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_article(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE slug = ?",
            ARTICLE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get article by slug")?;

        match row {
            Some(row) => Ok(Some(row_to_article(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filters: &ArticleFilters,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Article>> {
        let (where_clause, binds) = build_filter_clause(filters);
        let sql = format!(
            "SELECT {} FROM articles{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            ARTICLE_COLUMNS, where_clause
        );

        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list articles")?;

        let mut articles = Vec::new();
        for row in rows {
            articles.push(row_to_article(&row)?);
        }

        Ok(articles)
    }

    async fn count(&self, filters: &ArticleFilters) -> Result<i64> {
        let (where_clause, binds) = build_filter_clause(filters);
        let sql = format!("SELECT COUNT(*) as count FROM articles{}", where_clause);

        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let row = query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count articles")?;

        Ok(row.get("count"))
    }

    async fn update(&self, id: i64, input: &UpdateArticleInput) -> Result<Article> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Article not found"))?;

        let now = Utc::now();
        let new_title = input.title.as_ref().unwrap_or(&existing.title);
        let new_slug = input.slug.as_ref().unwrap_or(&existing.slug);
        let new_excerpt = input.excerpt.clone().or(existing.excerpt.clone());
        let new_content = input.content.as_ref().unwrap_or(&existing.content);
        let new_category = input.category.or(existing.category);
        let new_tags = input.tags.as_ref().unwrap_or(&existing.tags);
        let new_featured_image = input
            .featured_image
            .clone()
            .or(existing.featured_image.clone());
        let new_status = input.status.unwrap_or(existing.status);
        let new_reading_time = input.reading_time.or(existing.reading_time);
        let new_meta_title = input.meta_title.clone().or(existing.meta_title.clone());
        let new_meta_description = input
            .meta_description
            .clone()
            .or(existing.meta_description.clone());

        // Stamp published_at on the draft-to-published transition unless the
        // caller set an explicit timestamp
        let new_published_at = if let Some(ts) = input.published_at {
            Some(ts)
        } else if new_status == ArticleStatus::Published
            && existing.status != ArticleStatus::Published
        {
            Some(now)
        } else {
            existing.published_at
        };

        let tags_json =
            serde_json::to_string(new_tags).context("Failed to serialize article tags")?;

        sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, slug = ?, excerpt = ?, content = ?, category = ?, tags = ?, featured_image = ?, status = ?, reading_time = ?, meta_title = ?, meta_description = ?, updated_at = ?, published_at = ?
            WHERE id = ?
            "#,
        )
        .bind(new_title)
        .bind(new_slug)
        .bind(&new_excerpt)
        .bind(new_content)
        .bind(new_category.map(|c| c.as_str()))
        .bind(&tags_json)
        .bind(&new_featured_image)
        .bind(new_status.as_str())
        .bind(new_reading_time)
        .bind(&new_meta_title)
        .bind(&new_meta_description)
        .bind(now)
        .bind(new_published_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update article")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Article not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article")?;

        Ok(())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM articles WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check article slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM articles WHERE slug = ? AND id != ?")
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check article slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn publish_due(&self) -> Result<Vec<Article>> {
        let now = Utc::now();

        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE status = 'draft' AND published_at IS NOT NULL AND published_at <= ?",
            ARTICLE_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find due articles")?;

        let mut published = Vec::new();
        for row in rows {
            let mut article = row_to_article(&row)?;

            sqlx::query("UPDATE articles SET status = 'published', updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(article.id)
                .execute(&self.pool)
                .await
                .context("Failed to publish due article")?;

            article.status = ArticleStatus::Published;
            article.updated_at = now;
            published.push(article);
        }

        Ok(published)
    }

    async fn stats(&self) -> Result<ArticleStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as total,
                COALESCE(SUM(CASE WHEN status = 'published' THEN 1 ELSE 0 END), 0) as published,
                COALESCE(SUM(CASE WHEN status = 'draft' THEN 1 ELSE 0 END), 0) as draft,
                COALESCE(SUM(CASE WHEN status = 'archived' THEN 1 ELSE 0 END), 0) as archived,
                COALESCE(SUM(views), 0) as total_views
            FROM articles
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to get article stats")?;

        Ok(ArticleStats {
            total: row.get("total"),
            published: row.get("published"),
            draft: row.get("draft"),
            archived: row.get("archived"),
            total_views: row.get("total_views"),
        })
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE articles SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment article views")?;

        Ok(())
    }
}

/// Build a WHERE clause and its bind values from the filters
fn build_filter_clause(filters: &ArticleFilters) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(status) = filters.status {
        conditions.push("status = ?".to_string());
        binds.push(status.as_str().to_string());
    }
    if let Some(category) = filters.category {
        conditions.push("category = ?".to_string());
        binds.push(category.as_str().to_string());
    }
    if let Some(tag) = &filters.tag {
        // Tags are stored as a JSON array of strings
        conditions.push("tags LIKE ?".to_string());
        binds.push(format!("%\"{}\"%", tag));
    }
    if let Some(search) = &filters.search {
        conditions
            .push("(title LIKE ? OR content LIKE ? OR COALESCE(excerpt, '') LIKE ?)".to_string());
        let pattern = format!("%{}%", search);
        binds.push(pattern.clone());
        binds.push(pattern.clone());
        binds.push(pattern);
    }
    if let Some(author_id) = filters.author_id {
        conditions.push("author_id = ?".to_string());
        binds.push(author_id.to_string());
    }

    if conditions.is_empty() {
        (String::new(), binds)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), binds)
    }
}

fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let status_str: String = row.get("status");
    let status = ArticleStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid article status: {}", status_str))?;

    let category = row
        .try_get::<Option<String>, _>("category")?
        .and_then(|s| ArticleCategory::from_str(&s));

    let tags: Vec<String> = match row.try_get::<Option<String>, _>("tags")? {
        Some(json) if !json.is_empty() => {
            serde_json::from_str(&json).context("Failed to parse article tags")?
        }
        _ => Vec::new(),
    };

    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        category,
        tags,
        featured_image: row.get("featured_image"),
        author_id: row.get("author_id"),
        status,
        views: row.try_get("views").unwrap_or(0),
        reading_time: row.get("reading_time"),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        published_at: row.get("published_at"),
    })
}
