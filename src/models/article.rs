//! Article model
//!
//! This module provides:
//! - `Article` entity representing a blog article
//! - `ArticleStatus` and `ArticleCategory` enums
//! - Input types for creating and updating articles
//! - Filter and pagination types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// URL-friendly slug
    pub slug: String,
    /// Short summary shown in listings
    pub excerpt: Option<String>,
    /// Article body
    pub content: String,
    /// Content category
    pub category: Option<ArticleCategory>,
    /// Tags (stored as a JSON string array)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Featured image URL
    pub featured_image: Option<String>,
    /// Author user ID
    pub author_id: Option<i64>,
    /// Publication status
    pub status: ArticleStatus,
    /// View count
    #[serde(default)]
    pub views: i64,
    /// Estimated reading time in minutes
    pub reading_time: Option<i64>,
    /// SEO title override
    pub meta_title: Option<String>,
    /// SEO description override
    pub meta_description: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Publication timestamp (also serves as the schedule for drafts)
    pub published_at: Option<DateTime<Utc>>,
}

/// Article publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Draft - not visible to public
    Draft,
    /// Published - visible to public
    Published,
    /// Archived - hidden but not deleted
    Archived,
}

impl Default for ArticleStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl ArticleStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(ArticleStatus::Draft),
            "published" => Some(ArticleStatus::Published),
            "archived" => Some(ArticleStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Article content category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArticleCategory {
    Tutorials,
    Industry,
    CaseStudies,
    News,
}

impl ArticleCategory {
    /// Convert category to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleCategory::Tutorials => "tutorials",
            ArticleCategory::Industry => "industry",
            ArticleCategory::CaseStudies => "case-studies",
            ArticleCategory::News => "news",
        }
    }

    /// Parse category from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tutorials" => Some(ArticleCategory::Tutorials),
            "industry" => Some(ArticleCategory::Industry),
            "case-studies" => Some(ArticleCategory::CaseStudies),
            "news" => Some(ArticleCategory::News),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArticleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateArticleInput {
    /// Article title
    pub title: String,
    /// URL-friendly slug (generated from the title when empty)
    #[serde(default)]
    pub slug: Option<String>,
    /// Short summary
    pub excerpt: Option<String>,
    /// Article body
    pub content: String,
    /// Content category
    pub category: Option<ArticleCategory>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Featured image URL
    pub featured_image: Option<String>,
    /// Author user ID
    pub author_id: Option<i64>,
    /// Publication status (defaults to Draft)
    pub status: Option<ArticleStatus>,
    /// Estimated reading time in minutes
    pub reading_time: Option<i64>,
    /// SEO title override
    pub meta_title: Option<String>,
    /// SEO description override
    pub meta_description: Option<String>,
    /// Schedule timestamp for drafts
    pub published_at: Option<DateTime<Utc>>,
}

impl CreateArticleInput {
    /// Create a new input with the required fields
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: ArticleCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: ArticleStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Input for updating an existing article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticleInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New slug (optional)
    pub slug: Option<String>,
    /// New excerpt (optional)
    pub excerpt: Option<String>,
    /// New content (optional)
    pub content: Option<String>,
    /// New category (optional)
    pub category: Option<ArticleCategory>,
    /// New tags (optional)
    pub tags: Option<Vec<String>>,
    /// New featured image (optional)
    pub featured_image: Option<String>,
    /// New status (optional)
    pub status: Option<ArticleStatus>,
    /// New reading time (optional)
    pub reading_time: Option<i64>,
    /// New SEO title (optional)
    pub meta_title: Option<String>,
    /// New SEO description (optional)
    pub meta_description: Option<String>,
    /// New publication/schedule timestamp (optional)
    pub published_at: Option<DateTime<Utc>>,
}

impl UpdateArticleInput {
    /// Create a new empty UpdateArticleInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set the content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: ArticleStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.slug.is_some()
            || self.excerpt.is_some()
            || self.content.is_some()
            || self.category.is_some()
            || self.tags.is_some()
            || self.featured_image.is_some()
            || self.status.is_some()
            || self.reading_time.is_some()
            || self.meta_title.is_some()
            || self.meta_description.is_some()
            || self.published_at.is_some()
    }
}

/// Optional filters for article list queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleFilters {
    /// Filter by publication status
    pub status: Option<ArticleStatus>,
    /// Filter by category
    pub category: Option<ArticleCategory>,
    /// Filter by tag membership
    pub tag: Option<String>,
    /// Substring search over title, content and excerpt
    pub search: Option<String>,
    /// Filter by author
    pub author_id: Option<i64>,
}

impl ArticleFilters {
    /// Filters that match only published articles
    pub fn published() -> Self {
        Self {
            status: Some(ArticleStatus::Published),
            ..Default::default()
        }
    }
}

/// Aggregate article statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleStats {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub archived: i64,
    pub total_views: i64,
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 10,
        }
    }
}
