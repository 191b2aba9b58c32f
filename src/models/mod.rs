//! Data models
//!
//! This module contains all data structures used throughout the LaserCalc
//! backend. Models represent:
//! - Database entities (Article, Subscriber, Calculation)
//! - Filter and pagination types for list queries
//! - Aggregate statistics types

mod article;
mod calculation;
mod subscriber;

pub use article::{
    Article, ArticleCategory, ArticleFilters, ArticleStats, ArticleStatus, CreateArticleInput,
    ListParams, PagedResult, UpdateArticleInput,
};
pub use calculation::{Calculation, CalculationStats, ToolUsage};
pub use subscriber::{CreateSubscriberInput, Subscriber, SubscriberStats};
