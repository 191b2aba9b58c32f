//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod article;
pub mod calculation;
pub mod subscriber;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use calculation::{CalculationRepository, SqlxCalculationRepository};
pub use subscriber::{SqlxSubscriberRepository, SubscriberRepository};
