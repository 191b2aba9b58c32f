//! Database layer
//!
//! SQLite persistence for the LaserCalc backend: the connection pool wrapper,
//! embedded migrations, and repository traits with their sqlx implementations.
//!
//! # Usage
//!
//! ```ignore
//! use lasercalc::config::DatabaseConfig;
//! use lasercalc::db::{Database, migrations};
//!
//! let db = Database::from_config(&config).await?;
//! migrations::run_migrations(db.pool()).await?;
//! db.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::Database;
