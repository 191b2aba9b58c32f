//! Database connection pool
//!
//! The backend persists to SQLite (the deployment targets are file-backed or
//! in-memory databases). The pool wrapper handles directory creation for
//! file-backed databases and exposes an in-memory constructor for tests.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// SQLite connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new connection pool from a path or sqlite URL
    pub async fn connect(url: &str) -> Result<Self> {
        // Ensure the database directory exists for file-based SQLite
        if !url.starts_with(":memory:") && !url.starts_with("sqlite::memory:") {
            let path = if url.starts_with("sqlite:") {
                url.trim_start_matches("sqlite:")
            } else {
                url
            };

            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory: {:?}", parent)
                    })?;
                }
            }
        }

        // Build the connection URL with create=true for file-based databases
        let connection_url = if url.starts_with("sqlite:") {
            if url.contains('?') {
                url.to_string()
            } else {
                format!("{}?mode=rwc", url)
            }
        } else if url == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", url)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(20)
            .connect(&connection_url)
            .await
            .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .context("Failed to enable foreign keys")?;

        Ok(Self { pool })
    }

    /// Create a pool from configuration
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::connect(&config.url).await
    }

    /// Create an in-memory database pool for testing
    pub async fn connect_test() -> Result<Self> {
        Self::connect(":memory:").await
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the database connection is healthy
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    /// Close the connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pool_creation() {
        let db = Database::connect_test().await.expect("Failed to create pool");
        db.ping().await.expect("Ping should succeed");
    }

    #[tokio::test]
    async fn test_pool_execute() {
        let db = Database::connect_test().await.expect("Failed to create pool");

        sqlx::query("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)")
            .execute(db.pool())
            .await
            .expect("Failed to create table");

        let affected = sqlx::query("INSERT INTO test (name) VALUES ('test')")
            .execute(db.pool())
            .await
            .expect("Failed to insert")
            .rows_affected();
        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn test_file_pool_creation() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let db = Database::connect(&db_path.to_string_lossy())
            .await
            .expect("Failed to create pool");
        db.ping().await.expect("Ping should succeed");

        // Verify the file was created
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_nested_directory_creation() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("dir").join("test.db");

        let db = Database::connect(&db_path.to_string_lossy())
            .await
            .expect("Failed to create pool");
        db.ping().await.expect("Ping should succeed");

        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = DatabaseConfig {
            url: ":memory:".to_string(),
        };
        let db = Database::from_config(&config).await.expect("Failed to create pool");
        db.ping().await.expect("Ping should succeed");
    }

    #[tokio::test]
    async fn test_pool_close() {
        let db = Database::connect_test().await.expect("Failed to create pool");
        db.close().await;
    }
}
