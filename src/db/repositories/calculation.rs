//! Calculation repository
//!
//! Analytics log for calculator runs. Every successful calculation is
//! recorded with its input and output payloads as JSON.

use crate::models::{Calculation, ToolUsage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Calculation repository trait
#[async_trait]
pub trait CalculationRepository: Send + Sync {
    /// Record a calculator run
    async fn record(
        &self,
        tool_type: &str,
        params: &serde_json::Value,
        result: &serde_json::Value,
    ) -> Result<Calculation>;

    /// Get calculation by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Calculation>>;

    /// List recent calculations, newest first, optionally filtered by tool
    async fn list_recent(
        &self,
        tool_type: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Calculation>>;

    /// Count calculations, optionally filtered by tool
    async fn count(&self, tool_type: Option<&str>) -> Result<i64>;

    /// Count calculations recorded since the given time
    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64>;

    /// Per-tool usage counts, most used first
    async fn usage_by_tool(&self) -> Result<Vec<ToolUsage>>;
}

/// SQLx-based calculation repository implementation
pub struct SqlxCalculationRepository {
    pool: SqlitePool,
}

impl SqlxCalculationRepository {
    /// Create a new SQLx calculation repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn shared(pool: SqlitePool) -> Arc<dyn CalculationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CalculationRepository for SqlxCalculationRepository {
    async fn record(
        &self,
        tool_type: &str,
        params: &serde_json::Value,
        result: &serde_json::Value,
    ) -> Result<Calculation> {
        let now = Utc::now();
        let params_json =
            serde_json::to_string(params).context("Failed to serialize calculation params")?;
        let result_json =
            serde_json::to_string(result).context("Failed to serialize calculation result")?;

        let insert = sqlx::query(
            "INSERT INTO calculations (tool_type, params, result, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(tool_type)
        .bind(&params_json)
        .bind(&result_json)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to record calculation")?;

        Ok(Calculation {
            id: insert.last_insert_rowid(),
            tool_type: tool_type.to_string(),
            params: params.clone(),
            result: result.clone(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Calculation>> {
        let row = sqlx::query(
            "SELECT id, tool_type, params, result, created_at FROM calculations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get calculation by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_calculation(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_recent(
        &self,
        tool_type: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Calculation>> {
        let rows = match tool_type {
            Some(tool) => {
                sqlx::query(
                    "SELECT id, tool_type, params, result, created_at FROM calculations WHERE tool_type = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
                )
                .bind(tool)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, tool_type, params, result, created_at FROM calculations ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list calculations")?;

        let mut calculations = Vec::new();
        for row in rows {
            calculations.push(row_to_calculation(&row)?);
        }

        Ok(calculations)
    }

    async fn count(&self, tool_type: Option<&str>) -> Result<i64> {
        let row = match tool_type {
            Some(tool) => {
                sqlx::query("SELECT COUNT(*) as count FROM calculations WHERE tool_type = ?")
                    .bind(tool)
                    .fetch_one(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT COUNT(*) as count FROM calculations")
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .context("Failed to count calculations")?;

        Ok(row.get("count"))
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM calculations WHERE created_at >= ?")
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count recent calculations")?;

        Ok(row.get("count"))
    }

    async fn usage_by_tool(&self) -> Result<Vec<ToolUsage>> {
        let rows = sqlx::query(
            "SELECT tool_type, COUNT(*) as count FROM calculations GROUP BY tool_type ORDER BY count DESC, tool_type ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to get tool usage")?;

        Ok(rows
            .iter()
            .map(|row| ToolUsage {
                tool_type: row.get("tool_type"),
                count: row.get("count"),
            })
            .collect())
    }
}

fn row_to_calculation(row: &sqlx::sqlite::SqliteRow) -> Result<Calculation> {
    let params_json: String = row.get("params");
    let result_json: String = row.get("result");

    Ok(Calculation {
        id: row.get("id"),
        tool_type: row.get("tool_type"),
        params: serde_json::from_str(&params_json).context("Failed to parse calculation params")?,
        result: serde_json::from_str(&result_json).context("Failed to parse calculation result")?,
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations, Database};
    use chrono::Duration;
    use serde_json::json;

    async fn setup_test_repo() -> SqlxCalculationRepository {
        let db = Database::connect_test()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");
        SqlxCalculationRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_record_and_get() {
        let repo = setup_test_repo().await;

        let params = json!({"thickness": 5.0, "materialType": "mild-steel"});
        let result = json!({"totalCost": 42.5});
        let recorded = repo
            .record("laser-cutting", &params, &result)
            .await
            .expect("Failed to record calculation");

        assert!(recorded.id > 0);
        assert_eq!(recorded.tool_type, "laser-cutting");

        let fetched = repo
            .get_by_id(recorded.id)
            .await
            .unwrap()
            .expect("Calculation not found");
        assert_eq!(fetched.params["thickness"], json!(5.0));
        assert_eq!(fetched.result["totalCost"], json!(42.5));
    }

    #[tokio::test]
    async fn test_list_recent_with_tool_filter() {
        let repo = setup_test_repo().await;

        for _ in 0..3 {
            repo.record("laser-cutting", &json!({}), &json!({}))
                .await
                .unwrap();
        }
        repo.record("welding", &json!({}), &json!({}))
            .await
            .unwrap();

        let all = repo.list_recent(None, 0, 10).await.unwrap();
        assert_eq!(all.len(), 4);

        let lasers = repo.list_recent(Some("laser-cutting"), 0, 10).await.unwrap();
        assert_eq!(lasers.len(), 3);

        assert_eq!(repo.count(None).await.unwrap(), 4);
        assert_eq!(repo.count(Some("welding")).await.unwrap(), 1);
        assert_eq!(repo.count(Some("roi")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first() {
        let repo = setup_test_repo().await;

        let first = repo.record("roi", &json!({"n": 1}), &json!({})).await.unwrap();
        let second = repo.record("roi", &json!({"n": 2}), &json!({})).await.unwrap();

        let recent = repo.list_recent(None, 0, 10).await.unwrap();
        assert_eq!(recent[0].id, second.id);
        assert_eq!(recent[1].id, first.id);
    }

    #[tokio::test]
    async fn test_count_since() {
        let repo = setup_test_repo().await;

        repo.record("energy", &json!({}), &json!({})).await.unwrap();

        let past = Utc::now() - Duration::hours(1);
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(repo.count_since(past).await.unwrap(), 1);
        assert_eq!(repo.count_since(future).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_usage_by_tool() {
        let repo = setup_test_repo().await;

        for _ in 0..3 {
            repo.record("laser-cutting", &json!({}), &json!({}))
                .await
                .unwrap();
        }
        for _ in 0..2 {
            repo.record("cnc-machining", &json!({}), &json!({}))
                .await
                .unwrap();
        }
        repo.record("welding", &json!({}), &json!({}))
            .await
            .unwrap();

        let usage = repo.usage_by_tool().await.expect("Failed to get usage");
        assert_eq!(usage.len(), 3);
        assert_eq!(usage[0].tool_type, "laser-cutting");
        assert_eq!(usage[0].count, 3);
        assert_eq!(usage[1].tool_type, "cnc-machining");
        assert_eq!(usage[2].count, 1);
    }
}
