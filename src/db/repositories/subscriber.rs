//! Subscriber repository
//!
//! Database operations for newsletter subscribers. Unsubscribing keeps the
//! row and sets `unsubscribed_at`; stats and listings only count active rows.

use crate::models::{CreateSubscriberInput, Subscriber, SubscriberStats};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Subscriber repository trait
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Create a new subscriber with a confirmation token
    async fn create(&self, input: &CreateSubscriberInput, token: &str) -> Result<Subscriber>;

    /// Get subscriber by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Subscriber>>;

    /// Get subscriber by email
    async fn get_by_email(&self, email: &str) -> Result<Option<Subscriber>>;

    /// Get subscriber by confirmation token
    async fn get_by_token(&self, token: &str) -> Result<Option<Subscriber>>;

    /// List active subscribers, newest first
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Subscriber>>;

    /// Count active subscribers
    async fn count(&self) -> Result<i64>;

    /// Mark a subscriber as confirmed
    async fn confirm(&self, id: i64) -> Result<Subscriber>;

    /// Mark a subscriber as unsubscribed, keeping the row
    async fn unsubscribe(&self, id: i64, reason: Option<&str>) -> Result<Subscriber>;

    /// Reactivate a previously unsubscribed address
    async fn resubscribe(&self, id: i64, input: &CreateSubscriberInput, token: &str)
        -> Result<Subscriber>;

    /// Replace the topic preferences and frequency
    async fn update_preferences(
        &self,
        id: i64,
        preferences: &[String],
        frequency: Option<&str>,
    ) -> Result<Subscriber>;

    /// Delete a subscriber outright
    async fn delete(&self, id: i64) -> Result<()>;

    /// Aggregate counts over active subscribers
    async fn stats(&self) -> Result<SubscriberStats>;
}

/// SQLx-based subscriber repository implementation
pub struct SqlxSubscriberRepository {
    pool: SqlitePool,
}

impl SqlxSubscriberRepository {
    /// Create a new SQLx subscriber repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn shared(pool: SqlitePool) -> Arc<dyn SubscriberRepository> {
        Arc::new(Self::new(pool))
    }
}

const SUBSCRIBER_COLUMNS: &str = "id, email, source_tool, source_page, is_confirmed, \
     confirmation_token, ip_address, user_agent, subscribed_at, confirmed_at, \
     unsubscribed_at, preferences, frequency, unsubscribe_reason";

#[async_trait]
impl SubscriberRepository for SqlxSubscriberRepository {
    async fn create(&self, input: &CreateSubscriberInput, token: &str) -> Result<Subscriber> {
        let now = Utc::now();
        let preferences_json = serde_json::to_string(&input.preferences)
            .context("Failed to serialize subscriber preferences")?;

        let result = sqlx::query(
            r#"
            INSERT INTO subscribers (email, source_tool, source_page, is_confirmed, confirmation_token, ip_address, user_agent, subscribed_at, preferences, frequency)
            VALUES (?, ?, ?, FALSE, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.email)
        .bind(&input.source_tool)
        .bind(&input.source_page)
        .bind(token)
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .bind(now)
        .bind(&preferences_json)
        .bind(&input.frequency)
        .execute(&self.pool)
        .await
        .context("Failed to create subscriber")?;

        Ok(Subscriber {
            id: result.last_insert_rowid(),
            email: input.email.clone(),
            source_tool: input.source_tool.clone(),
            source_page: input.source_page.clone(),
            is_confirmed: false,
            confirmation_token: Some(token.to_string()),
            ip_address: input.ip_address.clone(),
            user_agent: input.user_agent.clone(),
            subscribed_at: now,
            confirmed_at: None,
            unsubscribed_at: None,
            preferences: input.preferences.clone(),
            frequency: input.frequency.clone(),
            unsubscribe_reason: None,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscriber>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscribers WHERE id = ?",
            SUBSCRIBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get subscriber by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_subscriber(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Subscriber>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscribers WHERE email = ?",
            SUBSCRIBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get subscriber by email")?;

        match row {
            Some(row) => Ok(Some(row_to_subscriber(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<Subscriber>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscribers WHERE confirmation_token = ?",
            SUBSCRIBER_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get subscriber by token")?;

        match row {
            Some(row) => Ok(Some(row_to_subscriber(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Subscriber>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM subscribers WHERE unsubscribed_at IS NULL ORDER BY subscribed_at DESC LIMIT ? OFFSET ?",
            SUBSCRIBER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list subscribers")?;

        let mut subscribers = Vec::new();
        for row in rows {
            subscribers.push(row_to_subscriber(&row)?);
        }

        Ok(subscribers)
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM subscribers WHERE unsubscribed_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count subscribers")?;

        Ok(row.get("count"))
    }

    async fn confirm(&self, id: i64) -> Result<Subscriber> {
        let now = Utc::now();

        sqlx::query(
            "UPDATE subscribers SET is_confirmed = TRUE, confirmed_at = ?, confirmation_token = NULL WHERE id = ?",
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to confirm subscriber")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Subscriber not found after confirm"))
    }

    async fn unsubscribe(&self, id: i64, reason: Option<&str>) -> Result<Subscriber> {
        let now = Utc::now();

        sqlx::query(
            "UPDATE subscribers SET unsubscribed_at = ?, unsubscribe_reason = ? WHERE id = ?",
        )
        .bind(now)
        .bind(reason)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to unsubscribe subscriber")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Subscriber not found after unsubscribe"))
    }

    async fn resubscribe(
        &self,
        id: i64,
        input: &CreateSubscriberInput,
        token: &str,
    ) -> Result<Subscriber> {
        let now = Utc::now();
        let preferences_json = serde_json::to_string(&input.preferences)
            .context("Failed to serialize subscriber preferences")?;

        sqlx::query(
            r#"
            UPDATE subscribers
            SET source_tool = ?, source_page = ?, is_confirmed = FALSE, confirmation_token = ?,
                ip_address = ?, user_agent = ?, subscribed_at = ?, confirmed_at = NULL,
                unsubscribed_at = NULL, preferences = ?, frequency = ?, unsubscribe_reason = NULL
            WHERE id = ?
            "#,
        )
        .bind(&input.source_tool)
        .bind(&input.source_page)
        .bind(token)
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .bind(now)
        .bind(&preferences_json)
        .bind(&input.frequency)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to resubscribe subscriber")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Subscriber not found after resubscribe"))
    }

    async fn update_preferences(
        &self,
        id: i64,
        preferences: &[String],
        frequency: Option<&str>,
    ) -> Result<Subscriber> {
        let preferences_json = serde_json::to_string(preferences)
            .context("Failed to serialize subscriber preferences")?;

        sqlx::query("UPDATE subscribers SET preferences = ?, frequency = ? WHERE id = ?")
            .bind(&preferences_json)
            .bind(frequency)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update subscriber preferences")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Subscriber not found after preference update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM subscribers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete subscriber")?;

        Ok(())
    }

    async fn stats(&self) -> Result<SubscriberStats> {
        let now = Utc::now();
        let day_ago = now - Duration::days(1);
        let week_ago = now - Duration::days(7);
        let month_ago = now - Duration::days(30);

        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as total,
                COALESCE(SUM(CASE WHEN is_confirmed THEN 1 ELSE 0 END), 0) as confirmed,
                COALESCE(SUM(CASE WHEN NOT is_confirmed THEN 1 ELSE 0 END), 0) as unconfirmed,
                COALESCE(SUM(CASE WHEN subscribed_at >= ? THEN 1 ELSE 0 END), 0) as today,
                COALESCE(SUM(CASE WHEN subscribed_at >= ? THEN 1 ELSE 0 END), 0) as this_week,
                COALESCE(SUM(CASE WHEN subscribed_at >= ? THEN 1 ELSE 0 END), 0) as this_month
            FROM subscribers
            WHERE unsubscribed_at IS NULL
            "#,
        )
        .bind(day_ago)
        .bind(week_ago)
        .bind(month_ago)
        .fetch_one(&self.pool)
        .await
        .context("Failed to get subscriber stats")?;

        Ok(SubscriberStats {
            total: row.get("total"),
            confirmed: row.get("confirmed"),
            unconfirmed: row.get("unconfirmed"),
            today: row.get("today"),
            this_week: row.get("this_week"),
            this_month: row.get("this_month"),
        })
    }
}

fn row_to_subscriber(row: &sqlx::sqlite::SqliteRow) -> Result<Subscriber> {
    let preferences: Vec<String> = match row.try_get::<Option<String>, _>("preferences")? {
        Some(json) if !json.is_empty() => {
            serde_json::from_str(&json).context("Failed to parse subscriber preferences")?
        }
        _ => Vec::new(),
    };

    Ok(Subscriber {
        id: row.get("id"),
        email: row.get("email"),
        source_tool: row.get("source_tool"),
        source_page: row.get("source_page"),
        is_confirmed: row.get("is_confirmed"),
        confirmation_token: row.get("confirmation_token"),
        ip_address: row.get("ip_address"),
        user_agent: row.get("user_agent"),
        subscribed_at: row.get("subscribed_at"),
        confirmed_at: row.get("confirmed_at"),
        unsubscribed_at: row.get("unsubscribed_at"),
        preferences,
        frequency: row.get("frequency"),
        unsubscribe_reason: row.get("unsubscribe_reason"),
    })
}
