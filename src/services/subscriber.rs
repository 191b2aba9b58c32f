//! Subscriber service
//!
//! Implements business logic for newsletter subscriptions:
//! - Signup with confirmation tokens
//! - Double opt-in confirmation
//! - Unsubscribe with soft deletion
//! - Validation

use crate::db::repositories::SubscriberRepository;
use crate::models::{CreateSubscriberInput, ListParams, PagedResult, Subscriber, SubscriberStats};
use anyhow::Context;
use std::sync::Arc;

/// Maximum email address length
const MAX_EMAIL_LEN: usize = 255;

/// Error types for subscriber service operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberServiceError {
    /// Subscriber not found
    #[error("Subscriber not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Email already subscribed
    #[error("Email already subscribed")]
    AlreadySubscribed,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Subscriber service for newsletter management
pub struct SubscriberService {
    repo: Arc<dyn SubscriberRepository>,
}

impl SubscriberService {
    /// Create a new subscriber service
    pub fn new(repo: Arc<dyn SubscriberRepository>) -> Self {
        Self { repo }
    }

    /// Subscribe an email address
    ///
    /// A previously unsubscribed address is reactivated with a fresh
    /// confirmation token; an active one is rejected.
    pub async fn subscribe(
        &self,
        input: CreateSubscriberInput,
    ) -> Result<Subscriber, SubscriberServiceError> {
        let email = normalize_email(&input.email)?;
        let input = CreateSubscriberInput {
            email: email.clone(),
            ..input
        };

        let token = generate_token().context("Failed to generate confirmation token")?;

        if let Some(existing) = self
            .repo
            .get_by_email(&email)
            .await
            .context("Failed to look up subscriber")?
        {
            if existing.is_active() {
                return Err(SubscriberServiceError::AlreadySubscribed);
            }

            let subscriber = self
                .repo
                .resubscribe(existing.id, &input, &token)
                .await
                .context("Failed to resubscribe")?;
            tracing::info!(subscriber_id = subscriber.id, "Subscriber reactivated");
            return Ok(subscriber);
        }

        let subscriber = self
            .repo
            .create(&input, &token)
            .await
            .context("Failed to create subscriber")?;

        tracing::info!(subscriber_id = subscriber.id, "New subscriber");

        Ok(subscriber)
    }

    /// Confirm a subscription by its token
    pub async fn confirm(&self, token: &str) -> Result<Subscriber, SubscriberServiceError> {
        let subscriber = self
            .repo
            .get_by_token(token)
            .await
            .context("Failed to look up token")?
            .ok_or_else(|| SubscriberServiceError::NotFound("invalid token".to_string()))?;

        let confirmed = self
            .repo
            .confirm(subscriber.id)
            .await
            .context("Failed to confirm subscriber")?;

        tracing::info!(subscriber_id = confirmed.id, "Subscription confirmed");

        Ok(confirmed)
    }

    /// Unsubscribe an email address, keeping the row for history
    pub async fn unsubscribe(
        &self,
        email: &str,
        reason: Option<&str>,
    ) -> Result<Subscriber, SubscriberServiceError> {
        let email = normalize_email(email)?;

        let subscriber = self
            .repo
            .get_by_email(&email)
            .await
            .context("Failed to look up subscriber")?
            .ok_or_else(|| SubscriberServiceError::NotFound(email.clone()))?;

        if !subscriber.is_active() {
            return Err(SubscriberServiceError::NotFound(email));
        }

        let unsubscribed = self
            .repo
            .unsubscribe(subscriber.id, reason)
            .await
            .context("Failed to unsubscribe")?;

        tracing::info!(subscriber_id = unsubscribed.id, "Subscriber unsubscribed");

        Ok(unsubscribed)
    }

    /// Replace an active subscriber's topic preferences and frequency
    pub async fn update_preferences(
        &self,
        email: &str,
        preferences: Vec<String>,
        frequency: Option<String>,
    ) -> Result<Subscriber, SubscriberServiceError> {
        let email = normalize_email(email)?;

        let subscriber = self
            .repo
            .get_by_email(&email)
            .await
            .context("Failed to look up subscriber")?
            .filter(|s| s.is_active())
            .ok_or_else(|| SubscriberServiceError::NotFound(email.clone()))?;

        let updated = self
            .repo
            .update_preferences(subscriber.id, &preferences, frequency.as_deref())
            .await
            .context("Failed to update preferences")?;

        tracing::info!(subscriber_id = updated.id, "Subscriber preferences updated");

        Ok(updated)
    }

    /// List active subscribers with pagination
    pub async fn list(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<Subscriber>, SubscriberServiceError> {
        let items = self
            .repo
            .list(params.offset(), params.limit())
            .await
            .context("Failed to list subscribers")?;
        let total = self
            .repo
            .count()
            .await
            .context("Failed to count subscribers")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Delete a subscriber outright
    pub async fn delete(&self, id: i64) -> Result<(), SubscriberServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to look up subscriber")?
            .ok_or_else(|| SubscriberServiceError::NotFound(format!("id {}", id)))?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete subscriber")?;

        Ok(())
    }

    /// Aggregate subscriber statistics
    pub async fn stats(&self) -> Result<SubscriberStats, SubscriberServiceError> {
        Ok(self
            .repo
            .stats()
            .await
            .context("Failed to get subscriber stats")?)
    }
}

/// Lowercase, trim, and sanity-check an email address
fn normalize_email(email: &str) -> Result<String, SubscriberServiceError> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(SubscriberServiceError::ValidationError(
            "Email cannot be empty".to_string(),
        ));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(SubscriberServiceError::ValidationError(format!(
            "Email cannot exceed {} characters",
            MAX_EMAIL_LEN
        )));
    }

    // Minimal shape check; real verification happens via the confirmation mail
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(SubscriberServiceError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }

    Ok(email)
}

/// Generate a random hex confirmation token
fn generate_token() -> anyhow::Result<String> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| anyhow::anyhow!("Failed to get random bytes: {}", e))?;

    let mut token = String::with_capacity(64);
    for byte in bytes {
        token.push_str(&format!("{:02x}", byte));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSubscriberRepository;
    use crate::db::{migrations, Database};

    async fn setup_service() -> SubscriberService {
        let db = Database::connect_test()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");
        SubscriberService::new(SqlxSubscriberRepository::shared(db.pool().clone()))
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Shop@Example.COM ").unwrap(),
            "shop@example.com"
        );
        assert!(normalize_email("").is_err());
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("user@nodot").is_err());
        assert!(normalize_email("@example.com").is_err());
    }

    #[test]
    fn test_generate_token_is_hex() {
        let token = generate_token().expect("Failed to generate token");
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        let other = generate_token().unwrap();
        assert_ne!(token, other);
    }

    #[tokio::test]
    async fn test_subscribe_and_confirm() {
        let service = setup_service().await;

        let subscriber = service
            .subscribe(CreateSubscriberInput::new("shop@example.com"))
            .await
            .expect("Failed to subscribe");
        assert!(!subscriber.is_confirmed);
        let token = subscriber.confirmation_token.clone().expect("token");

        let confirmed = service.confirm(&token).await.expect("Failed to confirm");
        assert!(confirmed.is_confirmed);
        assert!(confirmed.confirmed_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_subscribe_rejected() {
        let service = setup_service().await;

        service
            .subscribe(CreateSubscriberInput::new("dup@example.com"))
            .await
            .unwrap();
        let err = service
            .subscribe(CreateSubscriberInput::new("DUP@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriberServiceError::AlreadySubscribed));
    }

    #[tokio::test]
    async fn test_confirm_with_bad_token() {
        let service = setup_service().await;

        let err = service.confirm("not-a-token").await.unwrap_err();
        assert!(matches!(err, SubscriberServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unsubscribe_then_resubscribe() {
        let service = setup_service().await;

        service
            .subscribe(CreateSubscriberInput::new("cycle@example.com"))
            .await
            .unwrap();

        let gone = service
            .unsubscribe("cycle@example.com", Some("testing"))
            .await
            .expect("Failed to unsubscribe");
        assert!(!gone.is_active());

        // Unsubscribing again behaves like an unknown address
        let err = service
            .unsubscribe("cycle@example.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriberServiceError::NotFound(_)));

        // Resubscribing reactivates with a fresh token
        let back = service
            .subscribe(CreateSubscriberInput::new("cycle@example.com").with_source_tool("roi"))
            .await
            .expect("Failed to resubscribe");
        assert!(back.is_active());
        assert!(!back.is_confirmed);
        assert_eq!(back.source_tool.as_deref(), Some("roi"));
    }

    #[tokio::test]
    async fn test_list_and_stats_exclude_unsubscribed() {
        let service = setup_service().await;

        service
            .subscribe(CreateSubscriberInput::new("a@example.com"))
            .await
            .unwrap();
        service
            .subscribe(CreateSubscriberInput::new("b@example.com"))
            .await
            .unwrap();
        service.unsubscribe("b@example.com", None).await.unwrap();

        let page = service.list(&ListParams::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].email, "a@example.com");

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.unconfirmed, 1);
    }

    #[tokio::test]
    async fn test_update_preferences() {
        let service = setup_service().await;

        service
            .subscribe(CreateSubscriberInput::new("prefs@example.com"))
            .await
            .unwrap();

        let updated = service
            .update_preferences(
                "Prefs@Example.com",
                vec!["welding".to_string()],
                Some("monthly".to_string()),
            )
            .await
            .expect("Failed to update preferences");
        assert_eq!(updated.preferences, vec!["welding".to_string()]);
        assert_eq!(updated.frequency.as_deref(), Some("monthly"));

        // Unsubscribed addresses behave like unknown ones
        service.unsubscribe("prefs@example.com", None).await.unwrap();
        let err = service
            .update_preferences("prefs@example.com", Vec::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriberServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let service = setup_service().await;

        let err = service
            .subscribe(CreateSubscriberInput::new("bogus"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriberServiceError::ValidationError(_)));
    }
}
