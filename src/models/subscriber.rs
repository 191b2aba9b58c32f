//! Subscriber model
//!
//! Newsletter subscribers captured from the calculator pages. A subscriber
//! stays in the table for its whole lifecycle; unsubscribing sets
//! `unsubscribed_at` rather than deleting the row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Newsletter subscriber entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    /// Unique identifier
    pub id: i64,
    /// Subscriber email address
    pub email: String,
    /// Calculator tool the signup came from
    pub source_tool: Option<String>,
    /// Page the signup came from
    pub source_page: Option<String>,
    /// Whether the email address has been confirmed
    pub is_confirmed: bool,
    /// Token used for email confirmation links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_token: Option<String>,
    /// IP address recorded at signup
    pub ip_address: Option<String>,
    /// User agent recorded at signup
    pub user_agent: Option<String>,
    /// Signup timestamp
    pub subscribed_at: DateTime<Utc>,
    /// Confirmation timestamp
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Unsubscribe timestamp (set instead of deleting the row)
    pub unsubscribed_at: Option<DateTime<Utc>>,
    /// Topic preferences (stored as a JSON string array)
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Email frequency preference
    pub frequency: Option<String>,
    /// Reason given when unsubscribing
    pub unsubscribe_reason: Option<String>,
}

impl Subscriber {
    /// Whether the subscriber is still active (has not unsubscribed)
    pub fn is_active(&self) -> bool {
        self.unsubscribed_at.is_none()
    }
}

/// Input for creating a new subscriber
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSubscriberInput {
    /// Email address
    pub email: String,
    /// Calculator tool the signup came from
    pub source_tool: Option<String>,
    /// Page the signup came from
    pub source_page: Option<String>,
    /// IP address recorded at signup
    pub ip_address: Option<String>,
    /// User agent recorded at signup
    pub user_agent: Option<String>,
    /// Topic preferences
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Email frequency preference
    pub frequency: Option<String>,
}

impl CreateSubscriberInput {
    /// Create a new input with the required email
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Set the source tool
    pub fn with_source_tool(mut self, tool: impl Into<String>) -> Self {
        self.source_tool = Some(tool.into());
        self
    }
}

/// Aggregate subscriber statistics over active subscribers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriberStats {
    pub total: i64,
    pub confirmed: i64,
    pub unconfirmed: i64,
    pub today: i64,
    pub this_week: i64,
    pub this_month: i64,
}
