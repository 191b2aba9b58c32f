//! Calculation analytics model
//!
//! Every calculator run handled by the API is recorded with its input
//! parameters and result payload so usage can be analyzed later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded calculator run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calculation {
    /// Unique identifier
    pub id: i64,
    /// Calculator tool identifier, e.g. "laser-cutting"
    pub tool_type: String,
    /// Input parameters as submitted (JSON)
    pub params: serde_json::Value,
    /// Calculation result (JSON)
    pub result: serde_json::Value,
    /// When the calculation ran
    pub created_at: DateTime<Utc>,
}

/// Per-tool usage counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUsage {
    /// Calculator tool identifier
    pub tool_type: String,
    /// Number of recorded runs
    pub count: i64,
}

/// Aggregate calculation analytics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationStats {
    /// Total recorded runs
    pub total: i64,
    /// Runs in the last 24 hours
    pub today: i64,
    /// Runs in the last 7 days
    pub this_week: i64,
    /// Per-tool breakdown, most used first
    pub by_tool: Vec<ToolUsage>,
}
