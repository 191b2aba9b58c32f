//! Calculator engine
//!
//! Pure cost-estimation functions for laser-cutting job shops. Each calculator
//! lives in its own module and follows the same shape: an input struct with
//! serde defaults, a `validate` method enforcing parameter ranges, and a
//! `calculate` function producing a serializable result.
//!
//! Monetary outputs are rounded to 2 decimal places, times and weights to 4,
//! so results are stable across platforms and safe to compare in tests.

pub mod cnc_machining;
pub mod energy;
pub mod hourly_rate;
pub mod laser_cutting;
pub mod material_utilization;
pub mod quotation;
pub mod roi;
pub mod welding;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calculator input validation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
    #[error("part does not fit on the sheet with the given margins and spacing")]
    PartDoesNotFit,
}

/// Check that a value falls within an inclusive range
pub(crate) fn require_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), CalcError> {
    if !value.is_finite() || value < min || value > max {
        return Err(CalcError::OutOfRange { field, min, max });
    }
    Ok(())
}

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// An actionable cost-saving recommendation attached to a calculation result
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    /// Short machine-readable category, e.g. "peak_shifting"
    pub category: &'static str,
    pub priority: Priority,
    pub title: &'static str,
    pub description: String,
    /// Estimated annual savings in dollars, when quantifiable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
}

/// Round to 1 decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to 2 decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 4 decimal places
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_range() {
        assert!(require_range("thickness", 3.0, 0.1, 50.0).is_ok());
        assert!(require_range("thickness", 0.1, 0.1, 50.0).is_ok());
        assert!(require_range("thickness", 50.0, 0.1, 50.0).is_ok());

        let err = require_range("thickness", 0.0, 0.1, 50.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "thickness must be between 0.1 and 50"
        );
        assert!(require_range("thickness", f64::NAN, 0.1, 50.0).is_err());
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(7.4999), 7.5);
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round4(0.12345), 0.1235);
        assert_eq!(round1(3.26), 3.3);
    }

    #[test]
    fn test_recommendation_serializes() {
        let rec = Recommendation {
            category: "peak_shifting",
            priority: Priority::High,
            title: "Shift work to off-peak hours",
            description: "Move 20% of runtime to off-peak".to_string(),
            savings: None,
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["category"], "peak_shifting");
        assert_eq!(value["priority"], "high");
        assert!(value.get("savings").is_none());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }
}
