//! Calculation service
//!
//! Dispatches calculator requests by tool identifier, validates the input,
//! runs the pure calculator, and records the run for analytics.

use crate::calculators::{
    cnc_machining, energy, hourly_rate, laser_cutting, material_utilization, quotation, roi,
    welding, CalcError,
};
use crate::db::repositories::CalculationRepository;
use crate::models::{Calculation, CalculationStats, ListParams, PagedResult};
use anyhow::Context;
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Tool identifiers accepted by `run`
pub const TOOL_TYPES: &[&str] = &[
    "laser-cutting",
    "cnc-machining",
    "material-utilization",
    "energy",
    "roi",
    "welding",
    "hourly-rate",
    "quotation",
];

/// Error types for calculation service operations
#[derive(Debug, thiserror::Error)]
pub enum CalculationServiceError {
    /// Unrecognized tool identifier
    #[error("unknown tool type: {0}")]
    UnknownTool(String),

    /// Parameters failed to deserialize
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Parameters were out of range
    #[error("Validation error: {0}")]
    ValidationError(#[from] CalcError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Calculation service running calculators and recording analytics
pub struct CalculationService {
    repo: Arc<dyn CalculationRepository>,
}

impl CalculationService {
    /// Create a new calculation service
    pub fn new(repo: Arc<dyn CalculationRepository>) -> Self {
        Self { repo }
    }

    /// Run the named calculator over JSON parameters and record the result
    pub async fn run(
        &self,
        tool_type: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, CalculationServiceError> {
        let result = run_tool(tool_type, &params)?;

        self.repo
            .record(tool_type, &params, &result)
            .await
            .context("Failed to record calculation")?;

        tracing::debug!(tool_type, "Calculation recorded");

        Ok(result)
    }

    /// List recent calculations, optionally filtered by tool
    pub async fn recent(
        &self,
        tool_type: Option<&str>,
        params: &ListParams,
    ) -> Result<PagedResult<Calculation>, CalculationServiceError> {
        if let Some(tool) = tool_type {
            if !TOOL_TYPES.contains(&tool) {
                return Err(CalculationServiceError::UnknownTool(tool.to_string()));
            }
        }

        let items = self
            .repo
            .list_recent(tool_type, params.offset(), params.limit())
            .await
            .context("Failed to list calculations")?;
        let total = self
            .repo
            .count(tool_type)
            .await
            .context("Failed to count calculations")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Aggregate usage statistics
    pub async fn stats(&self) -> Result<CalculationStats, CalculationServiceError> {
        let now = Utc::now();
        let total = self
            .repo
            .count(None)
            .await
            .context("Failed to count calculations")?;
        let today = self
            .repo
            .count_since(now - Duration::days(1))
            .await
            .context("Failed to count recent calculations")?;
        let this_week = self
            .repo
            .count_since(now - Duration::days(7))
            .await
            .context("Failed to count recent calculations")?;
        let by_tool = self
            .repo
            .usage_by_tool()
            .await
            .context("Failed to get tool usage")?;

        Ok(CalculationStats {
            total,
            today,
            this_week,
            by_tool,
        })
    }
}

/// Validate and run a single calculator without touching the database
pub fn run_tool(
    tool_type: &str,
    params: &serde_json::Value,
) -> Result<serde_json::Value, CalculationServiceError> {
    match tool_type {
        "laser-cutting" => {
            let input: laser_cutting::LaserCuttingInput = parse_params(params)?;
            input.validate()?;
            to_json(&laser_cutting::calculate(&input))
        }
        "cnc-machining" => {
            let input: cnc_machining::CncMachiningInput = parse_params(params)?;
            input.validate()?;
            to_json(&cnc_machining::calculate(&input))
        }
        "material-utilization" => {
            let input: material_utilization::MaterialUtilizationInput = parse_params(params)?;
            input.validate()?;
            to_json(&material_utilization::calculate(&input)?)
        }
        "energy" => {
            let input: energy::EnergyInput = parse_params(params)?;
            input.validate()?;
            to_json(&energy::calculate(&input))
        }
        "roi" => {
            let input: roi::RoiInput = parse_params(params)?;
            input.validate()?;
            to_json(&roi::calculate(&input))
        }
        "welding" => {
            let input: welding::WeldingInput = parse_params(params)?;
            input.validate()?;
            to_json(&welding::calculate(&input))
        }
        "hourly-rate" => {
            let input: hourly_rate::HourlyRateInput = parse_params(params)?;
            input.validate()?;
            to_json(&hourly_rate::calculate(&input))
        }
        "quotation" => {
            let input: quotation::QuotationInput = parse_params(params)?;
            input.validate()?;
            to_json(&quotation::calculate(&input))
        }
        other => Err(CalculationServiceError::UnknownTool(other.to_string())),
    }
}

fn parse_params<T: DeserializeOwned>(
    params: &serde_json::Value,
) -> Result<T, CalculationServiceError> {
    serde_json::from_value(params.clone())
        .map_err(|e| CalculationServiceError::InvalidParams(e.to_string()))
}

fn to_json<T: Serialize>(result: &T) -> Result<serde_json::Value, CalculationServiceError> {
    Ok(serde_json::to_value(result).context("Failed to serialize calculation result")?)
}
