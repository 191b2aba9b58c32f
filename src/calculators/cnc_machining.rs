//! CNC machining cost calculator
//!
//! Per-part costing with batch amortization of setup, tooling wear spread
//! over tool life, and volume pricing tiers that re-amortize setup cost at
//! each quantity break.

use serde::{Deserialize, Serialize};

use super::{require_range, round1, round2, round4, CalcError};

/// Stock materials supported by the CNC machining calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CncMaterial {
    Aluminum,
    Steel,
    StainlessSteel,
    Brass,
    Plastic,
}

impl CncMaterial {
    /// Density in kg/m³
    pub fn density(&self) -> f64 {
        match self {
            CncMaterial::Aluminum => 2700.0,
            CncMaterial::Steel => 7850.0,
            CncMaterial::StainlessSteel => 7900.0,
            CncMaterial::Brass => 8500.0,
            CncMaterial::Plastic => 1200.0,
        }
    }
}

/// CNC machining calculator input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CncMachiningInput {
    /// Part length in mm
    pub part_length: f64,
    /// Part width in mm
    pub part_width: f64,
    /// Part height in mm
    pub part_height: f64,
    pub material_type: CncMaterial,
    /// Material price in $/kg
    #[serde(default = "defaults::material_price")]
    pub material_price: f64,
    /// Cycle time per part in hours
    pub machining_time: f64,
    /// Setup time in hours, amortized across the batch
    #[serde(default = "defaults::setup_time")]
    pub setup_time: f64,
    #[serde(default = "defaults::batch_size")]
    pub batch_size: u32,
    /// Tool set cost in $
    #[serde(default = "defaults::tool_cost")]
    pub tool_cost: f64,
    /// Parts per tool set
    #[serde(default = "defaults::tool_life")]
    pub tool_life: u32,
    /// Machine rate in $/hour
    #[serde(default = "defaults::machine_rate")]
    pub machine_rate: f64,
    /// Labor rate in $/hour
    #[serde(default = "defaults::labor_rate")]
    pub labor_rate: f64,
    /// Overhead as percent of direct costs
    #[serde(default = "defaults::overhead_rate")]
    pub overhead_rate: f64,
}

mod defaults {
    pub fn material_price() -> f64 {
        5.0
    }
    pub fn setup_time() -> f64 {
        0.5
    }
    pub fn batch_size() -> u32 {
        1
    }
    pub fn tool_cost() -> f64 {
        100.0
    }
    pub fn tool_life() -> u32 {
        100
    }
    pub fn machine_rate() -> f64 {
        75.0
    }
    pub fn labor_rate() -> f64 {
        30.0
    }
    pub fn overhead_rate() -> f64 {
        15.0
    }
}

impl Default for CncMachiningInput {
    fn default() -> Self {
        Self {
            part_length: 100.0,
            part_width: 50.0,
            part_height: 25.0,
            material_type: CncMaterial::Aluminum,
            material_price: defaults::material_price(),
            machining_time: 2.0,
            setup_time: defaults::setup_time(),
            batch_size: defaults::batch_size(),
            tool_cost: defaults::tool_cost(),
            tool_life: defaults::tool_life(),
            machine_rate: defaults::machine_rate(),
            labor_rate: defaults::labor_rate(),
            overhead_rate: defaults::overhead_rate(),
        }
    }
}

impl CncMachiningInput {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_range("partLength", self.part_length, 1.0, 5000.0)?;
        require_range("partWidth", self.part_width, 1.0, 5000.0)?;
        require_range("partHeight", self.part_height, 1.0, 1000.0)?;
        require_range("materialPrice", self.material_price, 0.1, 1000.0)?;
        require_range("machiningTime", self.machining_time, 0.1, 100.0)?;
        require_range("setupTime", self.setup_time, 0.1, 10.0)?;
        require_range("batchSize", self.batch_size as f64, 1.0, 10000.0)?;
        require_range("toolCost", self.tool_cost, 0.0, 10000.0)?;
        require_range("toolLife", self.tool_life as f64, 1.0, 10000.0)?;
        require_range("machineRate", self.machine_rate, 1.0, 500.0)?;
        require_range("laborRate", self.labor_rate, 1.0, 200.0)?;
        require_range("overheadRate", self.overhead_rate, 0.0, 100.0)?;
        Ok(())
    }
}

/// One quantity break in the volume pricing table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeTier {
    pub quantity: u32,
    pub price_per_part: f64,
    /// Discount vs. the single-piece price, percent
    pub discount: f64,
}

/// CNC machining calculation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CncMachiningResult {
    pub material_cost_per_part: f64,
    pub machine_cost_per_part: f64,
    pub labor_cost_per_part: f64,
    pub tooling_cost_per_part: f64,
    pub setup_cost_per_part: f64,
    pub overhead_per_part: f64,
    pub total_cost_per_part: f64,

    pub total_batch_cost: f64,
    /// Total batch time in hours, setup included
    pub total_batch_time: f64,
    pub total_material_cost: f64,

    /// Total cost with 25% markup
    pub suggested_price_per_part: f64,
    pub profit_per_part: f64,
    pub total_profit: f64,

    pub volume_pricing: Vec<VolumeTier>,

    /// Part weight in kg
    pub part_weight: f64,
    /// Cutting time as a percent of total batch time
    pub machine_utilization: f64,
}

// Operator monitors multiple machines; fraction of machine time billed as labor
const LABOR_UTILIZATION: f64 = 0.4;
const SINGLE_PIECE_MARKUP: f64 = 1.25;
const VOLUME_TIERS: &[u32] = &[1, 10, 50, 100, 500, 1000];

/// Calculate CNC machining costs with batch and volume pricing
pub fn calculate(input: &CncMachiningInput) -> CncMachiningResult {
    let volume_m3 = input.part_length * input.part_width * input.part_height / 1e9;
    let part_weight = volume_m3 * input.material_type.density();

    let material_cost_per_part = part_weight * input.material_price;
    let setup_cost_per_part = input.setup_time * input.machine_rate / input.batch_size as f64;
    let machine_cost_per_part = input.machining_time * input.machine_rate;
    let labor_cost_per_part = input.machining_time * input.labor_rate * LABOR_UTILIZATION;
    let tooling_cost_per_part = input.tool_cost / input.tool_life as f64;

    let direct_costs = material_cost_per_part
        + machine_cost_per_part
        + labor_cost_per_part
        + tooling_cost_per_part
        + setup_cost_per_part;
    let overhead_per_part = direct_costs * (input.overhead_rate / 100.0);
    let total_cost_per_part = direct_costs + overhead_per_part;

    let batch = input.batch_size as f64;
    let total_batch_cost = total_cost_per_part * batch;
    let total_batch_time = input.setup_time + input.machining_time * batch;
    let total_material_cost = material_cost_per_part * batch;

    let suggested_price_per_part = total_cost_per_part * SINGLE_PIECE_MARKUP;
    let profit_per_part = suggested_price_per_part - total_cost_per_part;
    let total_profit = profit_per_part * batch;

    let volume_pricing = volume_pricing(input, total_cost_per_part);

    let cutting_time = input.machining_time * batch;
    let machine_utilization = cutting_time / total_batch_time * 100.0;

    CncMachiningResult {
        material_cost_per_part: round2(material_cost_per_part),
        machine_cost_per_part: round2(machine_cost_per_part),
        labor_cost_per_part: round2(labor_cost_per_part),
        tooling_cost_per_part: round2(tooling_cost_per_part),
        setup_cost_per_part: round2(setup_cost_per_part),
        overhead_per_part: round2(overhead_per_part),
        total_cost_per_part: round2(total_cost_per_part),
        total_batch_cost: round2(total_batch_cost),
        total_batch_time: round2(total_batch_time),
        total_material_cost: round2(total_material_cost),
        suggested_price_per_part: round2(suggested_price_per_part),
        profit_per_part: round2(profit_per_part),
        total_profit: round2(total_profit),
        volume_pricing,
        part_weight: round4(part_weight),
        machine_utilization: round1(machine_utilization),
    }
}

/// Build the quantity-break table, re-amortizing setup cost at each tier
fn volume_pricing(input: &CncMachiningInput, base_cost_per_part: f64) -> Vec<VolumeTier> {
    let base_price = base_cost_per_part * SINGLE_PIECE_MARKUP;

    VOLUME_TIERS
        .iter()
        .map(|&quantity| {
            let setup_cost_per_part = input.setup_time * input.machine_rate / quantity as f64;

            let material_cost_per_part = input.part_length * input.part_width * input.part_height
                / 1e9
                * input.material_type.density()
                * input.material_price;
            let machine_cost_per_part = input.machining_time * input.machine_rate;
            let labor_cost_per_part = input.machining_time * input.labor_rate * LABOR_UTILIZATION;
            let tooling_cost_per_part = input.tool_cost / input.tool_life as f64;

            let direct_costs = material_cost_per_part
                + machine_cost_per_part
                + labor_cost_per_part
                + tooling_cost_per_part
                + setup_cost_per_part;
            let cost_per_part = direct_costs * (1.0 + input.overhead_rate / 100.0);

            let markup = match quantity {
                1 => 1.25,
                q if q <= 10 => 1.20,
                q if q <= 50 => 1.15,
                q if q <= 100 => 1.12,
                q if q <= 500 => 1.10,
                _ => 1.08,
            };

            let price_per_part = cost_per_part * markup;
            let discount = (base_price - price_per_part) / base_price * 100.0;

            VolumeTier {
                quantity,
                price_per_part: round2(price_per_part),
                discount: round1(discount),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_validates() {
        assert!(CncMachiningInput::default().validate().is_ok());
    }

    #[test]
    fn test_part_weight() {
        // 100 * 50 * 25 mm = 125 cm³ of aluminum at 2700 kg/m³ = 0.3375 kg
        let result = calculate(&CncMachiningInput::default());
        assert_eq!(result.part_weight, 0.3375);
        assert_eq!(result.material_cost_per_part, 1.69);
    }

    #[test]
    fn test_setup_amortization() {
        let single = calculate(&CncMachiningInput::default());
        let batch = calculate(&CncMachiningInput {
            batch_size: 10,
            ..Default::default()
        });
        // 0.5h * $75 = $37.50 for one part, $3.75 each across ten
        assert_eq!(single.setup_cost_per_part, 37.5);
        assert_eq!(batch.setup_cost_per_part, 3.75);
        assert!(batch.total_cost_per_part < single.total_cost_per_part);
    }

    #[test]
    fn test_volume_tiers_are_monotonic() {
        let result = calculate(&CncMachiningInput::default());
        assert_eq!(result.volume_pricing.len(), 6);
        assert_eq!(result.volume_pricing[0].quantity, 1);
        for pair in result.volume_pricing.windows(2) {
            assert!(pair[1].price_per_part <= pair[0].price_per_part);
            assert!(pair[1].discount >= pair[0].discount);
        }
        // The single-piece tier matches the suggested price
        assert_eq!(
            result.volume_pricing[0].price_per_part,
            result.suggested_price_per_part
        );
    }

    #[test]
    fn test_machine_utilization() {
        // 2h cutting out of 2.5h total = 80%
        let result = calculate(&CncMachiningInput::default());
        assert_eq!(result.machine_utilization, 80.0);
    }

    #[test]
    fn test_batch_size_out_of_range() {
        let input = CncMachiningInput {
            batch_size: 20000,
            ..Default::default()
        };
        assert!(matches!(
            input.validate(),
            Err(CalcError::OutOfRange { field: "batchSize", .. })
        ));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn larger_batches_never_cost_more_per_part(
                b1 in 1u32..5000,
                extra in 1u32..5000,
            ) {
                let small = calculate(&CncMachiningInput { batch_size: b1, ..Default::default() });
                let large = calculate(&CncMachiningInput { batch_size: b1 + extra, ..Default::default() });
                prop_assert!(large.total_cost_per_part <= small.total_cost_per_part);
            }

            #[test]
            fn denser_materials_weigh_more(
                length in 1.0f64..5000.0,
                width in 1.0f64..5000.0,
                height in 1.0f64..1000.0,
            ) {
                let plastic = calculate(&CncMachiningInput {
                    part_length: length,
                    part_width: width,
                    part_height: height,
                    material_type: CncMaterial::Plastic,
                    ..Default::default()
                });
                let steel = calculate(&CncMachiningInput {
                    part_length: length,
                    part_width: width,
                    part_height: height,
                    material_type: CncMaterial::Steel,
                    ..Default::default()
                });
                prop_assert!(steel.part_weight >= plastic.part_weight);
            }

            #[test]
            fn utilization_stays_in_percent_range(
                machining in 0.1f64..100.0,
                setup in 0.1f64..10.0,
                batch in 1u32..10000,
            ) {
                let result = calculate(&CncMachiningInput {
                    machining_time: machining,
                    setup_time: setup,
                    batch_size: batch,
                    ..Default::default()
                });
                prop_assert!(result.machine_utilization > 0.0);
                // rounding can land exactly on 100.0 when setup time is negligible
                prop_assert!(result.machine_utilization <= 100.0);
            }
        }
    }
}
