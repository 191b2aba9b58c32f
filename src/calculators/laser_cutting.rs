//! Laser cutting cost calculator
//!
//! Estimates per-job cost from cut geometry, material properties and shop
//! rates. Cutting speed scales with the square root of laser power, inversely
//! with the square root of thickness, and is penalized by material
//! reflectivity.

use serde::{Deserialize, Serialize};

use super::{require_range, round2, round4, CalcError};

/// Sheet materials supported by the laser cutting calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaserMaterial {
    StainlessSteel,
    Aluminum,
    Copper,
    MildSteel,
    Brass,
}

/// Physical properties driving speed and weight estimates
#[derive(Debug, Clone, Copy)]
pub struct MaterialProperties {
    /// Density in kg/m³
    pub density: f64,
    /// Base cutting speed in mm/min at 1 kW per 1 mm thickness
    pub cutting_speed: f64,
    /// Reflectivity in 0..1
    pub reflectivity: f64,
    /// Typical market price in $/kg
    pub default_price: f64,
}

impl LaserMaterial {
    pub fn properties(&self) -> MaterialProperties {
        match self {
            LaserMaterial::StainlessSteel => MaterialProperties {
                density: 7900.0,
                cutting_speed: 800.0,
                reflectivity: 0.6,
                default_price: 5.0,
            },
            LaserMaterial::Aluminum => MaterialProperties {
                density: 2700.0,
                cutting_speed: 1200.0,
                reflectivity: 0.9,
                default_price: 8.0,
            },
            LaserMaterial::Copper => MaterialProperties {
                density: 8960.0,
                cutting_speed: 600.0,
                reflectivity: 0.95,
                default_price: 15.0,
            },
            LaserMaterial::MildSteel => MaterialProperties {
                density: 7850.0,
                cutting_speed: 1000.0,
                reflectivity: 0.5,
                default_price: 3.0,
            },
            LaserMaterial::Brass => MaterialProperties {
                density: 8500.0,
                cutting_speed: 700.0,
                reflectivity: 0.85,
                default_price: 10.0,
            },
        }
    }
}

/// Laser cutting calculator input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaserCuttingInput {
    pub material_type: LaserMaterial,
    /// Sheet thickness in mm
    pub thickness: f64,
    /// Total cut path length in mm
    pub cutting_length: f64,
    /// Laser power in kW
    pub laser_power: f64,
    /// Electricity rate in $/kWh
    #[serde(default = "defaults::electricity_rate")]
    pub electricity_rate: f64,
    /// Labor rate in $/hour
    #[serde(default = "defaults::labor_rate")]
    pub labor_rate: f64,
    /// Material price in $/kg
    #[serde(default = "defaults::material_price")]
    pub material_price: f64,
    /// Assist gas consumption in m³/hour
    #[serde(default = "defaults::gas_consumption")]
    pub gas_consumption: f64,
    /// Assist gas price in $/m³
    #[serde(default = "defaults::gas_price")]
    pub gas_price: f64,
    /// Equipment purchase cost in $
    #[serde(default = "defaults::equipment_cost")]
    pub equipment_cost: f64,
    /// Equipment lifespan in years
    #[serde(default = "defaults::equipment_lifespan")]
    pub equipment_lifespan: f64,
    /// Annual working hours
    #[serde(default = "defaults::annual_working_hours")]
    pub annual_working_hours: f64,
}

mod defaults {
    pub fn electricity_rate() -> f64 {
        0.12
    }
    pub fn labor_rate() -> f64 {
        25.0
    }
    pub fn material_price() -> f64 {
        5.0
    }
    pub fn gas_consumption() -> f64 {
        2.0
    }
    pub fn gas_price() -> f64 {
        1.5
    }
    pub fn equipment_cost() -> f64 {
        150000.0
    }
    pub fn equipment_lifespan() -> f64 {
        10.0
    }
    pub fn annual_working_hours() -> f64 {
        2000.0
    }
}

impl Default for LaserCuttingInput {
    fn default() -> Self {
        Self {
            material_type: LaserMaterial::StainlessSteel,
            thickness: 3.0,
            cutting_length: 1000.0,
            laser_power: 3.0,
            electricity_rate: defaults::electricity_rate(),
            labor_rate: defaults::labor_rate(),
            material_price: defaults::material_price(),
            gas_consumption: defaults::gas_consumption(),
            gas_price: defaults::gas_price(),
            equipment_cost: defaults::equipment_cost(),
            equipment_lifespan: defaults::equipment_lifespan(),
            annual_working_hours: defaults::annual_working_hours(),
        }
    }
}

impl LaserCuttingInput {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_range("thickness", self.thickness, 0.1, 50.0)?;
        require_range("cuttingLength", self.cutting_length, 1.0, 100000.0)?;
        require_range("laserPower", self.laser_power, 0.5, 30.0)?;
        require_range("electricityRate", self.electricity_rate, 0.01, 1.0)?;
        require_range("laborRate", self.labor_rate, 1.0, 200.0)?;
        require_range("materialPrice", self.material_price, 0.1, 1000.0)?;
        require_range("gasConsumption", self.gas_consumption, 0.0, 100.0)?;
        require_range("gasPrice", self.gas_price, 0.0, 50.0)?;
        require_range("equipmentCost", self.equipment_cost, 0.0, 10000000.0)?;
        require_range("equipmentLifespan", self.equipment_lifespan, 1.0, 30.0)?;
        require_range("annualWorkingHours", self.annual_working_hours, 100.0, 8760.0)?;
        Ok(())
    }
}

/// Laser cutting calculation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaserCuttingResult {
    /// Cutting time in hours
    pub cutting_time: f64,
    /// Setup time in hours
    pub setup_time: f64,
    /// Total time in hours
    pub total_time: f64,

    pub material_cost: f64,
    pub power_cost: f64,
    pub labor_cost: f64,
    pub gas_cost: f64,
    pub depreciation: f64,
    pub maintenance_cost: f64,

    pub total_cost: f64,
    /// Total cost with 30% markup
    pub suggested_price: f64,
    pub profit_margin: f64,

    pub cost_per_meter: f64,
    pub cost_per_minute: f64,
    pub energy_efficiency: EnergyEfficiency,

    /// Removed material weight in kg
    pub material_weight: f64,
    /// Removed material volume in cm³
    pub material_volume: f64,
}

/// Energy efficiency rating based on kWh consumed per meter of cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyEfficiency {
    Excellent,
    Good,
    Average,
    Poor,
}

impl EnergyEfficiency {
    fn from_energy_per_meter(kwh_per_meter: f64) -> Self {
        if kwh_per_meter < 0.1 {
            EnergyEfficiency::Excellent
        } else if kwh_per_meter < 0.3 {
            EnergyEfficiency::Good
        } else if kwh_per_meter < 0.5 {
            EnergyEfficiency::Average
        } else {
            EnergyEfficiency::Poor
        }
    }
}

// Typical laser kerf width in mm
const KERF_WIDTH: f64 = 0.3;

/// Calculate laser cutting cost with detailed breakdown
pub fn calculate(input: &LaserCuttingInput) -> LaserCuttingResult {
    let material = input.material_type.properties();

    // Speed decreases with thickness and increases with power; high
    // reflectivity reduces coupling efficiency.
    let thickness_factor = input.thickness.sqrt();
    let power_factor = input.laser_power.sqrt();
    let reflectivity_penalty = 1.0 - material.reflectivity * 0.3;
    let effective_speed = material.cutting_speed * power_factor * reflectivity_penalty / thickness_factor;

    let cutting_time = input.cutting_length / effective_speed / 60.0;
    let setup_time = 0.15 + input.thickness * 0.005;
    let total_time = cutting_time + setup_time;

    // Removed material along the cut path
    let material_volume_cm3 = input.cutting_length * KERF_WIDTH * input.thickness / 1000.0;
    let material_weight = material_volume_cm3 * material.density / 1_000_000.0;
    let material_cost = material_weight * input.material_price;

    // Laser plus auxiliary systems (cooling, extraction)
    let total_power_draw = input.laser_power * 1.3;
    let energy_consumed = total_power_draw * cutting_time;
    let power_cost = energy_consumed * input.electricity_rate;

    let labor_cost = total_time * input.labor_rate;
    let gas_cost = input.gas_consumption * cutting_time * input.gas_price;

    let hourly_depreciation =
        input.equipment_cost / (input.equipment_lifespan * input.annual_working_hours);
    let depreciation = hourly_depreciation * total_time;
    let maintenance_cost = depreciation * 0.07;

    let total_cost =
        material_cost + power_cost + labor_cost + gas_cost + depreciation + maintenance_cost;
    let suggested_price = total_cost * 1.3;
    let profit_margin = suggested_price - total_cost;

    let length_meters = input.cutting_length / 1000.0;
    let cost_per_meter = total_cost / length_meters;
    let cost_per_minute = total_cost / (total_time * 60.0);
    let energy_per_meter = energy_consumed / length_meters;

    LaserCuttingResult {
        cutting_time: round4(cutting_time),
        setup_time: round4(setup_time),
        total_time: round4(total_time),
        material_cost: round2(material_cost),
        power_cost: round2(power_cost),
        labor_cost: round2(labor_cost),
        gas_cost: round2(gas_cost),
        depreciation: round2(depreciation),
        maintenance_cost: round2(maintenance_cost),
        total_cost: round2(total_cost),
        suggested_price: round2(suggested_price),
        profit_margin: round2(profit_margin),
        cost_per_meter: round2(cost_per_meter),
        cost_per_minute: round2(cost_per_minute),
        energy_efficiency: EnergyEfficiency::from_energy_per_meter(energy_per_meter),
        material_weight: round4(material_weight),
        material_volume: round2(material_volume_cm3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_validates() {
        assert!(LaserCuttingInput::default().validate().is_ok());
    }

    #[test]
    fn test_thickness_out_of_range() {
        let input = LaserCuttingInput {
            thickness: 60.0,
            ..Default::default()
        };
        assert_eq!(
            input.validate(),
            Err(CalcError::OutOfRange {
                field: "thickness",
                min: 0.1,
                max: 50.0,
            })
        );
    }

    #[test]
    fn test_hourly_depreciation_reference_value() {
        // 150000 / (10 years * 2000 hours) = 7.50/hour
        let input = LaserCuttingInput::default();
        let result = calculate(&input);
        let expected = round2(7.5 * result.total_time);
        assert_eq!(result.depreciation, expected);
    }

    #[test]
    fn test_setup_time_formula() {
        let input = LaserCuttingInput {
            thickness: 10.0,
            ..Default::default()
        };
        let result = calculate(&input);
        assert_eq!(result.setup_time, 0.2);
    }

    #[test]
    fn test_totals_are_consistent() {
        let result = calculate(&LaserCuttingInput::default());
        let sum = result.material_cost
            + result.power_cost
            + result.labor_cost
            + result.gas_cost
            + result.depreciation
            + result.maintenance_cost;
        assert!((result.total_cost - sum).abs() < 0.05);
        assert!((result.suggested_price - result.total_cost * 1.3).abs() < 0.05);
        assert!(result.profit_margin > 0.0);
    }

    #[test]
    fn test_reflective_material_cuts_slower() {
        let steel = calculate(&LaserCuttingInput {
            material_type: LaserMaterial::MildSteel,
            ..Default::default()
        });
        let copper = calculate(&LaserCuttingInput {
            material_type: LaserMaterial::Copper,
            ..Default::default()
        });
        assert!(copper.cutting_time > steel.cutting_time);
    }

    #[test]
    fn test_material_weight() {
        // 1000mm * 0.3mm kerf * 3mm / 1000 = 0.9 cm³ of stainless at 7900 kg/m³
        let result = calculate(&LaserCuttingInput::default());
        assert_eq!(result.material_volume, 0.9);
        assert_eq!(result.material_weight, 0.0071);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn thicker_sheets_never_cut_faster(
                t1 in 0.1f64..25.0,
                delta in 0.1f64..25.0,
            ) {
                let thin = calculate(&LaserCuttingInput { thickness: t1, ..Default::default() });
                let thick = calculate(&LaserCuttingInput { thickness: t1 + delta, ..Default::default() });
                prop_assert!(thick.cutting_time >= thin.cutting_time);
            }

            #[test]
            fn more_power_never_increases_cutting_time(
                p1 in 0.5f64..15.0,
                delta in 0.1f64..15.0,
            ) {
                let low = calculate(&LaserCuttingInput { laser_power: p1, ..Default::default() });
                let high = calculate(&LaserCuttingInput { laser_power: p1 + delta, ..Default::default() });
                prop_assert!(high.cutting_time <= low.cutting_time);
            }

            #[test]
            fn longer_cuts_cost_more(
                l1 in 1.0f64..50000.0,
                delta in 100.0f64..50000.0,
            ) {
                let short = calculate(&LaserCuttingInput { cutting_length: l1, ..Default::default() });
                let long = calculate(&LaserCuttingInput { cutting_length: l1 + delta, ..Default::default() });
                prop_assert!(long.total_cost >= short.total_cost);
            }

            #[test]
            fn valid_inputs_produce_finite_positive_costs(
                thickness in 0.1f64..50.0,
                length in 1.0f64..100000.0,
                power in 0.5f64..30.0,
            ) {
                let input = LaserCuttingInput {
                    thickness,
                    cutting_length: length,
                    laser_power: power,
                    ..Default::default()
                };
                prop_assert!(input.validate().is_ok());
                let result = calculate(&input);
                prop_assert!(result.total_cost.is_finite());
                prop_assert!(result.total_cost > 0.0);
                prop_assert!(result.suggested_price >= result.total_cost);
            }
        }
    }
}
