//! Shop hourly rate calculator
//!
//! Breaks the all-in hourly rate into eight cost components, flags unusual
//! cost structures, and positions the result against contextual rate bands.
//! Break-even utilization solves fixed costs against the margin each billed
//! hour contributes over variable cost.

use serde::{Deserialize, Serialize};

use super::{require_range, round1, round2, CalcError};

/// Assist gas options for the hourly rate calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasType {
    Nitrogen,
    Oxygen,
    Air,
    Mixed,
}

/// Hourly rate calculator input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyRateInput {
    pub equipment_cost: f64,
    /// Equipment lifespan in years
    pub equipment_lifespan: f64,
    pub annual_working_hours: f64,
    /// Operator base rate in $/hour
    pub operator_rate: f64,
    /// Multiplier covering benefits and payroll overhead
    pub benefits_multiplier: f64,
    pub total_power_kw: f64,
    pub electricity_rate: f64,
    /// Annual maintenance as percent of equipment cost
    pub annual_maintenance_percent: f64,
    /// Nozzles, lenses, protective windows, in $/hour
    pub consumables_per_hour: f64,
    pub facility_rent_monthly: f64,
    pub utilities_monthly: f64,
    pub insurance_monthly: f64,
    /// Office, admin, sales
    pub overhead_monthly: f64,
    pub gas_type: GasType,
    /// Gas consumption in m³/hour
    pub gas_consumption_per_hour: f64,
    pub gas_price_per_cubic_meter: f64,
}

impl Default for HourlyRateInput {
    fn default() -> Self {
        Self {
            equipment_cost: 150000.0,
            equipment_lifespan: 10.0,
            annual_working_hours: 2000.0,
            operator_rate: 25.0,
            benefits_multiplier: 1.35,
            total_power_kw: 10.0,
            electricity_rate: 0.12,
            annual_maintenance_percent: 5.0,
            consumables_per_hour: 1.35,
            facility_rent_monthly: 3000.0,
            utilities_monthly: 1500.0,
            insurance_monthly: 2000.0,
            overhead_monthly: 15000.0,
            gas_type: GasType::Nitrogen,
            gas_consumption_per_hour: 1.5,
            gas_price_per_cubic_meter: 1.5,
        }
    }
}

impl HourlyRateInput {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_range("equipmentCost", self.equipment_cost, 10000.0, 500000.0)?;
        require_range("equipmentLifespan", self.equipment_lifespan, 5.0, 20.0)?;
        require_range("annualWorkingHours", self.annual_working_hours, 500.0, 6000.0)?;
        require_range("operatorRate", self.operator_rate, 10.0, 100.0)?;
        require_range("benefitsMultiplier", self.benefits_multiplier, 1.0, 2.0)?;
        require_range("totalPowerKw", self.total_power_kw, 1.0, 50.0)?;
        require_range("electricityRate", self.electricity_rate, 0.01, 1.0)?;
        require_range(
            "annualMaintenancePercent",
            self.annual_maintenance_percent,
            0.0,
            20.0,
        )?;
        require_range("consumablesPerHour", self.consumables_per_hour, 0.0, 10.0)?;
        require_range("facilityRentMonthly", self.facility_rent_monthly, 0.0, 50000.0)?;
        require_range("utilitiesMonthly", self.utilities_monthly, 0.0, 10000.0)?;
        require_range("insuranceMonthly", self.insurance_monthly, 0.0, 10000.0)?;
        require_range("overheadMonthly", self.overhead_monthly, 0.0, 50000.0)?;
        require_range(
            "gasConsumptionPerHour",
            self.gas_consumption_per_hour,
            0.0,
            10.0,
        )?;
        require_range(
            "gasPricePerCubicMeter",
            self.gas_price_per_cubic_meter,
            0.0,
            5.0,
        )?;
        Ok(())
    }
}

/// One component of the sorted cost breakdown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComponent {
    pub category: &'static str,
    pub cost: f64,
    pub percentage: f64,
}

/// Position against the contextual rate bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkPosition {
    Below,
    Average,
    Above,
    Premium,
}

/// Industry benchmark comparison
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub position: BenchmarkPosition,
    pub description: &'static str,
    pub competitive_advantage: &'static str,
}

/// Break-even utilization analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenUtilization {
    /// Minimum billed hours per year to cover fixed costs
    pub break_even_hours: i64,
    /// Break-even hours as percent of a 2000-hour year
    pub break_even_percentage: f64,
    /// Break-even plus a 20% cushion
    pub recommended_minimum_hours: i64,
}

/// Hourly rate calculation result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyRateResult {
    pub depreciation: f64,
    pub labor: f64,
    pub energy: f64,
    pub maintenance: f64,
    pub consumables: f64,
    pub facility: f64,
    pub overhead: f64,
    pub gas: f64,

    pub total_hourly_cost: f64,

    pub depreciation_percent: f64,
    pub labor_percent: f64,
    pub energy_percent: f64,
    pub maintenance_percent: f64,
    pub consumables_percent: f64,
    pub facility_percent: f64,
    pub overhead_percent: f64,
    pub gas_percent: f64,

    /// Components sorted by cost, largest first
    pub cost_breakdown: Vec<CostComponent>,

    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,

    pub benchmark: BenchmarkComparison,
}

/// Calculate the all-in shop hourly rate
pub fn calculate(input: &HourlyRateInput) -> HourlyRateResult {
    let hours_per_month = input.annual_working_hours / 12.0;

    let depreciation =
        input.equipment_cost / (input.equipment_lifespan * input.annual_working_hours);
    let labor = input.operator_rate * input.benefits_multiplier;
    let energy = input.total_power_kw * input.electricity_rate;
    let annual_maintenance = input.equipment_cost * (input.annual_maintenance_percent / 100.0);
    let maintenance = annual_maintenance / input.annual_working_hours;
    let consumables = input.consumables_per_hour;
    let facility_monthly =
        input.facility_rent_monthly + input.utilities_monthly + input.insurance_monthly;
    let facility = facility_monthly / hours_per_month;
    let overhead = input.overhead_monthly / hours_per_month;
    let gas = input.gas_consumption_per_hour * input.gas_price_per_cubic_meter;

    let total =
        depreciation + labor + energy + maintenance + consumables + facility + overhead + gas;

    let pct = |component: f64| component / total * 100.0;
    let depreciation_percent = pct(depreciation);
    let labor_percent = pct(labor);
    let energy_percent = pct(energy);
    let maintenance_percent = pct(maintenance);
    let consumables_percent = pct(consumables);
    let facility_percent = pct(facility);
    let overhead_percent = pct(overhead);
    let gas_percent = pct(gas);

    let mut cost_breakdown = vec![
        CostComponent {
            category: "Labor",
            cost: round2(labor),
            percentage: round1(labor_percent),
        },
        CostComponent {
            category: "Overhead",
            cost: round2(overhead),
            percentage: round1(overhead_percent),
        },
        CostComponent {
            category: "Facility",
            cost: round2(facility),
            percentage: round1(facility_percent),
        },
        CostComponent {
            category: "Depreciation",
            cost: round2(depreciation),
            percentage: round1(depreciation_percent),
        },
        CostComponent {
            category: "Gas",
            cost: round2(gas),
            percentage: round1(gas_percent),
        },
        CostComponent {
            category: "Maintenance",
            cost: round2(maintenance),
            percentage: round1(maintenance_percent),
        },
        CostComponent {
            category: "Consumables",
            cost: round2(consumables),
            percentage: round1(consumables_percent),
        },
        CostComponent {
            category: "Energy",
            cost: round2(energy),
            percentage: round1(energy_percent),
        },
    ];
    cost_breakdown.sort_by(|a, b| {
        b.cost
            .partial_cmp(&a.cost)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut alerts = Vec::new();
    let mut recommendations = Vec::new();

    if labor_percent > 50.0 {
        alerts.push(
            "Labor cost is more than 50% of the modeled hourly rate in this scenario.".to_string(),
        );
        recommendations.push(
            "Consider automation or process optimization to reduce labor dependency".to_string(),
        );
    } else if labor_percent < 25.0 {
        alerts.push(
            "Labor cost is less than 25% of the modeled hourly rate in this scenario; check \
             that all relevant labor and overhead items are included."
                .to_string(),
        );
    }

    if energy_percent > 10.0 {
        alerts.push(
            "Energy cost is more than 10% of the modeled hourly rate in this scenario."
                .to_string(),
        );
        recommendations
            .push("Review machine efficiency and consider energy-saving measures".to_string());
    }

    if depreciation_percent < 8.0 {
        alerts.push(
            "Equipment depreciation is less than 8% of the modeled hourly rate; review your \
             utilization and lifespan assumptions."
                .to_string(),
        );
        recommendations
            .push("Consider increasing machine utilization to improve ROI".to_string());
    } else if depreciation_percent > 20.0 {
        alerts.push(
            "Equipment depreciation is more than 20% of the modeled hourly rate; review \
             whether your lifespan assumption is too short for your use case."
                .to_string(),
        );
    }

    if overhead_percent > 25.0 {
        alerts.push(
            "Overhead costs are more than 25% of the modeled hourly rate in this scenario."
                .to_string(),
        );
        recommendations
            .push("Review administrative costs and look for efficiency improvements".to_string());
    }

    if facility_percent > 20.0 {
        alerts.push(
            "Facility costs are more than 20% of the modeled hourly rate in this scenario."
                .to_string(),
        );
        recommendations
            .push("Consider optimizing space utilization or negotiating rent".to_string());
    }

    if gas_percent > 8.0 && input.gas_type == GasType::Nitrogen {
        recommendations.push(
            "Nitrogen costs are high. Consider on-site nitrogen generator if usage is \
             consistent"
                .to_string(),
        );
    }

    if total < 40.0 {
        alerts.push(
            "Total hourly rate is below the lower band used in this tool for context; \
             double-check that all cost components and realistic utilization have been \
             included."
                .to_string(),
        );
    } else if total > 100.0 {
        alerts.push(
            "Total hourly rate is toward the high end of the bands used in this tool; ensure \
             your pricing and value proposition reflect this level."
                .to_string(),
        );
    }

    if input.annual_working_hours < 1500.0 {
        recommendations.push(
            "Annual working hours are low. Consider strategies to increase machine \
             utilization"
                .to_string(),
        );
    }

    HourlyRateResult {
        depreciation: round2(depreciation),
        labor: round2(labor),
        energy: round2(energy),
        maintenance: round2(maintenance),
        consumables: round2(consumables),
        facility: round2(facility),
        overhead: round2(overhead),
        gas: round2(gas),
        total_hourly_cost: round2(total),
        depreciation_percent: round1(depreciation_percent),
        labor_percent: round1(labor_percent),
        energy_percent: round1(energy_percent),
        maintenance_percent: round1(maintenance_percent),
        consumables_percent: round1(consumables_percent),
        facility_percent: round1(facility_percent),
        overhead_percent: round1(overhead_percent),
        gas_percent: round1(gas_percent),
        cost_breakdown,
        alerts,
        recommendations,
        benchmark: compare_to_benchmarks(total),
    }
}

/// Minimum billed hours per year needed to cover fixed costs at the target
/// rate, given the variable cost each billed hour carries
pub fn break_even_utilization(
    equipment_cost: f64,
    lifespan_years: f64,
    fixed_costs_annual: f64,
    variable_cost_per_hour: f64,
    target_hourly_rate: f64,
) -> BreakEvenUtilization {
    let annual_depreciation = equipment_cost / lifespan_years;
    let total_fixed_costs = annual_depreciation + fixed_costs_annual;

    let break_even_hours = total_fixed_costs / (target_hourly_rate - variable_cost_per_hour);
    let break_even_percentage = break_even_hours / 2000.0 * 100.0;
    let recommended_minimum_hours = break_even_hours * 1.2;

    BreakEvenUtilization {
        break_even_hours: break_even_hours.round() as i64,
        break_even_percentage: round1(break_even_percentage),
        recommended_minimum_hours: recommended_minimum_hours.round() as i64,
    }
}

/// Position the rate against contextual industry bands
pub fn compare_to_benchmarks(total_hourly_cost: f64) -> BenchmarkComparison {
    if total_hourly_cost < 40.0 {
        BenchmarkComparison {
            position: BenchmarkPosition::Below,
            description: "Your modeled hourly rate is below the lower contextual band used in this tool.",
            competitive_advantage: "Strong cost advantage, but ensure quality and sustainability",
        }
    } else if total_hourly_cost <= 70.0 {
        BenchmarkComparison {
            position: BenchmarkPosition::Average,
            description: "Your modeled hourly rate falls within the mid-range band used here for context.",
            competitive_advantage: "Competitive positioning, focus on service differentiation",
        }
    } else if total_hourly_cost <= 100.0 {
        BenchmarkComparison {
            position: BenchmarkPosition::Above,
            description: "Your modeled hourly rate is above that mid-range band.",
            competitive_advantage: "Premium positioning, emphasize quality and capabilities",
        }
    } else {
        BenchmarkComparison {
            position: BenchmarkPosition::Premium,
            description: "Your modeled hourly rate is at the high end of the contextual bands used here.",
            competitive_advantage: "High-end positioning, must justify with exceptional quality/service",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_validates() {
        assert!(HourlyRateInput::default().validate().is_ok());
    }

    #[test]
    fn test_depreciation_reference_value() {
        // 150000 / (10 * 2000) = 7.50/hour
        let result = calculate(&HourlyRateInput::default());
        assert_eq!(result.depreciation, 7.5);
    }

    #[test]
    fn test_component_values() {
        let result = calculate(&HourlyRateInput::default());
        // 25 * 1.35 benefits
        assert_eq!(result.labor, 33.75);
        // 10 kW * 0.12
        assert_eq!(result.energy, 1.2);
        // 150000 * 5% / 2000
        assert_eq!(result.maintenance, 3.75);
        // (3000 + 1500 + 2000) / (2000/12)
        assert_eq!(result.facility, 39.0);
        // 15000 / (2000/12)
        assert_eq!(result.overhead, 90.0);
        // 1.5 m³ * 1.5
        assert_eq!(result.gas, 2.25);
        // 7.5 + 33.75 + 1.2 + 3.75 + 1.35 + 39 + 90 + 2.25
        assert_eq!(result.total_hourly_cost, 178.8);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let result = calculate(&HourlyRateInput::default());
        let sum = result.depreciation_percent
            + result.labor_percent
            + result.energy_percent
            + result.maintenance_percent
            + result.consumables_percent
            + result.facility_percent
            + result.overhead_percent
            + result.gas_percent;
        assert!((sum - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_breakdown_sorted_descending() {
        let result = calculate(&HourlyRateInput::default());
        assert_eq!(result.cost_breakdown.len(), 8);
        assert_eq!(result.cost_breakdown[0].category, "Overhead");
        for pair in result.cost_breakdown.windows(2) {
            assert!(pair[0].cost >= pair[1].cost);
        }
    }

    #[test]
    fn test_premium_rate_alert() {
        let result = calculate(&HourlyRateInput::default());
        assert_eq!(result.benchmark.position, BenchmarkPosition::Premium);
        assert!(result
            .alerts
            .iter()
            .any(|a| a.contains("high end of the bands")));
    }

    #[test]
    fn test_low_utilization_recommendation() {
        let result = calculate(&HourlyRateInput {
            annual_working_hours: 1000.0,
            ..Default::default()
        });
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("Annual working hours are low")));
    }

    #[test]
    fn test_break_even_utilization() {
        // 15000 annual depreciation + 30000 fixed, $75 rate, $30 variable:
        // 45000 / 45 = 1000 hours
        let result = break_even_utilization(150000.0, 10.0, 30000.0, 30.0, 75.0);
        assert_eq!(result.break_even_hours, 1000);
        assert_eq!(result.break_even_percentage, 50.0);
        assert_eq!(result.recommended_minimum_hours, 1200);
    }

    #[test]
    fn test_benchmark_bands() {
        assert_eq!(
            compare_to_benchmarks(35.0).position,
            BenchmarkPosition::Below
        );
        assert_eq!(
            compare_to_benchmarks(55.0).position,
            BenchmarkPosition::Average
        );
        assert_eq!(
            compare_to_benchmarks(85.0).position,
            BenchmarkPosition::Above
        );
        assert_eq!(
            compare_to_benchmarks(120.0).position,
            BenchmarkPosition::Premium
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn more_hours_spread_fixed_costs_thinner(
                h1 in 500.0f64..5000.0,
                delta in 100.0f64..1000.0,
            ) {
                let few = calculate(&HourlyRateInput { annual_working_hours: h1, ..Default::default() });
                let many = calculate(&HourlyRateInput { annual_working_hours: h1 + delta, ..Default::default() });
                prop_assert!(many.total_hourly_cost <= few.total_hourly_cost);
            }

            #[test]
            fn total_is_sum_of_components(
                equipment in 10000.0f64..500000.0,
                operator in 10.0f64..100.0,
            ) {
                let result = calculate(&HourlyRateInput {
                    equipment_cost: equipment,
                    operator_rate: operator,
                    ..Default::default()
                });
                let sum = result.depreciation + result.labor + result.energy
                    + result.maintenance + result.consumables + result.facility
                    + result.overhead + result.gas;
                prop_assert!((result.total_hourly_cost - sum).abs() < 0.1);
            }
        }
    }
}
