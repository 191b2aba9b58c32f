//! Energy cost and carbon footprint calculator
//!
//! Models effective equipment load plus auxiliary draw, splits consumption
//! between peak and off-peak tariff windows, and derives carbon footprint
//! from grid intensity. Results include a 24-hour consumption profile and a
//! prioritized list of savings recommendations.

use serde::{Deserialize, Serialize};

use super::{require_range, round1, round2, CalcError, Priority, Recommendation};

/// Equipment classes supported by the energy calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    LaserCutter,
    CncMill,
    PlasmaCutter,
    Waterjet,
    Other,
}

/// Energy calculator input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyInput {
    pub equipment_type: EquipmentType,
    /// Rated power in kW
    pub rated_power: f64,
    /// Average load as percent of rated power
    #[serde(default = "defaults::average_load")]
    pub average_load: f64,
    #[serde(default = "defaults::daily_operating_hours")]
    pub daily_operating_hours: f64,
    #[serde(default = "defaults::operating_days_per_week")]
    pub operating_days_per_week: u32,
    #[serde(default = "defaults::weeks_per_year")]
    pub weeks_per_year: u32,
    /// Off-peak electricity rate in $/kWh
    #[serde(default = "defaults::electricity_rate")]
    pub electricity_rate: f64,
    /// Peak rate premium over the standard rate, percent
    #[serde(default = "defaults::peak_rate_premium")]
    pub peak_rate_premium: f64,
    /// Share of operating time falling in peak windows, percent
    #[serde(default = "defaults::peak_hours_percentage")]
    pub peak_hours_percentage: f64,
    /// Cooling system draw in kW
    #[serde(default = "defaults::cooling_system_power")]
    pub cooling_system_power: f64,
    /// Fume extraction draw in kW
    #[serde(default = "defaults::extraction_system_power")]
    pub extraction_system_power: f64,
    /// Grid carbon intensity in g CO₂/kWh
    #[serde(default = "defaults::grid_carbon_intensity")]
    pub grid_carbon_intensity: f64,
}

mod defaults {
    pub fn average_load() -> f64 {
        75.0
    }
    pub fn daily_operating_hours() -> f64 {
        8.0
    }
    pub fn operating_days_per_week() -> u32 {
        5
    }
    pub fn weeks_per_year() -> u32 {
        50
    }
    pub fn electricity_rate() -> f64 {
        0.12
    }
    pub fn peak_rate_premium() -> f64 {
        30.0
    }
    pub fn peak_hours_percentage() -> f64 {
        40.0
    }
    pub fn cooling_system_power() -> f64 {
        3.0
    }
    pub fn extraction_system_power() -> f64 {
        2.0
    }
    pub fn grid_carbon_intensity() -> f64 {
        400.0
    }
}

impl Default for EnergyInput {
    fn default() -> Self {
        Self {
            equipment_type: EquipmentType::LaserCutter,
            rated_power: 6.0,
            average_load: defaults::average_load(),
            daily_operating_hours: defaults::daily_operating_hours(),
            operating_days_per_week: defaults::operating_days_per_week(),
            weeks_per_year: defaults::weeks_per_year(),
            electricity_rate: defaults::electricity_rate(),
            peak_rate_premium: defaults::peak_rate_premium(),
            peak_hours_percentage: defaults::peak_hours_percentage(),
            cooling_system_power: defaults::cooling_system_power(),
            extraction_system_power: defaults::extraction_system_power(),
            grid_carbon_intensity: defaults::grid_carbon_intensity(),
        }
    }
}

impl EnergyInput {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_range("ratedPower", self.rated_power, 0.1, 500.0)?;
        require_range("averageLoad", self.average_load, 10.0, 100.0)?;
        require_range("dailyOperatingHours", self.daily_operating_hours, 0.1, 24.0)?;
        require_range(
            "operatingDaysPerWeek",
            self.operating_days_per_week as f64,
            1.0,
            7.0,
        )?;
        require_range("weeksPerYear", self.weeks_per_year as f64, 1.0, 52.0)?;
        require_range("electricityRate", self.electricity_rate, 0.01, 1.0)?;
        require_range("peakRatePremium", self.peak_rate_premium, 0.0, 200.0)?;
        require_range("peakHoursPercentage", self.peak_hours_percentage, 0.0, 100.0)?;
        require_range("coolingSystemPower", self.cooling_system_power, 0.0, 100.0)?;
        require_range(
            "extractionSystemPower",
            self.extraction_system_power,
            0.0,
            50.0,
        )?;
        require_range(
            "gridCarbonIntensity",
            self.grid_carbon_intensity,
            0.0,
            2000.0,
        )?;
        Ok(())
    }
}

/// One hour of the 24-hour consumption profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyEntry {
    pub hour: u32,
    /// Consumption in kWh
    pub consumption: f64,
    pub cost: f64,
    pub is_peak: bool,
}

/// Energy calculation result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyResult {
    pub average_power_consumption: f64,
    pub total_system_power: f64,
    pub effective_load: f64,

    pub daily_energy_consumption: f64,
    pub weekly_energy_consumption: f64,
    pub monthly_energy_consumption: f64,
    pub annual_energy_consumption: f64,

    pub daily_cost: f64,
    pub weekly_cost: f64,
    pub monthly_cost: f64,
    pub annual_cost: f64,

    pub standard_rate_cost: f64,
    pub peak_rate_cost: f64,
    pub auxiliary_cost: f64,

    /// Daily CO₂ in kg
    pub daily_co2: f64,
    /// Monthly CO₂ in kg
    pub monthly_co2: f64,
    /// Annual CO₂ in tonnes
    pub annual_co2: f64,
    /// Annual carbon cost at $50/tonne
    pub carbon_cost_per_year: f64,

    /// Load factor, percent
    pub power_efficiency: f64,
    /// kWh per operating hour
    pub energy_intensity: f64,
    pub cost_per_operating_hour: f64,

    pub recommendations: Vec<Recommendation>,
    pub hourly_breakdown: Vec<HourlyEntry>,
}

// Carbon price in $/tonne used for the footprint cost estimate
const CARBON_PRICE: f64 = 50.0;

/// Calculate energy costs and carbon footprint
pub fn calculate(input: &EnergyInput) -> EnergyResult {
    let effective_load = input.rated_power * (input.average_load / 100.0);
    let auxiliary_power = input.cooling_system_power + input.extraction_system_power;
    let total_system_power = effective_load + auxiliary_power;

    let days_per_week = input.operating_days_per_week as f64;
    let weeks_per_year = input.weeks_per_year as f64;
    let annual_operating_hours = input.daily_operating_hours * days_per_week * weeks_per_year;

    let peak_share = (input.peak_hours_percentage / 100.0).clamp(0.0, 1.0);
    let peak_hours = input.daily_operating_hours * peak_share;
    let off_peak_hours = (input.daily_operating_hours - peak_hours).max(0.0);
    let daily_peak_energy = total_system_power * peak_hours;
    let daily_off_peak_energy = total_system_power * off_peak_hours;
    let daily_energy = daily_peak_energy + daily_off_peak_energy;
    let weekly_energy = daily_energy * days_per_week;
    let annual_energy = weekly_energy * weeks_per_year;
    let monthly_energy = annual_energy / 12.0;

    let peak_rate = input.electricity_rate * (1.0 + input.peak_rate_premium / 100.0);
    let daily_cost =
        daily_peak_energy * peak_rate + daily_off_peak_energy * input.electricity_rate;
    let weekly_cost = daily_cost * days_per_week;
    let annual_cost = weekly_cost * weeks_per_year;
    let monthly_cost = annual_cost / 12.0;

    let standard_rate_cost =
        daily_off_peak_energy * days_per_week * weeks_per_year * input.electricity_rate;
    let peak_rate_cost = daily_peak_energy * days_per_week * weeks_per_year * peak_rate;
    let auxiliary_share = if total_system_power > 0.0 {
        (auxiliary_power / total_system_power).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let auxiliary_cost = annual_cost * auxiliary_share;

    let daily_co2 = daily_energy * input.grid_carbon_intensity / 1000.0;
    let monthly_co2 = monthly_energy * input.grid_carbon_intensity / 1000.0;
    let annual_co2 = annual_energy * input.grid_carbon_intensity / 1_000_000.0;
    let carbon_cost_per_year = annual_co2 * CARBON_PRICE;

    let power_efficiency = effective_load / input.rated_power * 100.0;
    let cost_per_operating_hour = annual_cost / annual_operating_hours;

    let hourly_breakdown = (0..24)
        .map(|hour| {
            let is_operating =
                hour >= 8 && (hour as f64) < 8.0 + input.daily_operating_hours;
            let is_peak = (9..17).contains(&hour);
            let rate = if is_peak { peak_rate } else { input.electricity_rate };
            let consumption = if is_operating { total_system_power } else { 0.0 };
            HourlyEntry {
                hour,
                consumption: round2(consumption),
                cost: round2(consumption * rate),
                is_peak: is_peak && is_operating,
            }
        })
        .collect();

    let mut recommendations = build_recommendations(
        input,
        annual_cost,
        annual_energy,
        power_efficiency,
        peak_rate_cost,
        auxiliary_cost,
    );
    recommendations.sort_by_key(|r| r.priority);

    EnergyResult {
        average_power_consumption: round2(effective_load),
        total_system_power: round2(total_system_power),
        effective_load: round2(effective_load),
        daily_energy_consumption: round2(daily_energy),
        weekly_energy_consumption: round2(weekly_energy),
        monthly_energy_consumption: round2(monthly_energy),
        annual_energy_consumption: round2(annual_energy),
        daily_cost: round2(daily_cost),
        weekly_cost: round2(weekly_cost),
        monthly_cost: round2(monthly_cost),
        annual_cost: round2(annual_cost),
        standard_rate_cost: round2(standard_rate_cost),
        peak_rate_cost: round2(peak_rate_cost),
        auxiliary_cost: round2(auxiliary_cost),
        daily_co2: round2(daily_co2),
        monthly_co2: round2(monthly_co2),
        annual_co2: round2(annual_co2),
        carbon_cost_per_year: round2(carbon_cost_per_year),
        power_efficiency: round1(power_efficiency),
        energy_intensity: round2(total_system_power),
        cost_per_operating_hour: round2(cost_per_operating_hour),
        recommendations,
        hourly_breakdown,
    }
}

fn build_recommendations(
    input: &EnergyInput,
    annual_cost: f64,
    annual_energy: f64,
    power_efficiency: f64,
    peak_rate_cost: f64,
    auxiliary_cost: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if input.peak_hours_percentage > 30.0 {
        recommendations.push(Recommendation {
            category: "peak_shifting",
            priority: Priority::High,
            title: "Shift Operations to Off-Peak Hours",
            description: format!(
                "{}% of your operations occur during peak hours. Moving production \
                 into off-peak windows can significantly lower electricity costs, \
                 depending on your tariff structure and scheduling flexibility.",
                input.peak_hours_percentage
            ),
            savings: Some(round2(peak_rate_cost * 0.5)),
        });
    }

    if power_efficiency < 70.0 {
        recommendations.push(Recommendation {
            category: "load_factor",
            priority: Priority::High,
            title: "Optimize Equipment Load Factor",
            description: format!(
                "In this estimate, the average load factor is {:.1}%. Reviewing batch \
                 sizes, idle time, and shift scheduling may improve effective \
                 utilization and reduce unproductive run time.",
                power_efficiency
            ),
            savings: Some(round2(annual_cost * 0.15)),
        });
    }

    let auxiliary_power = input.cooling_system_power + input.extraction_system_power;
    if auxiliary_power > input.rated_power * 0.3 {
        recommendations.push(Recommendation {
            category: "auxiliary_systems",
            priority: Priority::Medium,
            title: "Upgrade Auxiliary Systems",
            description: format!(
                "Auxiliary systems account for {:.0}% of main equipment power. More \
                 efficient cooling and extraction options or control strategies could \
                 reduce this share while still meeting process requirements.",
                auxiliary_power / input.rated_power * 100.0
            ),
            savings: Some(round2(auxiliary_cost * 0.25)),
        });
    }

    if annual_energy > 20000.0 {
        recommendations.push(Recommendation {
            category: "renewables",
            priority: Priority::Medium,
            title: "Consider Solar Panel Installation",
            description: format!(
                "With annual consumption of {:.0} kWh, on-site generation may be worth \
                 evaluating. Use the annual kWh figure when modeling system sizes and \
                 financial scenarios with your energy provider.",
                annual_energy
            ),
            savings: Some(round2(annual_cost * 0.3)),
        });
    }

    recommendations.push(Recommendation {
        category: "power_factor",
        priority: Priority::Low,
        title: "Install Power Factor Correction",
        description: "Poor power factor can result in utility penalties and wasted \
                      energy. Review your utility bills and demand charges to decide \
                      whether correction equipment is justified."
            .to_string(),
        savings: Some(round2(annual_cost * 0.08)),
    });

    if input.average_load > 85.0 {
        recommendations.push(Recommendation {
            category: "maintenance",
            priority: Priority::Medium,
            title: "Implement Preventive Maintenance Schedule",
            description: "High load factors can lead to increased wear. Regular \
                          maintenance ensures optimal efficiency and prevents costly \
                          breakdowns."
                .to_string(),
            savings: Some(round2(annual_cost * 0.12)),
        });
    }

    recommendations
}
