//! Laser welding cost calculator
//!
//! Weld speed comes from an empirical table keyed by material and process:
//! speed scales linearly with laser power up to a per-combination cap, with
//! thickness band rates. Spot welding is time-based per spot rather than
//! speed-based. Wall-plug efficiency improves with laser power class.

use serde::{Deserialize, Serialize};

use super::{require_range, round1, round2, CalcError};

/// Materials supported by the welding calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeldMaterial {
    MildSteel,
    // snake_case does not separate trailing digits, so the alloy grades
    // need explicit wire names
    #[serde(rename = "stainless_steel_304")]
    StainlessSteel304,
    #[serde(rename = "stainless_steel_316")]
    StainlessSteel316,
    #[serde(rename = "aluminum_5052")]
    Aluminum5052,
    #[serde(rename = "aluminum_6061")]
    Aluminum6061,
    Titanium,
    Copper,
    Brass,
    GalvanizedSteel,
}

/// Welding process types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeldProcess {
    /// Lower power, wider seam
    Conduction,
    /// Higher power, deep penetration
    Keyhole,
    /// Continuous seam
    Seam,
    /// Discrete points, time-based
    Spot,
    /// Lap joint
    Overlap,
    /// Butt joint
    Butt,
}

/// Joint geometry, recorded with the job but not speed-determining
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    ButtJoint,
    LapJoint,
    CornerJoint,
    TJoint,
    EdgeJoint,
}

/// Shielding gas options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShieldingGas {
    Argon,
    Helium,
    Nitrogen,
    None,
}

impl WeldProcess {
    /// Thickness band breakpoints (mm) for the speed table
    fn thickness_breaks(&self) -> (f64, f64) {
        match self {
            WeldProcess::Conduction | WeldProcess::Overlap => (1.0, 3.0),
            WeldProcess::Keyhole => (2.0, 5.0),
            WeldProcess::Seam | WeldProcess::Butt => (1.5, 4.0),
            WeldProcess::Spot => (0.0, 0.0),
        }
    }
}

impl WeldMaterial {
    /// Watts of laser power per unit of the band rate
    fn power_divisor(&self) -> f64 {
        match self {
            WeldMaterial::Copper | WeldMaterial::Brass => 1500.0,
            _ => 1000.0,
        }
    }

    /// Speed cap (mm/s) and per-band rates for a continuous process
    fn speed_params(&self, process: WeldProcess) -> (f64, [f64; 3]) {
        use WeldMaterial::*;
        use WeldProcess::*;
        match (self, process) {
            (MildSteel, Conduction) => (50.0, [40.0, 20.0, 10.0]),
            (MildSteel, Keyhole) => (80.0, [50.0, 30.0, 15.0]),
            (MildSteel, Seam) => (60.0, [35.0, 18.0, 10.0]),
            (MildSteel, Overlap) => (45.0, [30.0, 15.0, 8.0]),
            (MildSteel, Butt) => (55.0, [35.0, 20.0, 12.0]),

            (StainlessSteel304, Conduction) => (40.0, [30.0, 15.0, 8.0]),
            (StainlessSteel304, Keyhole) => (70.0, [45.0, 25.0, 12.0]),
            (StainlessSteel304, Seam) => (50.0, [30.0, 15.0, 8.0]),
            (StainlessSteel304, Overlap) => (40.0, [25.0, 12.0, 6.0]),
            (StainlessSteel304, Butt) => (50.0, [30.0, 18.0, 10.0]),

            (StainlessSteel316, Conduction) => (38.0, [28.0, 14.0, 7.0]),
            (StainlessSteel316, Keyhole) => (65.0, [42.0, 23.0, 11.0]),
            (StainlessSteel316, Seam) => (48.0, [28.0, 14.0, 7.0]),
            (StainlessSteel316, Overlap) => (38.0, [23.0, 11.0, 5.0]),
            (StainlessSteel316, Butt) => (48.0, [28.0, 16.0, 9.0]),

            (Aluminum5052, Conduction) => (45.0, [35.0, 18.0, 9.0]),
            (Aluminum5052, Keyhole) => (75.0, [48.0, 28.0, 14.0]),
            (Aluminum5052, Seam) => (55.0, [32.0, 16.0, 9.0]),
            (Aluminum5052, Overlap) => (42.0, [28.0, 14.0, 7.0]),
            (Aluminum5052, Butt) => (52.0, [32.0, 19.0, 11.0]),

            (Aluminum6061, Conduction) => (43.0, [33.0, 17.0, 8.0]),
            (Aluminum6061, Keyhole) => (72.0, [46.0, 26.0, 13.0]),
            (Aluminum6061, Seam) => (53.0, [30.0, 15.0, 8.0]),
            (Aluminum6061, Overlap) => (40.0, [26.0, 13.0, 6.0]),
            (Aluminum6061, Butt) => (50.0, [30.0, 18.0, 10.0]),

            (Titanium, Conduction) => (30.0, [20.0, 10.0, 5.0]),
            (Titanium, Keyhole) => (50.0, [30.0, 18.0, 9.0]),
            (Titanium, Seam) => (40.0, [22.0, 12.0, 6.0]),
            (Titanium, Overlap) => (28.0, [18.0, 9.0, 4.0]),
            (Titanium, Butt) => (38.0, [22.0, 13.0, 7.0]),

            (Copper, Conduction) => (35.0, [25.0, 12.0, 6.0]),
            (Copper, Keyhole) => (55.0, [35.0, 20.0, 10.0]),
            (Copper, Seam) => (45.0, [26.0, 14.0, 7.0]),
            (Copper, Overlap) => (33.0, [20.0, 10.0, 5.0]),
            (Copper, Butt) => (43.0, [26.0, 15.0, 8.0]),

            (Brass, Conduction) => (38.0, [27.0, 13.0, 6.0]),
            (Brass, Keyhole) => (60.0, [38.0, 22.0, 11.0]),
            (Brass, Seam) => (48.0, [28.0, 15.0, 7.0]),
            (Brass, Overlap) => (36.0, [22.0, 11.0, 5.0]),
            (Brass, Butt) => (46.0, [28.0, 16.0, 9.0]),

            (GalvanizedSteel, Conduction) => (45.0, [35.0, 18.0, 9.0]),
            (GalvanizedSteel, Keyhole) => (75.0, [45.0, 28.0, 14.0]),
            (GalvanizedSteel, Seam) => (55.0, [32.0, 16.0, 9.0]),
            (GalvanizedSteel, Overlap) => (42.0, [28.0, 14.0, 7.0]),
            (GalvanizedSteel, Butt) => (52.0, [32.0, 18.0, 10.0]),

            (_, Spot) => (0.0, [0.0, 0.0, 0.0]),
        }
    }

    /// Seconds per spot at thickness bands <=1, <=2, <=4, >4 mm
    fn spot_times(&self) -> [f64; 4] {
        match self {
            WeldMaterial::MildSteel | WeldMaterial::GalvanizedSteel => [0.5, 1.0, 1.5, 2.5],
            WeldMaterial::StainlessSteel304 | WeldMaterial::StainlessSteel316 => {
                [0.6, 1.2, 1.8, 3.0]
            }
            WeldMaterial::Aluminum5052 | WeldMaterial::Aluminum6061 => [0.4, 0.8, 1.2, 2.0],
            WeldMaterial::Titanium => [0.8, 1.5, 2.5, 4.0],
            WeldMaterial::Copper | WeldMaterial::Brass => [0.7, 1.3, 2.0, 3.5],
        }
    }

    /// Continuous weld speed in mm/s for the given process
    fn weld_speed(&self, process: WeldProcess, thickness: f64, power_watts: f64) -> f64 {
        let (cap, rates) = self.speed_params(process);
        let (low, high) = process.thickness_breaks();
        let rate = if thickness <= low {
            rates[0]
        } else if thickness <= high {
            rates[1]
        } else {
            rates[2]
        };
        (power_watts / self.power_divisor() * rate).min(cap)
    }

    /// Seconds per spot weld at the given thickness
    fn spot_time(&self, thickness: f64) -> f64 {
        let times = self.spot_times();
        if thickness <= 1.0 {
            times[0]
        } else if thickness <= 2.0 {
            times[1]
        } else if thickness <= 4.0 {
            times[2]
        } else {
            times[3]
        }
    }
}

/// Wall-plug efficiency by laser power class
fn power_efficiency(watts: f64) -> f64 {
    if watts <= 500.0 {
        0.25
    } else if watts <= 1000.0 {
        0.30
    } else if watts <= 2000.0 {
        0.35
    } else if watts <= 5000.0 {
        0.40
    } else {
        0.45
    }
}

/// Welding calculator input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeldingInput {
    pub welding_process: WeldProcess,
    pub material_type: WeldMaterial,
    pub joint_type: JointType,
    /// Material thickness in mm
    #[serde(default = "defaults::material_thickness_mm")]
    pub material_thickness_mm: f64,
    /// Weld length per weld in mm
    #[serde(default = "defaults::weld_length_mm")]
    pub weld_length_mm: f64,
    #[serde(default = "defaults::number_of_welds")]
    pub number_of_welds: u32,
    /// Laser power in watts
    #[serde(default = "defaults::laser_power_watts")]
    pub laser_power_watts: f64,
    #[serde(default = "defaults::equipment_cost")]
    pub equipment_cost: f64,
    #[serde(default = "defaults::equipment_lifespan_years")]
    pub equipment_lifespan_years: f64,
    #[serde(default = "defaults::annual_working_hours")]
    pub annual_working_hours: f64,
    #[serde(default = "defaults::electricity_rate_per_kwh")]
    pub electricity_rate_per_kwh: f64,
    #[serde(default = "defaults::shielding_gas_type")]
    pub shielding_gas_type: ShieldingGas,
    /// Shielding gas flow in L/min
    #[serde(default = "defaults::gas_flow_rate_l_per_min")]
    pub gas_flow_rate_l_per_min: f64,
    #[serde(default = "defaults::gas_cost_per_m3")]
    pub gas_cost_per_m3: f64,
    #[serde(default = "defaults::labor_rate_per_hour")]
    pub labor_rate_per_hour: f64,
    #[serde(default = "defaults::overhead_rate_per_hour")]
    pub overhead_rate_per_hour: f64,
    #[serde(default = "defaults::maintenance_rate_per_hour")]
    pub maintenance_rate_per_hour: f64,
    /// Adds 5 minutes per piece
    #[serde(default)]
    pub requires_preheat: bool,
    /// Adds 10 minutes per piece
    #[serde(default)]
    pub requires_post_heat_treatment: bool,
    #[serde(default)]
    pub quality_inspection_time_min: f64,
    /// Batch setup time, amortized across the batch
    #[serde(default = "defaults::setup_time_per_batch_min")]
    pub setup_time_per_batch_min: f64,
    #[serde(default = "defaults::quantity_per_batch")]
    pub quantity_per_batch: u32,
}

mod defaults {
    use super::ShieldingGas;

    pub fn material_thickness_mm() -> f64 {
        2.0
    }
    pub fn weld_length_mm() -> f64 {
        500.0
    }
    pub fn number_of_welds() -> u32 {
        1
    }
    pub fn laser_power_watts() -> f64 {
        1500.0
    }
    pub fn equipment_cost() -> f64 {
        150000.0
    }
    pub fn equipment_lifespan_years() -> f64 {
        10.0
    }
    pub fn annual_working_hours() -> f64 {
        2000.0
    }
    pub fn electricity_rate_per_kwh() -> f64 {
        0.12
    }
    pub fn shielding_gas_type() -> ShieldingGas {
        ShieldingGas::Argon
    }
    pub fn gas_flow_rate_l_per_min() -> f64 {
        15.0
    }
    pub fn gas_cost_per_m3() -> f64 {
        50.0
    }
    pub fn labor_rate_per_hour() -> f64 {
        35.0
    }
    pub fn overhead_rate_per_hour() -> f64 {
        10.0
    }
    pub fn maintenance_rate_per_hour() -> f64 {
        5.0
    }
    pub fn setup_time_per_batch_min() -> f64 {
        15.0
    }
    pub fn quantity_per_batch() -> u32 {
        1
    }
}

impl Default for WeldingInput {
    fn default() -> Self {
        Self {
            welding_process: WeldProcess::Conduction,
            material_type: WeldMaterial::MildSteel,
            joint_type: JointType::ButtJoint,
            material_thickness_mm: defaults::material_thickness_mm(),
            weld_length_mm: defaults::weld_length_mm(),
            number_of_welds: defaults::number_of_welds(),
            laser_power_watts: defaults::laser_power_watts(),
            equipment_cost: defaults::equipment_cost(),
            equipment_lifespan_years: defaults::equipment_lifespan_years(),
            annual_working_hours: defaults::annual_working_hours(),
            electricity_rate_per_kwh: defaults::electricity_rate_per_kwh(),
            shielding_gas_type: defaults::shielding_gas_type(),
            gas_flow_rate_l_per_min: defaults::gas_flow_rate_l_per_min(),
            gas_cost_per_m3: defaults::gas_cost_per_m3(),
            labor_rate_per_hour: defaults::labor_rate_per_hour(),
            overhead_rate_per_hour: defaults::overhead_rate_per_hour(),
            maintenance_rate_per_hour: defaults::maintenance_rate_per_hour(),
            requires_preheat: false,
            requires_post_heat_treatment: false,
            quality_inspection_time_min: 0.0,
            setup_time_per_batch_min: defaults::setup_time_per_batch_min(),
            quantity_per_batch: defaults::quantity_per_batch(),
        }
    }
}

impl WeldingInput {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_range("materialThicknessMm", self.material_thickness_mm, 0.1, 50.0)?;
        require_range("weldLengthMm", self.weld_length_mm, 1.0, 10000.0)?;
        require_range("numberOfWelds", self.number_of_welds as f64, 1.0, 10000.0)?;
        require_range("laserPowerWatts", self.laser_power_watts, 100.0, 20000.0)?;
        require_range("equipmentCost", self.equipment_cost, 10000.0, 5000000.0)?;
        require_range(
            "equipmentLifespanYears",
            self.equipment_lifespan_years,
            1.0,
            20.0,
        )?;
        require_range("annualWorkingHours", self.annual_working_hours, 100.0, 8760.0)?;
        require_range(
            "electricityRatePerKwh",
            self.electricity_rate_per_kwh,
            0.01,
            1.0,
        )?;
        require_range(
            "gasFlowRateLPerMin",
            self.gas_flow_rate_l_per_min,
            0.0,
            50.0,
        )?;
        require_range("gasCostPerM3", self.gas_cost_per_m3, 0.0, 500.0)?;
        require_range("laborRatePerHour", self.labor_rate_per_hour, 5.0, 300.0)?;
        require_range(
            "overheadRatePerHour",
            self.overhead_rate_per_hour,
            0.0,
            200.0,
        )?;
        require_range(
            "maintenanceRatePerHour",
            self.maintenance_rate_per_hour,
            0.0,
            100.0,
        )?;
        require_range(
            "qualityInspectionTimeMin",
            self.quality_inspection_time_min,
            0.0,
            60.0,
        )?;
        require_range(
            "setupTimePerBatchMin",
            self.setup_time_per_batch_min,
            0.0,
            240.0,
        )?;
        require_range(
            "quantityPerBatch",
            self.quantity_per_batch as f64,
            1.0,
            10000.0,
        )?;
        Ok(())
    }
}

/// Welding calculation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeldingResult {
    pub weld_speed_mm_per_sec: f64,
    pub weld_time_per_piece_sec: f64,
    pub setup_time_per_piece_min: f64,
    pub total_time_per_piece_sec: f64,
    pub total_batch_time_sec: f64,
    pub total_batch_time_formatted: String,

    pub depreciation_per_hour: f64,
    pub electricity_per_hour: f64,
    pub gas_cost_per_hour: f64,
    pub total_hourly_cost: f64,
    pub cost_per_piece: f64,
    pub total_batch_cost: f64,

    /// Margin applied to the recommended price, percent
    pub profit_margin: f64,
    pub recommended_price: f64,

    pub pieces_per_hour: f64,
    pub revenue_per_hour: f64,
    /// Weld time as a percent of total piece time
    pub utilization_rate: f64,
}

const PROFIT_MARGIN: f64 = 0.4;

fn format_batch_time(total_seconds: f64) -> String {
    let hours = (total_seconds / 3600.0).floor() as u64;
    let minutes = ((total_seconds % 3600.0) / 60.0).floor() as u64;
    let seconds = (total_seconds % 60.0).floor() as u64;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Calculate welding time, cost, and recommended pricing
pub fn calculate(input: &WeldingInput) -> WeldingResult {
    let weld_speed = if input.welding_process == WeldProcess::Spot {
        // 5mm spot spacing assumed
        let time_per_spot = input.material_type.spot_time(input.material_thickness_mm);
        5.0 / time_per_spot
    } else {
        input.material_type.weld_speed(
            input.welding_process,
            input.material_thickness_mm,
            input.laser_power_watts,
        )
    };

    let weld_time_per_piece = input.weld_length_mm / weld_speed * input.number_of_welds as f64;
    let setup_time_per_piece_min =
        input.setup_time_per_batch_min / input.quantity_per_batch as f64;

    let mut additional_time_min = input.quality_inspection_time_min;
    if input.requires_preheat {
        additional_time_min += 5.0;
    }
    if input.requires_post_heat_treatment {
        additional_time_min += 10.0;
    }

    let total_time_per_piece =
        weld_time_per_piece + (setup_time_per_piece_min + additional_time_min) * 60.0;
    let total_batch_time = total_time_per_piece * input.quantity_per_batch as f64;

    let depreciation_per_hour =
        input.equipment_cost / (input.equipment_lifespan_years * input.annual_working_hours);

    let efficiency = power_efficiency(input.laser_power_watts);
    let electricity_per_hour =
        input.laser_power_watts / 1000.0 * (input.electricity_rate_per_kwh / efficiency);

    let gas_cost_per_hour = if input.shielding_gas_type == ShieldingGas::None {
        0.0
    } else {
        input.gas_flow_rate_l_per_min * 60.0 * input.gas_cost_per_m3 / 1000.0
    };

    let total_hourly_cost = depreciation_per_hour
        + electricity_per_hour
        + gas_cost_per_hour
        + input.labor_rate_per_hour
        + input.overhead_rate_per_hour
        + input.maintenance_rate_per_hour;

    let cost_per_piece = total_time_per_piece / 3600.0 * total_hourly_cost;
    let total_batch_cost = cost_per_piece * input.quantity_per_batch as f64;

    let recommended_price = cost_per_piece / (1.0 - PROFIT_MARGIN);
    let pieces_per_hour = 3600.0 / total_time_per_piece;
    let revenue_per_hour = pieces_per_hour * recommended_price;
    let utilization_rate = weld_time_per_piece / total_time_per_piece * 100.0;

    WeldingResult {
        weld_speed_mm_per_sec: round1(weld_speed),
        weld_time_per_piece_sec: round1(weld_time_per_piece),
        setup_time_per_piece_min: round2(setup_time_per_piece_min),
        total_time_per_piece_sec: round1(total_time_per_piece),
        total_batch_time_sec: round1(total_batch_time),
        total_batch_time_formatted: format_batch_time(total_batch_time),
        depreciation_per_hour: round2(depreciation_per_hour),
        electricity_per_hour: round2(electricity_per_hour),
        gas_cost_per_hour: round2(gas_cost_per_hour),
        total_hourly_cost: round2(total_hourly_cost),
        cost_per_piece: round2(cost_per_piece),
        total_batch_cost: round2(total_batch_cost),
        profit_margin: (PROFIT_MARGIN * 100.0).round(),
        recommended_price: round2(recommended_price),
        pieces_per_hour: round1(pieces_per_hour),
        revenue_per_hour: round2(revenue_per_hour),
        utilization_rate: round1(utilization_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_validates() {
        assert!(WeldingInput::default().validate().is_ok());
    }

    #[test]
    fn test_material_wire_names() {
        let cases = [
            (WeldMaterial::MildSteel, "mild_steel"),
            (WeldMaterial::StainlessSteel304, "stainless_steel_304"),
            (WeldMaterial::StainlessSteel316, "stainless_steel_316"),
            (WeldMaterial::Aluminum5052, "aluminum_5052"),
            (WeldMaterial::Aluminum6061, "aluminum_6061"),
            (WeldMaterial::GalvanizedSteel, "galvanized_steel"),
        ];
        for (material, name) in cases {
            assert_eq!(serde_json::to_value(material).unwrap(), name);
            let parsed: WeldMaterial =
                serde_json::from_value(serde_json::Value::String(name.to_string())).unwrap();
            assert_eq!(parsed, material);
        }
    }

    #[test]
    fn test_conduction_speed_with_band_rate() {
        // Mild steel at 2mm is in the middle band (rate 20) at 1.5kW:
        // 1.5 * 20 = 30 mm/s, under the 50 mm/s cap
        let result = calculate(&WeldingInput::default());
        assert_eq!(result.weld_speed_mm_per_sec, 30.0);
    }

    #[test]
    fn test_speed_cap_applies() {
        let input = WeldingInput {
            laser_power_watts: 10000.0,
            material_thickness_mm: 0.5,
            ..Default::default()
        };
        let result = calculate(&input);
        assert_eq!(result.weld_speed_mm_per_sec, 50.0);
    }

    #[test]
    fn test_spot_welding_speed() {
        // Mild steel at 2mm: 1.0 s/spot, 5mm spacing = 5 mm/s
        let input = WeldingInput {
            welding_process: WeldProcess::Spot,
            ..Default::default()
        };
        let result = calculate(&input);
        assert_eq!(result.weld_speed_mm_per_sec, 5.0);
    }

    #[test]
    fn test_depreciation_per_hour_reference_value() {
        // 150000 / (10 * 2000) = 7.50/hour
        let result = calculate(&WeldingInput::default());
        assert_eq!(result.depreciation_per_hour, 7.5);
    }

    #[test]
    fn test_electricity_uses_wall_plug_efficiency() {
        // 1500W falls in the 0.35 efficiency class:
        // 1.5 kW * 0.12 / 0.35 = 0.514
        let result = calculate(&WeldingInput::default());
        assert_eq!(result.electricity_per_hour, 0.51);
    }

    #[test]
    fn test_gas_cost_per_hour() {
        // 15 L/min * 60 / 1000 * $50 = $45/hour
        let result = calculate(&WeldingInput::default());
        assert_eq!(result.gas_cost_per_hour, 45.0);

        let no_gas = calculate(&WeldingInput {
            shielding_gas_type: ShieldingGas::None,
            ..Default::default()
        });
        assert_eq!(no_gas.gas_cost_per_hour, 0.0);
    }

    #[test]
    fn test_heat_treatment_adds_time() {
        let base = calculate(&WeldingInput::default());
        let treated = calculate(&WeldingInput {
            requires_preheat: true,
            requires_post_heat_treatment: true,
            ..Default::default()
        });
        // 5 + 10 minutes = 900 extra seconds per piece
        assert_eq!(
            treated.total_time_per_piece_sec,
            base.total_time_per_piece_sec + 900.0
        );
    }

    #[test]
    fn test_recommended_price_margin() {
        let result = calculate(&WeldingInput::default());
        assert_eq!(result.profit_margin, 40.0);
        let expected = round2(result.cost_per_piece / 0.6);
        assert!((result.recommended_price - expected).abs() < 0.05);
    }

    #[test]
    fn test_format_batch_time() {
        assert_eq!(format_batch_time(45.0), "45s");
        assert_eq!(format_batch_time(125.0), "2m 5s");
        assert_eq!(format_batch_time(7265.0), "2h 1m");
    }

    #[test]
    fn test_batch_setup_amortization() {
        let single = calculate(&WeldingInput::default());
        let batch = calculate(&WeldingInput {
            quantity_per_batch: 10,
            ..Default::default()
        });
        assert_eq!(single.setup_time_per_piece_min, 15.0);
        assert_eq!(batch.setup_time_per_piece_min, 1.5);
        assert!(batch.cost_per_piece < single.cost_per_piece);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_material() -> impl Strategy<Value = WeldMaterial> {
            prop_oneof![
                Just(WeldMaterial::MildSteel),
                Just(WeldMaterial::StainlessSteel304),
                Just(WeldMaterial::StainlessSteel316),
                Just(WeldMaterial::Aluminum5052),
                Just(WeldMaterial::Aluminum6061),
                Just(WeldMaterial::Titanium),
                Just(WeldMaterial::Copper),
                Just(WeldMaterial::Brass),
                Just(WeldMaterial::GalvanizedSteel),
            ]
        }

        fn any_process() -> impl Strategy<Value = WeldProcess> {
            prop_oneof![
                Just(WeldProcess::Conduction),
                Just(WeldProcess::Keyhole),
                Just(WeldProcess::Seam),
                Just(WeldProcess::Spot),
                Just(WeldProcess::Overlap),
                Just(WeldProcess::Butt),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn every_combination_produces_positive_speed(
                material in any_material(),
                process in any_process(),
                thickness in 0.1f64..50.0,
                power in 100.0f64..20000.0,
            ) {
                let input = WeldingInput {
                    welding_process: process,
                    material_type: material,
                    material_thickness_mm: thickness,
                    laser_power_watts: power,
                    ..Default::default()
                };
                let result = calculate(&input);
                prop_assert!(result.weld_speed_mm_per_sec > 0.0);
                prop_assert!(result.cost_per_piece > 0.0);
                prop_assert!(result.recommended_price > result.cost_per_piece);
            }

            #[test]
            fn thicker_material_never_welds_faster(
                material in any_material(),
                t1 in 0.1f64..25.0,
                delta in 0.1f64..25.0,
            ) {
                let thin = calculate(&WeldingInput {
                    material_type: material,
                    material_thickness_mm: t1,
                    ..Default::default()
                });
                let thick = calculate(&WeldingInput {
                    material_type: material,
                    material_thickness_mm: t1 + delta,
                    ..Default::default()
                });
                prop_assert!(thick.weld_speed_mm_per_sec <= thin.weld_speed_mm_per_sec);
            }

            #[test]
            fn utilization_is_a_valid_percentage(
                setup in 0.0f64..240.0,
                quantity in 1u32..10000,
            ) {
                let result = calculate(&WeldingInput {
                    setup_time_per_batch_min: setup,
                    quantity_per_batch: quantity,
                    ..Default::default()
                });
                prop_assert!(result.utilization_rate > 0.0);
                prop_assert!(result.utilization_rate <= 100.0);
            }
        }
    }
}
