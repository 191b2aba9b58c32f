//! Material utilization and nesting calculator
//!
//! Rectangular grid nesting only: parts are placed row by row inside the
//! sheet margins, in normal or 90°-rotated orientation, whichever fits more
//! parts. The mixed-orientation alternative is a rough weighted estimate,
//! not a real nesting pass.

use serde::{Deserialize, Serialize};

use super::{require_range, round2, CalcError, Priority, Recommendation};

/// Sheet materials supported by the utilization calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetMaterial {
    Steel,
    StainlessSteel,
    Aluminum,
    Copper,
    Brass,
}

impl SheetMaterial {
    /// Density in kg/m³
    pub fn density(&self) -> f64 {
        match self {
            SheetMaterial::Steel => 7850.0,
            SheetMaterial::StainlessSteel => 7900.0,
            SheetMaterial::Aluminum => 2700.0,
            SheetMaterial::Copper => 8960.0,
            SheetMaterial::Brass => 8500.0,
        }
    }
}

/// Material utilization calculator input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUtilizationInput {
    /// Sheet length in mm
    pub sheet_length: f64,
    /// Sheet width in mm
    pub sheet_width: f64,
    /// Part length in mm
    pub part_length: f64,
    /// Part width in mm
    pub part_width: f64,
    /// Number of parts to produce
    pub quantity: u32,
    /// Kerf width in mm
    #[serde(default = "defaults::kerf")]
    pub kerf: f64,
    /// Margin kept free along each sheet edge, mm
    #[serde(default = "defaults::edge_margin")]
    pub edge_margin: f64,
    /// Spacing between adjacent parts, mm
    #[serde(default = "defaults::part_spacing")]
    pub part_spacing: f64,
    #[serde(default = "defaults::allow_rotation")]
    pub allow_rotation: bool,
    pub material_type: SheetMaterial,
    /// Sheet thickness in mm
    pub material_thickness: f64,
    /// Material price in $/kg
    pub material_price_per_kg: f64,
    /// Scrap recovery value in $/kg
    #[serde(default = "defaults::scrap_value_per_kg")]
    pub scrap_value_per_kg: f64,
}

mod defaults {
    pub fn kerf() -> f64 {
        0.3
    }
    pub fn edge_margin() -> f64 {
        5.0
    }
    pub fn part_spacing() -> f64 {
        2.0
    }
    pub fn allow_rotation() -> bool {
        true
    }
    pub fn scrap_value_per_kg() -> f64 {
        0.5
    }
}

impl Default for MaterialUtilizationInput {
    fn default() -> Self {
        Self {
            sheet_length: 3000.0,
            sheet_width: 1500.0,
            part_length: 200.0,
            part_width: 100.0,
            quantity: 50,
            kerf: defaults::kerf(),
            edge_margin: defaults::edge_margin(),
            part_spacing: defaults::part_spacing(),
            allow_rotation: defaults::allow_rotation(),
            material_type: SheetMaterial::Steel,
            material_thickness: 3.0,
            material_price_per_kg: 3.0,
            scrap_value_per_kg: defaults::scrap_value_per_kg(),
        }
    }
}

impl MaterialUtilizationInput {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_range("sheetLength", self.sheet_length, 100.0, 10000.0)?;
        require_range("sheetWidth", self.sheet_width, 100.0, 10000.0)?;
        require_range("partLength", self.part_length, 1.0, 5000.0)?;
        require_range("partWidth", self.part_width, 1.0, 5000.0)?;
        require_range("quantity", self.quantity as f64, 1.0, 10000.0)?;
        require_range("kerf", self.kerf, 0.0, 10.0)?;
        require_range("edgeMargin", self.edge_margin, 0.0, 100.0)?;
        require_range("partSpacing", self.part_spacing, 0.0, 50.0)?;
        require_range("materialThickness", self.material_thickness, 0.5, 50.0)?;
        require_range("materialPricePerKg", self.material_price_per_kg, 0.1, 1000.0)?;
        require_range("scrapValuePerKg", self.scrap_value_per_kg, 0.0, 1000.0)?;
        Ok(())
    }
}

/// One placed part in the nesting layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedPart {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotated: bool,
}

/// Grid nesting layout for one sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestingLayout {
    pub parts_per_sheet: u32,
    pub rows: u32,
    pub cols: u32,
    pub rotated: bool,
    pub parts: Vec<PlacedPart>,
}

/// One alternative layout estimate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeLayout {
    pub description: &'static str,
    pub utilization_rate: f64,
    pub parts_per_sheet: u32,
}

/// Material utilization calculation result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUtilizationResult {
    /// Used share of the sheet, percent
    pub utilization_rate: f64,
    pub waste_rate: f64,
    pub parts_per_sheet: u32,
    pub sheets_required: u32,

    /// Areas in mm²
    pub sheet_area: f64,
    pub used_area: f64,
    pub waste_area: f64,
    pub part_area: f64,

    /// Weights in kg
    pub sheet_weight: f64,
    pub used_weight: f64,
    pub waste_weight: f64,
    pub total_material_weight: f64,

    pub total_material_cost: f64,
    pub material_cost_per_part: f64,
    pub waste_cost: f64,
    pub scrap_value: f64,
    pub net_material_cost: f64,

    pub layout: NestingLayout,
    pub alternative_layouts: Vec<AlternativeLayout>,
    pub recommendations: Vec<Recommendation>,
}

/// Round to 3 decimal places, used for weights in kg
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Calculate material utilization and nesting layout
pub fn calculate(
    input: &MaterialUtilizationInput,
) -> Result<MaterialUtilizationResult, CalcError> {
    let available_length = input.sheet_length - 2.0 * input.edge_margin;
    let available_width = input.sheet_width - 2.0 * input.edge_margin;

    let effective_length = input.part_length + input.kerf + input.part_spacing;
    let effective_width = input.part_width + input.kerf + input.part_spacing;

    let layout = optimal_layout(
        available_length,
        available_width,
        input.part_length,
        input.part_width,
        effective_length,
        effective_width,
        input.allow_rotation,
        input.edge_margin,
    );

    let parts_per_sheet = layout.parts_per_sheet;
    if parts_per_sheet == 0 {
        return Err(CalcError::PartDoesNotFit);
    }
    let sheets_required = (input.quantity + parts_per_sheet - 1) / parts_per_sheet;

    let sheet_area = input.sheet_length * input.sheet_width;
    let part_area = input.part_length * input.part_width;
    let used_area = part_area * parts_per_sheet as f64;
    let waste_area = sheet_area - used_area;

    let utilization_rate = used_area / sheet_area * 100.0;
    let waste_rate = 100.0 - utilization_rate;

    let density = input.material_type.density();
    let volume_m3 = sheet_area * input.material_thickness / 1e9;
    let sheet_weight = volume_m3 * density;
    let used_weight = sheet_weight * (utilization_rate / 100.0);
    let waste_weight = sheet_weight - used_weight;
    let total_material_weight = sheet_weight * sheets_required as f64;

    let total_material_cost = total_material_weight * input.material_price_per_kg;
    let waste_cost = waste_weight * sheets_required as f64 * input.material_price_per_kg;
    let scrap_value = waste_weight * sheets_required as f64 * input.scrap_value_per_kg;
    let net_material_cost = total_material_cost - scrap_value;
    let material_cost_per_part = net_material_cost / input.quantity as f64;

    let alternative_layouts = alternative_layouts(
        available_length,
        available_width,
        input.part_length,
        input.part_width,
        effective_length,
        effective_width,
    );

    let mut recommendations =
        build_recommendations(input, utilization_rate, waste_rate, parts_per_sheet, waste_cost);
    recommendations.sort_by_key(|r| r.priority);

    Ok(MaterialUtilizationResult {
        utilization_rate: round2(utilization_rate),
        waste_rate: round2(waste_rate),
        parts_per_sheet,
        sheets_required,
        sheet_area: round2(sheet_area),
        used_area: round2(used_area),
        waste_area: round2(waste_area),
        part_area: round2(part_area),
        sheet_weight: round3(sheet_weight),
        used_weight: round3(used_weight),
        waste_weight: round3(waste_weight),
        total_material_weight: round3(total_material_weight),
        total_material_cost: round2(total_material_cost),
        material_cost_per_part: round2(material_cost_per_part),
        waste_cost: round2(waste_cost),
        scrap_value: round2(scrap_value),
        net_material_cost: round2(net_material_cost),
        layout,
        alternative_layouts,
        recommendations,
    })
}

fn grid_count(available: f64, effective: f64) -> u32 {
    if effective <= 0.0 || available < effective {
        0
    } else {
        (available / effective).floor() as u32
    }
}

#[allow(clippy::too_many_arguments)]
fn optimal_layout(
    available_length: f64,
    available_width: f64,
    part_length: f64,
    part_width: f64,
    effective_length: f64,
    effective_width: f64,
    allow_rotation: bool,
    edge_margin: f64,
) -> NestingLayout {
    let cols_normal = grid_count(available_length, effective_length);
    let rows_normal = grid_count(available_width, effective_width);
    let parts_normal = cols_normal * rows_normal;

    let mut cols = cols_normal;
    let mut rows = rows_normal;
    let mut parts_per_sheet = parts_normal;
    let mut rotated = false;

    if allow_rotation {
        let cols_rotated = grid_count(available_length, effective_width);
        let rows_rotated = grid_count(available_width, effective_length);
        let parts_rotated = cols_rotated * rows_rotated;

        if parts_rotated > parts_normal {
            cols = cols_rotated;
            rows = rows_rotated;
            parts_per_sheet = parts_rotated;
            rotated = true;
        }
    }

    let (placed_length, placed_width) = if rotated {
        (part_width, part_length)
    } else {
        (part_length, part_width)
    };
    let (step_length, step_width) = if rotated {
        (effective_width, effective_length)
    } else {
        (effective_length, effective_width)
    };

    let mut parts = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            parts.push(PlacedPart {
                x: edge_margin + col as f64 * step_length,
                y: edge_margin + row as f64 * step_width,
                width: placed_length,
                height: placed_width,
                rotated,
            });
        }
    }

    NestingLayout {
        parts_per_sheet,
        rows,
        cols,
        rotated,
        parts,
    }
}

fn alternative_layouts(
    available_length: f64,
    available_width: f64,
    part_length: f64,
    part_width: f64,
    effective_length: f64,
    effective_width: f64,
) -> Vec<AlternativeLayout> {
    let available_area = available_length * available_width;
    let part_area = part_length * part_width;
    let utilization = |parts: u32| round2(part_area * parts as f64 / available_area * 100.0);

    let parts_normal =
        grid_count(available_length, effective_length) * grid_count(available_width, effective_width);
    let parts_rotated =
        grid_count(available_length, effective_width) * grid_count(available_width, effective_length);
    // Rough weighted estimate of what mixed-orientation nesting might reach
    let parts_mixed = (parts_normal as f64 * 0.8 + parts_rotated as f64 * 0.3).floor() as u32;

    let mut alternatives = vec![
        AlternativeLayout {
            description: "Standard orientation (no rotation)",
            utilization_rate: utilization(parts_normal),
            parts_per_sheet: parts_normal,
        },
        AlternativeLayout {
            description: "Rotated 90° orientation",
            utilization_rate: utilization(parts_rotated),
            parts_per_sheet: parts_rotated,
        },
        AlternativeLayout {
            description: "Mixed orientation (rough estimate, requires nesting software)",
            utilization_rate: utilization(parts_mixed),
            parts_per_sheet: parts_mixed,
        },
    ];

    alternatives.sort_by(|a, b| {
        b.utilization_rate
            .partial_cmp(&a.utilization_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    alternatives
}

fn build_recommendations(
    input: &MaterialUtilizationInput,
    utilization_rate: f64,
    waste_rate: f64,
    parts_per_sheet: u32,
    waste_cost: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let part_area = input.part_length * input.part_width;

    if utilization_rate < 70.0 {
        recommendations.push(Recommendation {
            category: "orientation",
            priority: Priority::High,
            title: "Optimize Part Orientation",
            description: format!(
                "Current utilization is {:.1}%. Consider part rotation, adjusted \
                 spacing, or dedicated nesting software. Achievable levels depend on \
                 your parts, materials, and cutting process.",
                utilization_rate
            ),
            savings: Some(round2(waste_cost * 0.3)),
        });
    }

    if waste_rate > 25.0 {
        recommendations.push(Recommendation {
            category: "sheet_size",
            priority: Priority::High,
            title: "Consider Different Sheet Sizes",
            description: format!(
                "{:.1}% waste detected. Sheet sizes closer to your part dimensions \
                 could significantly reduce waste. Consult your supplier about \
                 available sizes.",
                waste_rate
            ),
            savings: Some(round2(waste_cost * 0.4)),
        });
    }

    if input.kerf > 0.5 {
        let kerf_waste_kg = input.quantity as f64 * part_area * input.kerf / 1e9
            * input.material_type.density();
        recommendations.push(Recommendation {
            category: "kerf",
            priority: Priority::Medium,
            title: "Optimize Cutting Process",
            description: format!(
                "Your kerf width ({}mm) is relatively wide. Finer cutting processes \
                 or optimized parameters can reduce material loss where quality \
                 requirements allow.",
                input.kerf
            ),
            savings: Some(round2(kerf_waste_kg * input.material_price_per_kg)),
        });
    }

    if input.quantity < parts_per_sheet * 2 {
        let empty_positions = parts_per_sheet - (input.quantity % parts_per_sheet);
        recommendations.push(Recommendation {
            category: "batch_size",
            priority: Priority::Low,
            title: "Increase Batch Size",
            description: format!(
                "Your batch size ({} parts) leaves {} empty positions on the last \
                 sheet. Ordering in multiples of {} maximizes utilization.",
                input.quantity, empty_positions, parts_per_sheet
            ),
            savings: None,
        });
    }

    if input.part_spacing > 3.0 {
        recommendations.push(Recommendation {
            category: "common_cuts",
            priority: Priority::Medium,
            title: "Implement Common Cut Lines",
            description: "Adjacent parts can sometimes share cutting paths, reducing \
                          total cutting length and kerf waste. Evaluate whether part \
                          geometry and quality requirements permit this."
                .to_string(),
            savings: Some(round2(waste_cost * 0.15)),
        });
    }

    if input.scrap_value_per_kg < input.material_price_per_kg * 0.3 {
        recommendations.push(Recommendation {
            category: "scrap_recycling",
            priority: Priority::Low,
            title: "Improve Scrap Recycling Program",
            description: format!(
                "Your scrap value is {:.0}% of material cost. Reviewing scrap \
                 handling, sorting, and recycling agreements may improve recovery.",
                input.scrap_value_per_kg / input.material_price_per_kg * 100.0
            ),
            savings: Some(round2(waste_cost * 0.4)),
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_validates() {
        assert!(MaterialUtilizationInput::default().validate().is_ok());
    }

    #[test]
    fn test_default_layout() {
        // 2990x1490 usable, 202.3x102.3 effective part: normal fits
        // 14x14 = 196, rotated fits 29x7 = 203 and wins
        let result = calculate(&MaterialUtilizationInput::default()).unwrap();
        assert!(result.layout.rotated);
        assert_eq!(result.layout.cols, 29);
        assert_eq!(result.layout.rows, 7);
        assert_eq!(result.parts_per_sheet, 203);
        assert_eq!(result.layout.parts.len(), 203);
        assert_eq!(result.sheets_required, 1);
    }

    #[test]
    fn test_areas_and_utilization() {
        let result = calculate(&MaterialUtilizationInput::default()).unwrap();
        assert_eq!(result.sheet_area, 4_500_000.0);
        assert_eq!(result.part_area, 20_000.0);
        assert_eq!(result.used_area, 4_060_000.0);
        assert_eq!(result.utilization_rate, 90.22);
        assert_eq!(result.waste_rate, 9.78);
    }

    #[test]
    fn test_weights_and_costs() {
        // 4.5 m² * 3mm of steel = 0.0135 m³ * 7850 = 105.975 kg per sheet
        let result = calculate(&MaterialUtilizationInput::default()).unwrap();
        assert_eq!(result.sheet_weight, 105.975);
        assert_eq!(result.total_material_cost, round2(105.975 * 3.0));
        assert!((result.net_material_cost
            - (result.total_material_cost - result.scrap_value))
            .abs()
            < 0.01);
    }

    #[test]
    fn test_rotation_wins_when_it_fits_more() {
        // A 140x90 part on a 1000x300 sheet: normal fits 7x3=21,
        // rotated fits 11x2=22
        let input = MaterialUtilizationInput {
            sheet_length: 1000.0,
            sheet_width: 300.0,
            part_length: 140.0,
            part_width: 90.0,
            quantity: 20,
            kerf: 0.0,
            edge_margin: 0.0,
            part_spacing: 0.0,
            ..Default::default()
        };
        let with_rotation = calculate(&input).unwrap();
        assert!(with_rotation.layout.rotated);

        let without = calculate(&MaterialUtilizationInput {
            allow_rotation: false,
            ..input
        })
        .unwrap();
        assert!(!without.layout.rotated);
        assert!(with_rotation.parts_per_sheet > without.parts_per_sheet);
    }

    #[test]
    fn test_part_positions_respect_margins() {
        let input = MaterialUtilizationInput::default();
        let result = calculate(&input).unwrap();
        for part in &result.layout.parts {
            assert!(part.x >= input.edge_margin);
            assert!(part.y >= input.edge_margin);
            assert!(part.x + part.width <= input.sheet_length - input.edge_margin);
            assert!(part.y + part.height <= input.sheet_width - input.edge_margin);
        }
    }

    #[test]
    fn test_part_larger_than_sheet() {
        let input = MaterialUtilizationInput {
            sheet_length: 100.0,
            sheet_width: 100.0,
            part_length: 500.0,
            part_width: 500.0,
            ..Default::default()
        };
        assert_eq!(calculate(&input).unwrap_err(), CalcError::PartDoesNotFit);
    }

    #[test]
    fn test_alternative_layouts_sorted() {
        let result = calculate(&MaterialUtilizationInput::default()).unwrap();
        assert_eq!(result.alternative_layouts.len(), 3);
        for pair in result.alternative_layouts.windows(2) {
            assert!(pair[0].utilization_rate >= pair[1].utilization_rate);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn utilization_never_exceeds_hundred(
                sheet_l in 500.0f64..10000.0,
                sheet_w in 500.0f64..10000.0,
                part_l in 10.0f64..400.0,
                part_w in 10.0f64..400.0,
            ) {
                let input = MaterialUtilizationInput {
                    sheet_length: sheet_l,
                    sheet_width: sheet_w,
                    part_length: part_l,
                    part_width: part_w,
                    ..Default::default()
                };
                if let Ok(result) = calculate(&input) {
                    prop_assert!(result.utilization_rate > 0.0);
                    prop_assert!(result.utilization_rate <= 100.0);
                    prop_assert!((result.utilization_rate + result.waste_rate - 100.0).abs() < 0.01);
                }
            }

            #[test]
            fn sheets_cover_quantity(
                quantity in 1u32..10000,
            ) {
                let input = MaterialUtilizationInput { quantity, ..Default::default() };
                let result = calculate(&input).unwrap();
                prop_assert!(result.sheets_required * result.parts_per_sheet >= quantity);
                prop_assert!((result.sheets_required - 1) * result.parts_per_sheet < quantity);
            }

            #[test]
            fn wider_spacing_never_fits_more_parts(
                s1 in 0.0f64..25.0,
                delta in 0.5f64..25.0,
            ) {
                let tight = calculate(&MaterialUtilizationInput { part_spacing: s1, ..Default::default() }).unwrap();
                let loose = calculate(&MaterialUtilizationInput { part_spacing: s1 + delta, ..Default::default() }).unwrap();
                prop_assert!(loose.parts_per_sheet <= tight.parts_per_sheet);
            }
        }
    }
}
