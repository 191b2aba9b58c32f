//! Quotation margin simulator
//!
//! Prices a job from base cost and target margin, then layers payment-terms
//! carrying cost and a risk buffer on top. Margin and markup are kept
//! distinct: margin is profit over price, markup is profit over cost.

use serde::{Deserialize, Serialize};

use super::{require_range, round1, round2, CalcError};

/// Payment terms, each with a carrying-cost surcharge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentTerms {
    Immediate,
    Net30,
    Net60,
    Net90,
}

impl PaymentTerms {
    fn multiplier(&self) -> f64 {
        match self {
            PaymentTerms::Immediate => 0.0,
            PaymentTerms::Net30 => 0.01,
            PaymentTerms::Net60 => 0.02,
            PaymentTerms::Net90 => 0.03,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PaymentTerms::Immediate => "immediate",
            PaymentTerms::Net30 => "net30",
            PaymentTerms::Net60 => "net60",
            PaymentTerms::Net90 => "net90",
        }
    }
}

/// Job risk level, adding a price buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFactor {
    Low,
    Medium,
    High,
}

impl RiskFactor {
    fn multiplier(&self) -> f64 {
        match self {
            RiskFactor::Low => 0.0,
            RiskFactor::Medium => 0.05,
            RiskFactor::High => 0.10,
        }
    }
}

/// One volume discount tier supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDiscount {
    pub quantity: u32,
    pub discount_percent: f64,
}

/// Quotation margin simulator input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationInput {
    /// Total manufacturing cost of the job
    pub base_cost: f64,
    pub material_cost: f64,
    pub labor_cost: f64,
    pub overhead_cost: f64,
    pub target_margin_percent: f64,
    #[serde(default)]
    pub competitor_price: Option<f64>,
    #[serde(default)]
    pub volume_discounts: Vec<VolumeDiscount>,
    pub payment_terms: PaymentTerms,
    pub risk_factor: RiskFactor,
}

impl Default for QuotationInput {
    fn default() -> Self {
        Self {
            base_cost: 1000.0,
            material_cost: 400.0,
            labor_cost: 350.0,
            overhead_cost: 250.0,
            target_margin_percent: 30.0,
            competitor_price: None,
            volume_discounts: Vec::new(),
            payment_terms: PaymentTerms::Net30,
            risk_factor: RiskFactor::Medium,
        }
    }
}

impl QuotationInput {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_range("baseCost", self.base_cost, 1.0, 1000000.0)?;
        require_range("materialCost", self.material_cost, 0.0, 1000000.0)?;
        require_range("laborCost", self.labor_cost, 0.0, 1000000.0)?;
        require_range("overheadCost", self.overhead_cost, 0.0, 1000000.0)?;
        // A 100% margin would price at infinity
        require_range(
            "targetMarginPercent",
            self.target_margin_percent,
            0.0,
            99.9,
        )?;
        if let Some(price) = self.competitor_price {
            require_range("competitorPrice", price, 0.0, 1000000.0)?;
        }
        for tier in &self.volume_discounts {
            require_range("volumeDiscounts.quantity", tier.quantity as f64, 1.0, 1000000.0)?;
            require_range(
                "volumeDiscounts.discountPercent",
                tier.discount_percent,
                0.0,
                50.0,
            )?;
        }
        Ok(())
    }
}

/// One priced volume tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeTierPricing {
    pub quantity: u32,
    pub discount_percent: f64,
    pub price_per_unit: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub margin_percent: f64,
}

/// Where the final price lands relative to the competitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricePosition {
    Lower,
    Similar,
    Higher,
}

/// Competitor price comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorComparison {
    pub competitor_price: f64,
    pub our_price: f64,
    pub price_difference: f64,
    pub percentage_difference: f64,
    pub position: PricePosition,
}

/// Quotation margin simulation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationResult {
    pub suggested_price: f64,
    pub profit_amount: f64,
    pub margin_percent: f64,
    pub markup_percent: f64,

    pub material_percent: f64,
    pub labor_percent: f64,
    pub overhead_percent: f64,
    pub profit_percent: f64,

    pub payment_terms_adjustment: f64,
    pub adjusted_price: f64,

    pub risk_adjustment: f64,
    pub final_recommended_price: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_pricing: Option<Vec<VolumeTierPricing>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_comparison: Option<CompetitorComparison>,

    pub break_even_price: f64,
    /// Base cost plus a 10% minimum margin
    pub minimum_acceptable_price: f64,
    pub recommendations: Vec<String>,
}

/// Simulate quotation pricing with margin, terms, and risk adjustments
pub fn calculate(input: &QuotationInput) -> QuotationResult {
    let margin_fraction = input.target_margin_percent / 100.0;
    let suggested_price = input.base_cost / (1.0 - margin_fraction);
    let profit_amount = suggested_price - input.base_cost;
    let markup_percent = profit_amount / input.base_cost * 100.0;

    let material_percent = input.material_cost / suggested_price * 100.0;
    let labor_percent = input.labor_cost / suggested_price * 100.0;
    let overhead_percent = input.overhead_cost / suggested_price * 100.0;
    let profit_percent = profit_amount / suggested_price * 100.0;

    let payment_terms_adjustment = suggested_price * input.payment_terms.multiplier();
    let adjusted_price = suggested_price + payment_terms_adjustment;

    let risk_adjustment = adjusted_price * input.risk_factor.multiplier();
    let final_recommended_price = adjusted_price + risk_adjustment;

    let break_even_price = input.base_cost;
    let minimum_acceptable_price = input.base_cost * 1.10;

    let volume_pricing = if input.volume_discounts.is_empty() {
        None
    } else {
        Some(
            input
                .volume_discounts
                .iter()
                .map(|tier| {
                    let discounted_price =
                        final_recommended_price * (1.0 - tier.discount_percent / 100.0);
                    let total_revenue = discounted_price * tier.quantity as f64;
                    let total_cost = input.base_cost * tier.quantity as f64;
                    let total_profit = total_revenue - total_cost;
                    let margin_percent = total_profit / total_revenue * 100.0;

                    VolumeTierPricing {
                        quantity: tier.quantity,
                        discount_percent: tier.discount_percent,
                        price_per_unit: round2(discounted_price),
                        total_revenue: round2(total_revenue),
                        total_profit: round2(total_profit),
                        margin_percent: round1(margin_percent),
                    }
                })
                .collect::<Vec<_>>(),
        )
    };

    let competitor_comparison = input
        .competitor_price
        .filter(|&price| price > 0.0)
        .map(|competitor_price| {
            let price_difference = final_recommended_price - competitor_price;
            let percentage_difference = price_difference / competitor_price * 100.0;
            let position = if percentage_difference < -5.0 {
                PricePosition::Lower
            } else if percentage_difference > 5.0 {
                PricePosition::Higher
            } else {
                PricePosition::Similar
            };

            CompetitorComparison {
                competitor_price,
                our_price: final_recommended_price,
                price_difference: round2(price_difference),
                percentage_difference: round1(percentage_difference),
                position,
            }
        });

    let recommendations = build_recommendations(
        input,
        material_percent,
        labor_percent,
        overhead_percent,
        competitor_comparison.as_ref(),
        volume_pricing.as_deref(),
    );

    QuotationResult {
        suggested_price: round2(suggested_price),
        profit_amount: round2(profit_amount),
        margin_percent: round1(input.target_margin_percent),
        markup_percent: round1(markup_percent),
        material_percent: round1(material_percent),
        labor_percent: round1(labor_percent),
        overhead_percent: round1(overhead_percent),
        profit_percent: round1(profit_percent),
        payment_terms_adjustment: round2(payment_terms_adjustment),
        adjusted_price: round2(adjusted_price),
        risk_adjustment: round2(risk_adjustment),
        final_recommended_price: round2(final_recommended_price),
        volume_pricing,
        competitor_comparison,
        break_even_price: round2(break_even_price),
        minimum_acceptable_price: round2(minimum_acceptable_price),
        recommendations,
    }
}

fn build_recommendations(
    input: &QuotationInput,
    material_percent: f64,
    labor_percent: f64,
    overhead_percent: f64,
    competitor: Option<&CompetitorComparison>,
    volume_pricing: Option<&[VolumeTierPricing]>,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if input.target_margin_percent < 20.0 {
        recommendations.push(
            "Target margin below 20% is low. Ensure volume justifies thin margins or \
             consider increasing price."
                .to_string(),
        );
    } else if input.target_margin_percent > 50.0 {
        recommendations.push(
            "Target margin above 50% is high. Ensure value proposition justifies premium \
             pricing or risk losing to competitors."
                .to_string(),
        );
    }

    if material_percent > 60.0 {
        recommendations.push(format!(
            "Material costs are {:.0}% of price. Consider negotiating bulk discounts with \
             suppliers.",
            material_percent
        ));
    }

    if labor_percent > 40.0 {
        recommendations.push(
            "Labor costs are high. Consider automation or process optimization \
             opportunities."
                .to_string(),
        );
    }

    if overhead_percent > 30.0 {
        recommendations.push(
            "Overhead allocation is high. Review if overhead rates are current and accurate."
                .to_string(),
        );
    }

    if matches!(
        input.payment_terms,
        PaymentTerms::Net60 | PaymentTerms::Net90
    ) {
        recommendations.push(format!(
            "Extended payment terms ({}) increase carrying costs by {:.0}%. Consider early \
             payment discounts.",
            input.payment_terms.label(),
            input.payment_terms.multiplier() * 100.0
        ));
    }

    if input.risk_factor == RiskFactor::High {
        recommendations.push(
            "High risk factor applied (10% buffer). Consider requiring deposit or progress \
             payments to mitigate risk."
                .to_string(),
        );
    }

    if let Some(comparison) = competitor {
        match comparison.position {
            PricePosition::Higher => recommendations.push(format!(
                "Price is {:.0}% higher than competitor. Justify with quality, service, or \
                 delivery advantages.",
                comparison.percentage_difference.abs()
            )),
            PricePosition::Lower => recommendations.push(format!(
                "Price is {:.0}% lower than competitor. Consider if you can increase \
                 margins.",
                comparison.percentage_difference.abs()
            )),
            PricePosition::Similar => recommendations.push(
                "Price is competitive with market. Focus on non-price differentiators to win \
                 the business."
                    .to_string(),
            ),
        }
    }

    if let Some(tiers) = volume_pricing {
        if let Some(lowest) = tiers
            .iter()
            .map(|t| t.margin_percent)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        {
            if lowest < 15.0 {
                recommendations.push(format!(
                    "Volume discount reduces margin to {:.0}%. Ensure volume justifies thin \
                     margins.",
                    lowest
                ));
            }
        }
    }

    recommendations.push(
        "Always verify actual costs before quoting. Use this as a guideline, not absolute."
            .to_string(),
    );

    if (25.0..=35.0).contains(&input.target_margin_percent) {
        recommendations.push(
            "Target margin is in healthy range (25-35%) for custom fabrication work."
                .to_string(),
        );
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_validates() {
        assert!(QuotationInput::default().validate().is_ok());
    }

    #[test]
    fn test_margin_pricing() {
        // 1000 / (1 - 0.30) = 1428.57, markup 42.9%
        let result = calculate(&QuotationInput::default());
        assert_eq!(result.suggested_price, 1428.57);
        assert_eq!(result.profit_amount, 428.57);
        assert_eq!(result.margin_percent, 30.0);
        assert_eq!(result.markup_percent, 42.9);
    }

    #[test]
    fn test_terms_and_risk_stack() {
        // net30 adds 1%, then medium risk adds 5% on top
        let result = calculate(&QuotationInput::default());
        assert_eq!(result.payment_terms_adjustment, 14.29);
        assert_eq!(result.adjusted_price, 1442.86);
        assert_eq!(result.risk_adjustment, 72.14);
        assert_eq!(result.final_recommended_price, 1515.0);
    }

    #[test]
    fn test_break_even_and_minimum() {
        let result = calculate(&QuotationInput::default());
        assert_eq!(result.break_even_price, 1000.0);
        assert_eq!(result.minimum_acceptable_price, 1100.0);
    }

    #[test]
    fn test_full_margin_is_rejected() {
        let input = QuotationInput {
            target_margin_percent: 100.0,
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_volume_pricing() {
        let input = QuotationInput {
            volume_discounts: vec![
                VolumeDiscount {
                    quantity: 10,
                    discount_percent: 5.0,
                },
                VolumeDiscount {
                    quantity: 100,
                    discount_percent: 15.0,
                },
            ],
            ..Default::default()
        };
        let result = calculate(&input);
        let tiers = result.volume_pricing.expect("tiers expected");
        assert_eq!(tiers.len(), 2);
        assert!(tiers[1].price_per_unit < tiers[0].price_per_unit);
        assert!(tiers[1].margin_percent < tiers[0].margin_percent);
        assert_eq!(
            tiers[0].total_revenue,
            round2(tiers[0].price_per_unit * 10.0)
        );
    }

    #[test]
    fn test_competitor_positions() {
        let higher = calculate(&QuotationInput {
            competitor_price: Some(1000.0),
            ..Default::default()
        });
        assert_eq!(
            higher.competitor_comparison.unwrap().position,
            PricePosition::Higher
        );

        let similar = calculate(&QuotationInput {
            competitor_price: Some(1500.0),
            ..Default::default()
        });
        assert_eq!(
            similar.competitor_comparison.unwrap().position,
            PricePosition::Similar
        );

        let lower = calculate(&QuotationInput {
            competitor_price: Some(2000.0),
            ..Default::default()
        });
        assert_eq!(
            lower.competitor_comparison.unwrap().position,
            PricePosition::Lower
        );
    }

    #[test]
    fn test_healthy_margin_recommendation() {
        let result = calculate(&QuotationInput::default());
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("healthy range")));
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("verify actual costs")));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn price_always_covers_cost(
                cost in 1.0f64..1000000.0,
                margin in 0.0f64..99.0,
            ) {
                let input = QuotationInput {
                    base_cost: cost,
                    target_margin_percent: margin,
                    ..Default::default()
                };
                let result = calculate(&input);
                prop_assert!(result.suggested_price >= cost);
                prop_assert!(result.final_recommended_price >= result.suggested_price);
            }

            #[test]
            fn higher_margin_means_higher_price(
                m1 in 0.0f64..98.0,
                delta in 0.1f64..1.0,
            ) {
                let low = calculate(&QuotationInput { target_margin_percent: m1, ..Default::default() });
                let high = calculate(&QuotationInput { target_margin_percent: m1 + delta, ..Default::default() });
                prop_assert!(high.suggested_price > low.suggested_price);
            }

            #[test]
            fn markup_exceeds_margin(margin in 1.0f64..99.0) {
                let result = calculate(&QuotationInput {
                    target_margin_percent: margin,
                    ..Default::default()
                });
                prop_assert!(result.markup_percent >= result.margin_percent);
            }
        }
    }
}
