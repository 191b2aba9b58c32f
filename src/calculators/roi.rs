//! Equipment investment ROI calculator
//!
//! Projects monthly and yearly cash flows with compounding revenue growth,
//! then derives payback period, NPV at the given discount rate, and IRR via
//! Newton-Raphson on the monthly cash flow series.

use serde::{Deserialize, Serialize};

use super::{require_range, round2, CalcError};

/// ROI calculator input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiInput {
    /// Equipment purchase cost in $
    pub equipment_cost: f64,
    #[serde(default = "defaults::installation_cost")]
    pub installation_cost: f64,
    /// Parts produced per month
    pub monthly_production: u32,
    pub price_per_unit: f64,
    pub monthly_operating_cost: f64,
    /// Annual revenue growth, percent
    #[serde(default = "defaults::annual_growth_rate")]
    pub annual_growth_rate: f64,
    /// Annual financing rate on the loaned amount, percent
    #[serde(default = "defaults::financing_rate")]
    pub financing_rate: f64,
    /// Down payment as percent of total investment
    #[serde(default = "defaults::down_payment")]
    pub down_payment: f64,
    #[serde(default = "defaults::loan_term_years")]
    pub loan_term_years: u32,
    #[serde(default = "defaults::analysis_years")]
    pub analysis_years: u32,
    /// Annual discount rate for NPV, percent
    #[serde(default = "defaults::discount_rate")]
    pub discount_rate: f64,
}

mod defaults {
    pub fn installation_cost() -> f64 {
        0.0
    }
    pub fn annual_growth_rate() -> f64 {
        5.0
    }
    pub fn financing_rate() -> f64 {
        0.0
    }
    pub fn down_payment() -> f64 {
        20.0
    }
    pub fn loan_term_years() -> u32 {
        5
    }
    pub fn analysis_years() -> u32 {
        5
    }
    pub fn discount_rate() -> f64 {
        10.0
    }
}

impl Default for RoiInput {
    fn default() -> Self {
        Self {
            equipment_cost: 150000.0,
            installation_cost: defaults::installation_cost(),
            monthly_production: 500,
            price_per_unit: 50.0,
            monthly_operating_cost: 8000.0,
            annual_growth_rate: defaults::annual_growth_rate(),
            financing_rate: defaults::financing_rate(),
            down_payment: defaults::down_payment(),
            loan_term_years: defaults::loan_term_years(),
            analysis_years: defaults::analysis_years(),
            discount_rate: defaults::discount_rate(),
        }
    }
}

impl RoiInput {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_range("equipmentCost", self.equipment_cost, 1000.0, 10000000.0)?;
        require_range("installationCost", self.installation_cost, 0.0, 1000000.0)?;
        require_range(
            "monthlyProduction",
            self.monthly_production as f64,
            1.0,
            1000000.0,
        )?;
        require_range("pricePerUnit", self.price_per_unit, 0.01, 100000.0)?;
        require_range(
            "monthlyOperatingCost",
            self.monthly_operating_cost,
            0.0,
            10000000.0,
        )?;
        require_range("annualGrowthRate", self.annual_growth_rate, -50.0, 100.0)?;
        require_range("financingRate", self.financing_rate, 0.0, 30.0)?;
        require_range("downPayment", self.down_payment, 0.0, 100.0)?;
        require_range("loanTermYears", self.loan_term_years as f64, 1.0, 20.0)?;
        require_range("analysisYears", self.analysis_years as f64, 1.0, 20.0)?;
        require_range("discountRate", self.discount_rate, 0.0, 50.0)?;
        Ok(())
    }
}

/// One year of the projection table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProjection {
    pub year: u32,
    pub revenue: f64,
    pub costs: f64,
    pub profit: f64,
    pub cumulative_profit: f64,
    /// Cumulative profit over total investment, percent
    pub roi: f64,
}

/// One month of the projection series
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProjection {
    pub month: u32,
    pub revenue: f64,
    pub costs: f64,
    pub profit: f64,
    pub cumulative_cash_flow: f64,
}

/// ROI calculation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResult {
    pub total_investment: f64,
    pub financed_amount: f64,
    pub down_payment_amount: f64,

    pub monthly_revenue: f64,
    pub monthly_profit: f64,

    /// First month where cumulative cash flow turns non-negative; 0 when the
    /// investment never pays back inside the analysis window
    pub payback_period_months: u32,
    pub payback_period_years: f64,
    pub break_even_month: u32,

    pub simple_roi: f64,
    pub annual_roi: f64,
    pub total_roi: f64,

    pub npv: f64,
    /// Annualized internal rate of return, percent
    pub irr: f64,

    pub yearly_projections: Vec<YearlyProjection>,
    pub monthly_projections: Vec<MonthlyProjection>,
}

/// Calculate ROI, NPV, IRR, and payback period
pub fn calculate(input: &RoiInput) -> RoiResult {
    let total_investment = input.equipment_cost + input.installation_cost;
    let down_payment_amount = total_investment * (input.down_payment / 100.0);
    let financed_amount = total_investment - down_payment_amount;

    let monthly_revenue = input.monthly_production as f64 * input.price_per_unit;
    let monthly_financing_cost = if input.financing_rate > 0.0 {
        financed_amount * (input.financing_rate / 100.0) / 12.0
    } else {
        0.0
    };
    let monthly_total_cost = input.monthly_operating_cost + monthly_financing_cost;
    let monthly_profit = monthly_revenue - monthly_total_cost;

    let months = input.analysis_years * 12;
    let monthly_growth_rate = (1.0 + input.annual_growth_rate / 100.0).powf(1.0 / 12.0) - 1.0;

    let mut cumulative_cash_flow = -down_payment_amount;
    let mut payback_month = 0;
    let mut raw_profits = Vec::with_capacity(months as usize);
    let mut monthly_projections = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let growth_factor = (1.0 + monthly_growth_rate).powi(month as i32 - 1);
        let adjusted_revenue = monthly_revenue * growth_factor;
        let adjusted_profit = adjusted_revenue - monthly_total_cost;

        cumulative_cash_flow += adjusted_profit;
        raw_profits.push(adjusted_profit);

        monthly_projections.push(MonthlyProjection {
            month,
            revenue: round2(adjusted_revenue),
            costs: round2(monthly_total_cost),
            profit: round2(adjusted_profit),
            cumulative_cash_flow: round2(cumulative_cash_flow),
        });

        if payback_month == 0 && cumulative_cash_flow >= 0.0 {
            payback_month = month;
        }
    }

    let mut yearly_projections = Vec::with_capacity(input.analysis_years as usize);
    let mut cumulative_profit = -down_payment_amount;
    let mut total_profit = 0.0;

    for year in 1..=input.analysis_years {
        let growth_factor = (1.0 + input.annual_growth_rate / 100.0).powi(year as i32 - 1);
        let year_revenue = monthly_revenue * 12.0 * growth_factor;
        let year_costs = monthly_total_cost * 12.0;
        let year_profit = year_revenue - year_costs;

        cumulative_profit += year_profit;
        total_profit += year_profit;

        yearly_projections.push(YearlyProjection {
            year,
            revenue: round2(year_revenue),
            costs: round2(year_costs),
            profit: round2(year_profit),
            cumulative_profit: round2(cumulative_profit),
            roi: round2(cumulative_profit / total_investment * 100.0),
        });
    }

    let total_roi = total_profit / total_investment * 100.0;
    let annual_roi = total_roi / input.analysis_years as f64;
    let simple_roi = monthly_profit * 12.0 / total_investment * 100.0;

    let discount_rate = input.discount_rate / 100.0;
    let mut npv = -down_payment_amount;
    for (month, profit) in raw_profits.iter().enumerate() {
        let discount_factor = (1.0 + discount_rate / 12.0).powi(month as i32 + 1);
        npv += profit / discount_factor;
    }

    let irr = internal_rate_of_return(down_payment_amount, &raw_profits);

    RoiResult {
        total_investment: round2(total_investment),
        financed_amount: round2(financed_amount),
        down_payment_amount: round2(down_payment_amount),
        monthly_revenue: round2(monthly_revenue),
        monthly_profit: round2(monthly_profit),
        payback_period_months: payback_month,
        payback_period_years: round2(payback_month as f64 / 12.0),
        break_even_month: payback_month,
        simple_roi: round2(simple_roi),
        annual_roi: round2(annual_roi),
        total_roi: round2(total_roi),
        npv: round2(npv),
        irr: round2(irr),
        yearly_projections,
        monthly_projections,
    }
}

/// Newton-Raphson IRR on a monthly cash flow series, returned as an
/// annualized percentage. Returns 0 when the iteration diverges.
fn internal_rate_of_return(initial_investment: f64, cash_flows: &[f64]) -> f64 {
    let mut irr: f64 = 0.1;
    let max_iterations = 100;
    let tolerance = 0.0001;

    for _ in 0..max_iterations {
        let mut npv = -initial_investment;
        let mut derivative = 0.0;

        for (month, profit) in cash_flows.iter().enumerate() {
            let period = (month + 1) as f64;
            let discount_factor = (1.0 + irr / 12.0).powf(period);
            npv += profit / discount_factor;
            derivative -= period * profit / (12.0 * (1.0 + irr / 12.0).powf(period + 1.0));
        }

        let next = irr - npv / derivative;
        if (next - irr).abs() < tolerance {
            return next * 100.0;
        }
        irr = next;

        if irr.is_nan() || irr.is_infinite() {
            return 0.0;
        }
    }

    irr * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_validates() {
        assert!(RoiInput::default().validate().is_ok());
    }

    #[test]
    fn test_installation_cost_default_matches_wire_default() {
        let input: RoiInput = serde_json::from_value(serde_json::json!({
            "equipmentCost": 150000.0,
            "monthlyProduction": 500,
            "pricePerUnit": 50.0,
            "monthlyOperatingCost": 8000.0,
        }))
        .unwrap();
        assert_eq!(input.installation_cost, 0.0);
        assert_eq!(
            RoiInput::default().installation_cost,
            input.installation_cost
        );
    }

    #[test]
    fn test_investment_split() {
        // $150,000 total, 20% down
        let result = calculate(&RoiInput::default());
        assert_eq!(result.total_investment, 150000.0);
        assert_eq!(result.down_payment_amount, 30000.0);
        assert_eq!(result.financed_amount, 120000.0);
    }

    #[test]
    fn test_monthly_cash_flow() {
        // 500 parts * $50 = $25,000 revenue, $8,000 costs at 0% financing
        let result = calculate(&RoiInput::default());
        assert_eq!(result.monthly_revenue, 25000.0);
        assert_eq!(result.monthly_profit, 17000.0);
    }

    #[test]
    fn test_payback_month() {
        // $30,000 down payment recovered after two months of ~$17k profit
        let result = calculate(&RoiInput::default());
        assert_eq!(result.payback_period_months, 2);
        assert_eq!(result.break_even_month, 2);
        assert_eq!(result.payback_period_years, 0.17);
    }

    #[test]
    fn test_projection_lengths() {
        let result = calculate(&RoiInput::default());
        assert_eq!(result.monthly_projections.len(), 60);
        assert_eq!(result.yearly_projections.len(), 5);
        assert_eq!(result.monthly_projections[0].month, 1);
        assert_eq!(result.yearly_projections[4].year, 5);
    }

    #[test]
    fn test_simple_roi() {
        // 17000 * 12 / 150000 = 136%
        let result = calculate(&RoiInput::default());
        assert_eq!(result.simple_roi, 136.0);
    }

    #[test]
    fn test_cumulative_cash_flow_starts_negative() {
        let result = calculate(&RoiInput::default());
        let first = &result.monthly_projections[0];
        assert_eq!(
            first.cumulative_cash_flow,
            round2(-30000.0 + first.profit)
        );
    }

    #[test]
    fn test_never_profitable_never_pays_back() {
        let input = RoiInput {
            monthly_production: 1,
            price_per_unit: 1.0,
            monthly_operating_cost: 10000.0,
            annual_growth_rate: 0.0,
            ..Default::default()
        };
        let result = calculate(&input);
        assert_eq!(result.payback_period_months, 0);
        assert!(result.npv < 0.0);
        assert!(result.monthly_profit < 0.0);
    }

    #[test]
    fn test_financing_reduces_profit() {
        let unfinanced = calculate(&RoiInput::default());
        let financed = calculate(&RoiInput {
            financing_rate: 8.0,
            ..Default::default()
        });
        assert!(financed.monthly_profit < unfinanced.monthly_profit);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn higher_prices_never_hurt_npv(
                p1 in 0.01f64..50000.0,
                delta in 0.01f64..50000.0,
            ) {
                let low = calculate(&RoiInput { price_per_unit: p1, ..Default::default() });
                let high = calculate(&RoiInput { price_per_unit: p1 + delta, ..Default::default() });
                prop_assert!(high.npv >= low.npv);
                prop_assert!(high.monthly_profit >= low.monthly_profit);
            }

            #[test]
            fn npv_decreases_with_discount_rate(
                r1 in 0.0f64..25.0,
                delta in 1.0f64..25.0,
            ) {
                let low = calculate(&RoiInput { discount_rate: r1, ..Default::default() });
                let high = calculate(&RoiInput { discount_rate: r1 + delta, ..Default::default() });
                prop_assert!(high.npv <= low.npv);
            }

            #[test]
            fn projections_match_analysis_window(years in 1u32..20) {
                let result = calculate(&RoiInput { analysis_years: years, ..Default::default() });
                prop_assert_eq!(result.monthly_projections.len(), (years * 12) as usize);
                prop_assert_eq!(result.yearly_projections.len(), years as usize);
            }
        }
    }
}
