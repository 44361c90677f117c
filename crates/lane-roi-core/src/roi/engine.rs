use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::*;

const HUNDRED: Decimal = dec!(100);

/// Financial assumptions captured by the ROI worksheet.
///
/// Monthly figures are flat across the horizon. `months` is signed so that a
/// negative horizon can be represented; the engine treats it as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiAssumptions {
    /// Additional revenue per month (negative for a revenue decrease)
    #[serde(with = "rust_decimal::serde::float", alias = "monthly_revenue_increase")]
    pub monthly_revenue_increase: Money,
    /// Change in cost per month (positive for a cost increase)
    #[serde(with = "rust_decimal::serde::float", alias = "monthly_cost_change")]
    pub monthly_cost_change: Money,
    /// Projection horizon in months
    pub months: i64,
    /// Upfront outflow at t=0
    #[serde(with = "rust_decimal::serde::float", alias = "initial_investment")]
    pub initial_investment: Money,
}

impl Default for RoiAssumptions {
    /// Worksheet defaults: a one-year horizon with every amount at zero.
    fn default() -> Self {
        Self {
            monthly_revenue_increase: Decimal::ZERO,
            monthly_cost_change: Decimal::ZERO,
            months: 12,
            initial_investment: Decimal::ZERO,
        }
    }
}

impl RoiAssumptions {
    /// Net cash flow for every month of the horizon.
    pub fn net_monthly(&self) -> Money {
        self.monthly_revenue_increase
            .saturating_sub(self.monthly_cost_change)
    }

    /// Number of projected months, with negative horizons clamped to zero.
    ///
    /// Horizons beyond `u32::MAX` are capped there, so `monthly_balances`
    /// would no longer match `months`; callers taking untrusted input should
    /// run `validate_assumptions` first, which enforces `MAX_HORIZON_MONTHS`.
    pub fn horizon(&self) -> u32 {
        u32::try_from(self.months.max(0)).unwrap_or(u32::MAX)
    }
}

/// Cash position at the end of a single projected month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBalance {
    /// 1-indexed month number
    pub month: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_monthly: Money,
    /// Running net position after the initial investment
    #[serde(with = "rust_decimal::serde::float")]
    pub cumulative_net: Money,
}

/// Output of the ROI projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResult {
    /// Sum of monthly net over the horizon
    #[serde(with = "rust_decimal::serde::float")]
    pub total_gain: Money,
    /// Total gain less the initial investment
    #[serde(with = "rust_decimal::serde::float")]
    pub net: Money,
    /// Net as a percentage of the initial investment; `None` when nothing was invested
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub roi_pct: Option<Percent>,
    /// First month whose cumulative net is non-negative
    pub payback_month: Option<u32>,
    pub monthly_balances: Vec<MonthlyBalance>,
}

/// Project a flat monthly cash flow over the horizon and derive the ROI summary.
///
/// Total for every input: a negative horizon projects nothing, a zero
/// investment leaves `roi_pct` undefined, and arithmetic that would overflow
/// the decimal range saturates instead of panicking.
pub fn compute_roi(assumptions: &RoiAssumptions) -> RoiResult {
    let horizon = assumptions.horizon();
    let net_monthly = assumptions.net_monthly();
    let initial_investment = assumptions.initial_investment;

    let monthly_balances: Vec<MonthlyBalance> = (1..=horizon)
        .map(|month| MonthlyBalance {
            month,
            net_monthly,
            cumulative_net: cumulative_net(month, net_monthly, initial_investment),
        })
        .collect();

    let total_gain = net_monthly.saturating_mul(Decimal::from(horizon));
    let net = total_gain.saturating_sub(initial_investment);

    let payback_month = monthly_balances
        .iter()
        .find(|b| b.cumulative_net >= Decimal::ZERO)
        .map(|b| b.month);

    RoiResult {
        total_gain,
        net,
        roi_pct: roi_percent(net, initial_investment),
        payback_month,
        monthly_balances,
    }
}

/// Run the projection and wrap it in the standard output envelope.
///
/// The `result` field is exactly `compute_roi(assumptions)`; warnings flag the
/// degenerate cases a reader of the summary should know about.
pub fn run_roi(assumptions: &RoiAssumptions) -> ComputationOutput<RoiResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if assumptions.months < 0 {
        warnings.push(format!(
            "Negative horizon of {} months clamped to 0; no projection produced",
            assumptions.months
        ));
    }
    if assumptions.initial_investment.is_zero() {
        warnings.push("Initial investment is zero; ROI % is undefined".into());
    } else if assumptions.initial_investment.is_sign_negative() {
        warnings.push(
            "Negative initial investment is treated as an inflow at t=0; \
             ROI % keeps the raw sign of net / investment"
                .into(),
        );
    }

    let result = compute_roi(assumptions);

    if result.payback_month.is_none() && !result.monthly_balances.is_empty() {
        warnings.push(format!(
            "Cumulative net position stays negative for all {} months; no payback within horizon",
            result.monthly_balances.len()
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Flat monthly ROI projection: cumulative net, ROI %, payback month",
        assumptions,
        warnings,
        elapsed,
        result,
    )
}

/// Closed-form position at the end of `month`: `-investment + month * net_monthly`.
fn cumulative_net(month: u32, net_monthly: Money, initial_investment: Money) -> Money {
    (-initial_investment).saturating_add(net_monthly.saturating_mul(Decimal::from(month)))
}

fn roi_percent(net: Money, initial_investment: Money) -> Option<Percent> {
    if initial_investment.is_zero() {
        return None;
    }

    let pct = net
        .checked_div(initial_investment)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .unwrap_or_else(|| {
            // Quotient beyond the decimal range: pin to the bound with the quotient's sign.
            if net.is_sign_negative() != initial_investment.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        });

    Some(pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assumptions(revenue: Decimal, cost: Decimal, months: i64, investment: Decimal) -> RoiAssumptions {
        RoiAssumptions {
            monthly_revenue_increase: revenue,
            monthly_cost_change: cost,
            months,
            initial_investment: investment,
        }
    }

    #[test]
    fn test_typical_run_pays_back_in_month_three() {
        let result = compute_roi(&assumptions(dec!(1000), dec!(200), 12, dec!(2000)));
        assert_eq!(result.total_gain, dec!(9600));
        assert_eq!(result.net, dec!(7600));
        assert_eq!(result.roi_pct, Some(dec!(380)));
        assert_eq!(result.payback_month, Some(3));

        let cumulative: Vec<Decimal> = result
            .monthly_balances
            .iter()
            .take(3)
            .map(|b| b.cumulative_net)
            .collect();
        assert_eq!(cumulative, vec![dec!(-1200), dec!(-400), dec!(400)]);
    }

    #[test]
    fn test_all_zero_pays_back_immediately() {
        let result = compute_roi(&assumptions(dec!(0), dec!(0), 6, dec!(0)));
        assert_eq!(result.total_gain, dec!(0));
        assert_eq!(result.net, dec!(0));
        assert_eq!(result.roi_pct, None);
        assert_eq!(result.payback_month, Some(1));
    }

    #[test]
    fn test_negative_monthly_net_never_pays_back() {
        let result = compute_roi(&assumptions(dec!(100), dec!(500), 10, dec!(0)));
        assert_eq!(result.monthly_balances[0].net_monthly, dec!(-400));
        assert_eq!(result.monthly_balances[0].cumulative_net, dec!(-400));
        assert_eq!(result.payback_month, None);
        assert_eq!(result.roi_pct, None);
    }

    #[test]
    fn test_zero_monthly_net_with_investment() {
        let result = compute_roi(&assumptions(dec!(50), dec!(50), 5, dec!(1000)));
        assert_eq!(result.total_gain, dec!(0));
        assert_eq!(result.net, dec!(-1000));
        assert_eq!(result.roi_pct, Some(dec!(-100)));
        assert_eq!(result.payback_month, None);
    }

    #[test]
    fn test_zero_horizon() {
        let result = compute_roi(&assumptions(dec!(10), dec!(0), 0, dec!(500)));
        assert!(result.monthly_balances.is_empty());
        assert_eq!(result.total_gain, dec!(0));
        assert_eq!(result.net, dec!(-500));
        assert_eq!(result.roi_pct, Some(dec!(-100)));
        assert_eq!(result.payback_month, None);
    }

    #[test]
    fn test_negative_horizon_clamped() {
        let clamped = compute_roi(&assumptions(dec!(10), dec!(0), -4, dec!(500)));
        let zero = compute_roi(&assumptions(dec!(10), dec!(0), 0, dec!(500)));
        assert_eq!(clamped, zero);
    }

    #[test]
    fn test_horizon_beyond_u32_caught_by_validation() {
        let a = assumptions(dec!(1), dec!(0), i64::from(u32::MAX) + 1, dec!(0));
        assert_eq!(a.horizon(), u32::MAX);
        assert!(crate::roi::validate_assumptions(&a).is_err());
    }

    #[test]
    fn test_negative_investment_sign_preserved() {
        // Net 1300 over an "investment" of -100 gives -1300%.
        let result = compute_roi(&assumptions(dec!(100), dec!(0), 12, dec!(-100)));
        assert_eq!(result.net, dec!(1300));
        assert_eq!(result.roi_pct, Some(dec!(-1300)));
        assert_eq!(result.payback_month, Some(1));
    }

    #[test]
    fn test_exact_zero_counts_as_payback() {
        let result = compute_roi(&assumptions(dec!(250), dec!(0), 8, dec!(1000)));
        assert_eq!(result.monthly_balances[3].cumulative_net, dec!(0));
        assert_eq!(result.payback_month, Some(4));
    }

    #[test]
    fn test_fractional_amounts_are_exact() {
        // 0.1 summed 30 times drifts in binary floating point; closed form does not.
        let result = compute_roi(&assumptions(dec!(0.3), dec!(0.2), 30, dec!(3)));
        assert_eq!(result.monthly_balances[29].cumulative_net, dec!(0));
        assert_eq!(result.payback_month, Some(30));
        assert_eq!(result.total_gain, dec!(3));
    }

    #[test]
    fn test_overflow_saturates() {
        let result = compute_roi(&assumptions(Decimal::MAX, Decimal::MIN, 3, dec!(0.0000001)));
        assert_eq!(result.monthly_balances[0].net_monthly, Decimal::MAX);
        assert_eq!(result.total_gain, Decimal::MAX);
        assert_eq!(result.roi_pct, Some(Decimal::MAX));
    }

    #[test]
    fn test_run_roi_warnings() {
        let output = run_roi(&assumptions(dec!(100), dec!(500), -2, dec!(0)));
        assert_eq!(output.result.monthly_balances.len(), 0);
        assert!(output.warnings.iter().any(|w| w.contains("clamped")));
        assert!(output.warnings.iter().any(|w| w.contains("undefined")));

        let output = run_roi(&assumptions(dec!(0), dec!(10), 6, dec!(100)));
        assert!(output.warnings.iter().any(|w| w.contains("no payback")));
    }

    #[test]
    fn test_run_roi_echoes_assumptions() {
        let input = assumptions(dec!(1000), dec!(200), 12, dec!(2000));
        let output = run_roi(&input);
        assert_eq!(output.assumptions["months"], 12);
        assert_eq!(output.assumptions["initialInvestment"], 2000.0);
        assert!(output.warnings.is_empty());
        assert_eq!(output.result, compute_roi(&input));
    }

    #[test]
    fn test_result_serializes_as_plain_numbers() {
        let result = compute_roi(&assumptions(dec!(1000), dec!(200), 2, dec!(0)));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["totalGain"], 1600.0);
        assert!(value["roiPct"].is_null());
        assert_eq!(value["paybackMonth"], 1);
        assert_eq!(value["monthlyBalances"][1]["cumulativeNet"], 1600.0);
    }
}
