//! Database copies of worksheet inputs and outputs.
//!
//! Decimals are written as exact strings rather than JSON numbers, so a
//! saved run reads back bit-for-bit: repeating quotients keep all 28 digits
//! and saturated values such as `Decimal::MAX` stay in range.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lane_roi_core::roi::{MonthlyBalance, RoiAssumptions, RoiResult};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StoredAssumptions {
    #[serde(with = "rust_decimal::serde::str")]
    monthly_revenue_increase: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    monthly_cost_change: Decimal,
    months: i64,
    #[serde(with = "rust_decimal::serde::str")]
    initial_investment: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBalance {
    month: u32,
    #[serde(with = "rust_decimal::serde::str")]
    net_monthly: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    cumulative_net: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StoredResult {
    #[serde(with = "rust_decimal::serde::str")]
    total_gain: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    net: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    roi_pct: Option<Decimal>,
    payback_month: Option<u32>,
    monthly_balances: Vec<StoredBalance>,
}

/// Timeline payload: the same `{inputs, outputs}` pair as the JSON artifact.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct StoredRun {
    pub inputs: StoredAssumptions,
    pub outputs: StoredResult,
}

impl From<&RoiAssumptions> for StoredAssumptions {
    fn from(a: &RoiAssumptions) -> Self {
        Self {
            monthly_revenue_increase: a.monthly_revenue_increase,
            monthly_cost_change: a.monthly_cost_change,
            months: a.months,
            initial_investment: a.initial_investment,
        }
    }
}

impl From<StoredAssumptions> for RoiAssumptions {
    fn from(s: StoredAssumptions) -> Self {
        Self {
            monthly_revenue_increase: s.monthly_revenue_increase,
            monthly_cost_change: s.monthly_cost_change,
            months: s.months,
            initial_investment: s.initial_investment,
        }
    }
}

impl From<&RoiResult> for StoredResult {
    fn from(r: &RoiResult) -> Self {
        Self {
            total_gain: r.total_gain,
            net: r.net,
            roi_pct: r.roi_pct,
            payback_month: r.payback_month,
            monthly_balances: r
                .monthly_balances
                .iter()
                .map(|b| StoredBalance {
                    month: b.month,
                    net_monthly: b.net_monthly,
                    cumulative_net: b.cumulative_net,
                })
                .collect(),
        }
    }
}

impl From<StoredResult> for RoiResult {
    fn from(s: StoredResult) -> Self {
        Self {
            total_gain: s.total_gain,
            net: s.net,
            roi_pct: s.roi_pct,
            payback_month: s.payback_month,
            monthly_balances: s
                .monthly_balances
                .into_iter()
                .map(|b| MonthlyBalance {
                    month: b.month,
                    net_monthly: b.net_monthly,
                    cumulative_net: b.cumulative_net,
                })
                .collect(),
        }
    }
}

impl StoredRun {
    pub fn new(inputs: &RoiAssumptions, outputs: &RoiResult) -> Self {
        Self {
            inputs: inputs.into(),
            outputs: outputs.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimals_are_written_as_strings() {
        let inputs = RoiAssumptions {
            monthly_revenue_increase: dec!(0.1),
            monthly_cost_change: dec!(0),
            months: 1,
            initial_investment: dec!(3),
        };
        let text = serde_json::to_string(&StoredAssumptions::from(&inputs)).unwrap();
        assert_eq!(
            text,
            r#"{"monthlyRevenueIncrease":"0.1","monthlyCostChange":"0","months":1,"initialInvestment":"3"}"#
        );
    }
}
