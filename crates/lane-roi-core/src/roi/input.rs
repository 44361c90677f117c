use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use std::str::FromStr;

use crate::error::RoiError;
use crate::roi::engine::RoiAssumptions;
use crate::types::Money;
use crate::RoiCoreResult;

/// Longest horizon accepted at the boundary (100 years of monthly balances).
pub const MAX_HORIZON_MONTHS: i64 = 1200;

/// Build assumptions from an untyped JSON document.
///
/// Every field is required and must be a JSON number; strings, booleans and
/// nulls are rejected rather than read as zero. Field names are camelCase,
/// with snake_case accepted as an alias.
pub fn parse_assumptions(value: &Value) -> RoiCoreResult<RoiAssumptions> {
    let map = value.as_object().ok_or_else(|| RoiError::InvalidInput {
        field: "assumptions".into(),
        reason: "Expected a JSON object".into(),
    })?;

    let assumptions = RoiAssumptions {
        monthly_revenue_increase: money_field(map, "monthlyRevenueIncrease", "monthly_revenue_increase")?,
        monthly_cost_change: money_field(map, "monthlyCostChange", "monthly_cost_change")?,
        months: months_field(map)?,
        initial_investment: money_field(map, "initialInvestment", "initial_investment")?,
    };

    validate_assumptions(&assumptions)?;
    Ok(assumptions)
}

/// Parse assumptions from a JSON string.
pub fn parse_assumptions_str(json: &str) -> RoiCoreResult<RoiAssumptions> {
    let value: Value = serde_json::from_str(json)?;
    parse_assumptions(&value)
}

/// Checks applied to already-typed assumptions before they reach the engine.
///
/// Negative horizons pass: the engine clamps them to zero.
pub fn validate_assumptions(assumptions: &RoiAssumptions) -> RoiCoreResult<()> {
    if assumptions.months > MAX_HORIZON_MONTHS {
        return Err(RoiError::InvalidInput {
            field: "months".into(),
            reason: format!(
                "Horizon of {} months exceeds the maximum of {MAX_HORIZON_MONTHS}",
                assumptions.months
            ),
        });
    }
    Ok(())
}

fn lookup<'a>(map: &'a Map<String, Value>, name: &str, alias: &str) -> RoiCoreResult<&'a Value> {
    map.get(name)
        .or_else(|| map.get(alias))
        .ok_or_else(|| RoiError::MissingField(name.into()))
}

fn money_field(map: &Map<String, Value>, name: &str, alias: &str) -> RoiCoreResult<Money> {
    match lookup(map, name, alias)? {
        Value::Number(n) => number_to_decimal(n).ok_or_else(|| RoiError::InvalidInput {
            field: name.into(),
            reason: format!("{n} is outside the supported decimal range"),
        }),
        other => Err(not_a_number(name, other)),
    }
}

fn months_field(map: &Map<String, Value>) -> RoiCoreResult<i64> {
    let n = match lookup(map, "months", "months")? {
        Value::Number(n) => n,
        other => return Err(not_a_number("months", other)),
    };

    if let Some(i) = n.as_i64() {
        return Ok(i);
    }

    let invalid = |reason: &str| RoiError::InvalidInput {
        field: "months".into(),
        reason: reason.into(),
    };

    // `as` saturates: huge negatives clamp like any negative horizon, huge
    // positives fall to the horizon cap in `validate_assumptions`.
    match n.as_f64() {
        Some(f) if f.fract() != 0.0 => Err(invalid("Horizon must be a whole number of months")),
        Some(f) => Ok(f as i64),
        None => Err(invalid("Horizon is outside the supported range")),
    }
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    // serde_json prints the shortest round-trip form, so "0.1" stays 0.1.
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn not_a_number(field: &str, value: &Value) -> RoiError {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
        Value::Number(_) => "a number",
    };
    RoiError::InvalidInput {
        field: field.into(),
        reason: format!("Expected a number, got {kind}"),
    }
}
