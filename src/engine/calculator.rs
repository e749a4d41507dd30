//! GST and investment arithmetic on top of the regional prices.

use rust_decimal::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

use crate::config::CalculatorConfig;
use crate::engine::pricing::round_rupees;
use crate::error::CalcError;
use crate::types::{PriceSnapshot, Purity};

const INVALID_NUMBERS: &str = "Enter valid positive numbers";
const INVALID_BUDGET: &str = "Enter valid budget";

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Purchase cost split, each line rounded to whole rupees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GstBreakdown {
    pub base_price: i64,
    pub gst: i64,
    pub making_charges: i64,
    pub total_price: i64,
}

/// How much gold a budget buys at the current rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlan {
    /// Grams, rounded to two decimals.
    pub grams: Decimal,
    pub purity: Purity,
    pub price_per_gram: i64,
    pub budget: Decimal,
}

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

/// Read a form value that may arrive as a JSON number or a numeric string.
/// Missing, null, blank and non-numeric values yield `None`, as do
/// exponent forms outside `Decimal`'s range (e.g. "1e40").
pub fn parse_amount(value: Option<&Value>) -> Option<Decimal> {
    let text = match value? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn require_positive(value: Option<Decimal>, message: &'static str) -> Result<Decimal, CalcError> {
    match value {
        Some(v) if v > Decimal::ZERO => Ok(v),
        _ => Err(CalcError::InvalidInput { message }),
    }
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

/// Base price, GST and making charges for `grams` at `gold_price` per gram.
pub fn calculate_gst(
    gold_price: Option<Decimal>,
    grams: Option<Decimal>,
    rates: &CalculatorConfig,
) -> Result<GstBreakdown, CalcError> {
    let gold_price = require_positive(gold_price, INVALID_NUMBERS)?;
    let grams = require_positive(grams, INVALID_NUMBERS)?;

    let out_of_range = || CalcError::InvalidInput { message: INVALID_NUMBERS };

    let base = gold_price.checked_mul(grams).ok_or_else(out_of_range)?;
    let gst = base.checked_mul(rates.gst_rate).ok_or_else(out_of_range)?;
    let making = base.checked_mul(rates.making_charge_rate).ok_or_else(out_of_range)?;
    let total = base
        .checked_add(gst)
        .and_then(|t| t.checked_add(making))
        .ok_or_else(out_of_range)?;

    let rupees = |value: Decimal| round_rupees(value).ok_or_else(out_of_range);
    Ok(GstBreakdown {
        base_price: rupees(base)?,
        gst: rupees(gst)?,
        making_charges: rupees(making)?,
        total_price: rupees(total)?,
    })
}

/// Reject a missing or non-positive budget.
pub fn validate_budget(budget: Option<Decimal>) -> Result<Decimal, CalcError> {
    require_positive(budget, INVALID_BUDGET)
}

/// Grams of `purity` gold that `budget` buys at the snapshot's rate.
pub fn calculate_investment(
    budget: Option<Decimal>,
    purity: Purity,
    snapshot: &PriceSnapshot,
) -> Result<InvestmentPlan, CalcError> {
    let budget = validate_budget(budget)?;

    let price_per_gram = snapshot.price_for(purity);
    if price_per_gram <= 0 {
        return Err(CalcError::PricesNotLoaded);
    }

    let grams = budget
        .checked_div(Decimal::from(price_per_gram))
        .ok_or(CalcError::InvalidInput { message: INVALID_BUDGET })?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(InvestmentPlan {
        grams,
        purity,
        price_per_gram,
        budget,
    })
}
