//! The cost-recovery rate formula and its derived calculations.
//!
//! `base_rate = (fixed + variable + desired_income) × (1 + margin) / hours`.
//! All functions are pure; intermediates are computed at full precision and
//! rounded to 2 decimals only at the display edge.

use serde::Serialize;

use crate::client_context::ClientContext;
use crate::costs::{FixedCosts, VariableCosts};
use crate::error::CoreError;
use crate::seniority::SeniorityLevel;
use crate::types::round2;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Hard cap on billable hours per month (31 days × 24 h).
pub const MAX_BILLABLE_HOURS: f64 = 744.0;

/// Default contingency buffer applied to project prices.
pub const DEFAULT_PROJECT_BUFFER: f64 = 0.15;

/// Months per year, for annual revenue projection.
const MONTHS_PER_YEAR: f64 = 12.0;

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Validate a profit margin: must be a fraction in `[0, 1]`.
pub fn validate_margin(margin: f64) -> Result<(), CoreError> {
    if !margin.is_finite() || !(0.0..=1.0).contains(&margin) {
        return Err(CoreError::Validation(format!(
            "Profit margin must be between 0 and 1 (got {margin})"
        )));
    }
    Ok(())
}

/// Validate billable hours: must be positive and at most [`MAX_BILLABLE_HOURS`].
pub fn validate_billable_hours(hours: f64) -> Result<(), CoreError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Billable hours must be positive (got {hours})"
        )));
    }
    if hours > MAX_BILLABLE_HOURS {
        return Err(CoreError::Validation(format!(
            "Billable hours must not exceed {MAX_BILLABLE_HOURS} per month (got {hours})"
        )));
    }
    Ok(())
}

/// Validate a desired monthly income: must be strictly positive.
pub fn validate_desired_income(income: f64) -> Result<(), CoreError> {
    if !income.is_finite() || income <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Desired monthly income must be positive (got {income})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Base rate
// ---------------------------------------------------------------------------

/// Compute the cost-recovery base hourly rate, unrounded.
pub fn base_rate(
    fixed: &FixedCosts,
    variable: &VariableCosts,
    desired_income: f64,
    margin: f64,
    billable_hours: f64,
) -> Result<f64, CoreError> {
    validate_desired_income(desired_income)?;
    validate_margin(margin)?;
    validate_billable_hours(billable_hours)?;

    let total_costs = fixed.total() + variable.total() + desired_income;
    let profit = total_costs * margin;
    Ok((total_costs + profit) / billable_hours)
}

/// Per-field breakdown of a base-rate calculation.
///
/// Every field is rounded to 2 decimals independently, for display only.
/// The rounded fields are not guaranteed to re-sum exactly to the rounded
/// total; consumers comparing them must use a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateBreakdown {
    pub fixed_costs: f64,
    pub variable_costs: f64,
    pub desired_income: f64,
    pub total_costs: f64,
    pub profit_amount: f64,
    pub base_hourly_rate: f64,
}

/// Compute the base rate together with its display breakdown.
pub fn base_rate_breakdown(
    fixed: &FixedCosts,
    variable: &VariableCosts,
    desired_income: f64,
    margin: f64,
    billable_hours: f64,
) -> Result<RateBreakdown, CoreError> {
    validate_desired_income(desired_income)?;
    validate_margin(margin)?;
    validate_billable_hours(billable_hours)?;

    // Full-precision intermediates; each output field rounds independently.
    let fixed_total = fixed.total();
    let variable_total = variable.total();
    let total_costs = fixed_total + variable_total + desired_income;
    let profit = total_costs * margin;
    let rate = (total_costs + profit) / billable_hours;

    Ok(RateBreakdown {
        fixed_costs: round2(fixed_total),
        variable_costs: round2(variable_total),
        desired_income: round2(desired_income),
        total_costs: round2(total_costs),
        profit_amount: round2(profit),
        base_hourly_rate: round2(rate),
    })
}

// ---------------------------------------------------------------------------
// Multipliers
// ---------------------------------------------------------------------------

/// Apply seniority and optional client-context multipliers to a base rate.
///
/// The context multiplier is 1.0 when no context is given.
pub fn apply_multipliers(
    base_rate: f64,
    seniority: SeniorityLevel,
    context: Option<&ClientContext>,
) -> Result<f64, CoreError> {
    if !base_rate.is_finite() || base_rate <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Base rate must be positive (got {base_rate})"
        )));
    }
    let context_multiplier = context.map_or(1.0, ClientContext::multiplier);
    Ok(base_rate * seniority.multiplier() * context_multiplier)
}

// ---------------------------------------------------------------------------
// Sustainability
// ---------------------------------------------------------------------------

/// How a current rate compares to the computed sustainable rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sustainability {
    Unsustainable,
    Sustainable,
    Excellent,
}

/// Bucket the ratio `current / sustainable`:
/// `< 1.0` → unsustainable, `[1.0, 1.2)` → sustainable, `≥ 1.2` → excellent.
pub fn sustainability(
    current_rate: f64,
    sustainable_rate: f64,
) -> Result<Sustainability, CoreError> {
    if !sustainable_rate.is_finite() || sustainable_rate <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Sustainable rate must be positive (got {sustainable_rate})"
        )));
    }
    if !current_rate.is_finite() || current_rate < 0.0 {
        return Err(CoreError::Validation(format!(
            "Current rate must be non-negative (got {current_rate})"
        )));
    }

    let ratio = current_rate / sustainable_rate;
    Ok(if ratio < 1.0 {
        Sustainability::Unsustainable
    } else if ratio < 1.2 {
        Sustainability::Sustainable
    } else {
        Sustainability::Excellent
    })
}

// ---------------------------------------------------------------------------
// Derived prices and projections
// ---------------------------------------------------------------------------

/// Project price: `rate × hours × (1 + buffer)`, rounded to 2 decimals.
pub fn project_price(hourly_rate: f64, hours: f64, buffer: f64) -> Result<f64, CoreError> {
    if !hourly_rate.is_finite() || hourly_rate <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Hourly rate must be positive (got {hourly_rate})"
        )));
    }
    if !hours.is_finite() || hours <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Project hours must be positive (got {hours})"
        )));
    }
    if !buffer.is_finite() || buffer < 0.0 {
        return Err(CoreError::Validation(format!(
            "Project buffer must be non-negative (got {buffer})"
        )));
    }
    Ok(round2(hourly_rate * hours * (1.0 + buffer)))
}

/// Monthly revenue projection: `rate × hours`, rounded to 2 decimals.
pub fn monthly_revenue(hourly_rate: f64, billable_hours: f64) -> f64 {
    round2(hourly_rate * billable_hours)
}

/// Annual revenue projection: monthly × 12, rounded to 2 decimals.
pub fn annual_revenue(hourly_rate: f64, billable_hours: f64) -> f64 {
    round2(hourly_rate * billable_hours * MONTHS_PER_YEAR)
}

/// Convert an amount with a flat exchange rate, rounded to 2 decimals.
pub fn convert_currency(amount: f64, exchange_rate: f64) -> Result<f64, CoreError> {
    if !exchange_rate.is_finite() || exchange_rate <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Exchange rate must be positive (got {exchange_rate})"
        )));
    }
    Ok(round2(amount * exchange_rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fixture_fixed() -> FixedCosts {
        FixedCosts::new(200.0, 100.0, 50.0, 30.0, 20.0).unwrap()
    }

    fn fixture_variable() -> VariableCosts {
        VariableCosts::new(50.0, 0.0, 30.0).unwrap()
    }

    // -- base rate --

    #[test]
    fn base_rate_reference_case() {
        // costs 400 + 80 + income 1000 = 1480; profit 222; 1702 / 100 h.
        let rate = base_rate(&fixture_fixed(), &fixture_variable(), 1000.0, 0.15, 100.0).unwrap();
        assert!((rate - 17.02).abs() < 1e-9);
    }

    #[test]
    fn base_rate_rejects_bad_hours() {
        assert_matches!(
            base_rate(&fixture_fixed(), &fixture_variable(), 1000.0, 0.15, 0.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            base_rate(&fixture_fixed(), &fixture_variable(), 1000.0, 0.15, -10.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            base_rate(&fixture_fixed(), &fixture_variable(), 1000.0, 0.15, 745.0),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn base_rate_rejects_bad_margin() {
        assert_matches!(
            base_rate(&fixture_fixed(), &fixture_variable(), 1000.0, -0.1, 100.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            base_rate(&fixture_fixed(), &fixture_variable(), 1000.0, 1.01, 100.0),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn base_rate_rejects_non_positive_income() {
        assert_matches!(
            base_rate(&fixture_fixed(), &fixture_variable(), 0.0, 0.15, 100.0),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn base_rate_zero_margin_is_cost_recovery_only() {
        let rate = base_rate(&fixture_fixed(), &fixture_variable(), 1000.0, 0.0, 100.0).unwrap();
        assert!((rate - 14.8).abs() < 1e-9);
    }

    // -- breakdown --

    #[test]
    fn breakdown_fields_match_reference_case() {
        let b =
            base_rate_breakdown(&fixture_fixed(), &fixture_variable(), 1000.0, 0.15, 100.0)
                .unwrap();
        assert_eq!(b.fixed_costs, 400.0);
        assert_eq!(b.variable_costs, 80.0);
        assert_eq!(b.desired_income, 1000.0);
        assert_eq!(b.total_costs, 1480.0);
        assert_eq!(b.profit_amount, 222.0);
        assert_eq!(b.base_hourly_rate, 17.02);
    }

    #[test]
    fn breakdown_parts_resum_within_tolerance_only() {
        // Independent per-field rounding: parts may differ from the rounded
        // total by up to a cent-level epsilon, never by more.
        let fixed = FixedCosts::new(333.335, 0.0, 0.0, 0.0, 0.0).unwrap();
        let variable = VariableCosts::new(333.335, 0.0, 0.0).unwrap();
        let b = base_rate_breakdown(&fixed, &variable, 333.335, 0.0, 160.0).unwrap();

        let resummed = b.fixed_costs + b.variable_costs + b.desired_income;
        assert!((resummed - b.total_costs).abs() <= 0.02);
    }

    // -- multipliers --

    #[test]
    fn multipliers_compose_multiplicatively() {
        let ctx = ClientContext::from_strings("corporate", "global").unwrap();
        let rate = apply_multipliers(20.0, SeniorityLevel::Mid, Some(&ctx)).unwrap();
        assert!((rate - 31.2).abs() < 1e-9);
    }

    #[test]
    fn missing_context_multiplier_is_one() {
        let rate = apply_multipliers(20.0, SeniorityLevel::Senior, None).unwrap();
        assert!((rate - 26.0).abs() < 1e-9);
    }

    #[test]
    fn multipliers_reject_non_positive_base() {
        assert_matches!(
            apply_multipliers(0.0, SeniorityLevel::Mid, None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            apply_multipliers(-5.0, SeniorityLevel::Mid, None),
            Err(CoreError::Validation(_))
        );
    }

    // -- sustainability --

    #[test]
    fn sustainability_buckets() {
        assert_eq!(
            sustainability(15.0, 20.0).unwrap(),
            Sustainability::Unsustainable
        );
        assert_eq!(
            sustainability(20.0, 20.0).unwrap(),
            Sustainability::Sustainable
        );
        assert_eq!(
            sustainability(23.9, 20.0).unwrap(),
            Sustainability::Sustainable
        );
        assert_eq!(
            sustainability(24.0, 20.0).unwrap(),
            Sustainability::Excellent
        );
    }

    #[test]
    fn sustainability_rejects_non_positive_reference() {
        assert_matches!(sustainability(20.0, 0.0), Err(CoreError::Validation(_)));
    }

    // -- project price --

    #[test]
    fn project_price_with_default_buffer() {
        assert_eq!(
            project_price(25.0, 40.0, DEFAULT_PROJECT_BUFFER).unwrap(),
            1150.0
        );
    }

    #[test]
    fn project_price_without_buffer() {
        assert_eq!(project_price(25.0, 40.0, 0.0).unwrap(), 1000.0);
    }

    #[test]
    fn project_price_rejects_bad_inputs() {
        assert_matches!(project_price(0.0, 40.0, 0.15), Err(CoreError::Validation(_)));
        assert_matches!(project_price(25.0, 0.0, 0.15), Err(CoreError::Validation(_)));
        assert_matches!(
            project_price(25.0, 40.0, -0.1),
            Err(CoreError::Validation(_))
        );
    }

    // -- revenue & currency --

    #[test]
    fn revenue_projections() {
        assert_eq!(monthly_revenue(17.02, 100.0), 1702.0);
        assert_eq!(annual_revenue(17.02, 100.0), 20424.0);
    }

    #[test]
    fn currency_conversion_rounds() {
        assert_eq!(convert_currency(17.02, 1.1).unwrap(), 18.72);
        assert_matches!(convert_currency(10.0, 0.0), Err(CoreError::Validation(_)));
    }
}
