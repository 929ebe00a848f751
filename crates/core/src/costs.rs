//! Fixed and variable monthly cost value objects.
//!
//! Cost components are validated at construction: every monetary field must
//! be a finite, non-negative amount. `total()` is always the exact sum of
//! the components, unrounded.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults for profiles created without explicit cost data
// ---------------------------------------------------------------------------

/// Default monthly rent when a profile is created from an accepted rate.
pub const DEFAULT_RENT: f64 = 500.0;
/// Default monthly equipment cost.
pub const DEFAULT_EQUIPMENT: f64 = 100.0;
/// Default monthly insurance cost.
pub const DEFAULT_INSURANCE: f64 = 80.0;
/// Default monthly utilities cost.
pub const DEFAULT_UTILITIES: f64 = 60.0;
/// Default monthly business tax reserve.
pub const DEFAULT_TAXES: f64 = 150.0;
/// Default monthly materials cost.
pub const DEFAULT_MATERIALS: f64 = 50.0;

// ---------------------------------------------------------------------------
// Validation helper
// ---------------------------------------------------------------------------

/// Validate a single monetary component: finite and non-negative.
fn validate_component(name: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "Cost component '{name}' must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(CoreError::Validation(format!(
            "Cost component '{name}' must not be negative (got {value})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Fixed costs
// ---------------------------------------------------------------------------

/// Monthly fixed business costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedCosts {
    pub rent: f64,
    pub equipment: f64,
    pub insurance: f64,
    pub utilities: f64,
    pub taxes: f64,
}

impl FixedCosts {
    /// Build a validated fixed-cost block. Rejects negative components.
    pub fn new(
        rent: f64,
        equipment: f64,
        insurance: f64,
        utilities: f64,
        taxes: f64,
    ) -> Result<Self, CoreError> {
        let costs = Self {
            rent,
            equipment,
            insurance,
            utilities,
            taxes,
        };
        costs.validate()?;
        Ok(costs)
    }

    /// Validate all components, e.g. after deserializing from storage.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_component("rent", self.rent)?;
        validate_component("equipment", self.equipment)?;
        validate_component("insurance", self.insurance)?;
        validate_component("utilities", self.utilities)?;
        validate_component("taxes", self.taxes)?;
        Ok(())
    }

    /// Exact sum of all fixed components.
    pub fn total(&self) -> f64 {
        self.rent + self.equipment + self.insurance + self.utilities + self.taxes
    }

    /// Conservative defaults used when a profile is created from an
    /// accepted rate without explicit cost data.
    pub fn sensible_defaults() -> Self {
        Self {
            rent: DEFAULT_RENT,
            equipment: DEFAULT_EQUIPMENT,
            insurance: DEFAULT_INSURANCE,
            utilities: DEFAULT_UTILITIES,
            taxes: DEFAULT_TAXES,
        }
    }
}

// ---------------------------------------------------------------------------
// Variable costs
// ---------------------------------------------------------------------------

/// Monthly variable business costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableCosts {
    pub materials: f64,
    pub outsourcing: f64,
    pub marketing: f64,
}

impl VariableCosts {
    /// Build a validated variable-cost block. Rejects negative components.
    pub fn new(materials: f64, outsourcing: f64, marketing: f64) -> Result<Self, CoreError> {
        let costs = Self {
            materials,
            outsourcing,
            marketing,
        };
        costs.validate()?;
        Ok(costs)
    }

    /// Validate all components, e.g. after deserializing from storage.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_component("materials", self.materials)?;
        validate_component("outsourcing", self.outsourcing)?;
        validate_component("marketing", self.marketing)?;
        Ok(())
    }

    /// Exact sum of all variable components.
    pub fn total(&self) -> f64 {
        self.materials + self.outsourcing + self.marketing
    }

    /// Conservative defaults used when a profile is created from an
    /// accepted rate without explicit cost data.
    pub fn sensible_defaults() -> Self {
        Self {
            materials: DEFAULT_MATERIALS,
            outsourcing: 0.0,
            marketing: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Combined cost profile
// ---------------------------------------------------------------------------

/// The full monthly cost picture for a freelancer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostProfile {
    pub fixed: FixedCosts,
    pub variable: VariableCosts,
}

impl CostProfile {
    pub fn new(fixed: FixedCosts, variable: VariableCosts) -> Self {
        Self { fixed, variable }
    }

    /// Validate both cost blocks.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.fixed.validate()?;
        self.variable.validate()
    }

    /// Exact sum of all fixed and variable components.
    pub fn total(&self) -> f64 {
        self.fixed.total() + self.variable.total()
    }

    /// Default cost profile for accept-rate flows with no cost data.
    pub fn sensible_defaults() -> Self {
        Self {
            fixed: FixedCosts::sensible_defaults(),
            variable: VariableCosts::sensible_defaults(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- construction --

    #[test]
    fn fixed_costs_accept_non_negative() {
        let costs = FixedCosts::new(200.0, 100.0, 50.0, 30.0, 20.0).unwrap();
        assert_eq!(costs.total(), 400.0);
    }

    #[test]
    fn fixed_costs_reject_each_negative_component() {
        assert_matches!(
            FixedCosts::new(-1.0, 0.0, 0.0, 0.0, 0.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            FixedCosts::new(0.0, -1.0, 0.0, 0.0, 0.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            FixedCosts::new(0.0, 0.0, -1.0, 0.0, 0.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            FixedCosts::new(0.0, 0.0, 0.0, -1.0, 0.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            FixedCosts::new(0.0, 0.0, 0.0, 0.0, -1.0),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn fixed_costs_reject_non_finite() {
        assert_matches!(
            FixedCosts::new(f64::NAN, 0.0, 0.0, 0.0, 0.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            FixedCosts::new(f64::INFINITY, 0.0, 0.0, 0.0, 0.0),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn variable_costs_reject_each_negative_component() {
        assert_matches!(
            VariableCosts::new(-1.0, 0.0, 0.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            VariableCosts::new(0.0, -1.0, 0.0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            VariableCosts::new(0.0, 0.0, -1.0),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn zero_costs_are_valid() {
        let costs = VariableCosts::new(0.0, 0.0, 0.0).unwrap();
        assert_eq!(costs.total(), 0.0);
    }

    // -- totals --

    #[test]
    fn totals_are_exact_component_sums() {
        let fixed = FixedCosts::new(200.0, 100.0, 50.0, 30.0, 20.0).unwrap();
        let variable = VariableCosts::new(50.0, 0.0, 30.0).unwrap();
        let profile = CostProfile::new(fixed, variable);

        assert_eq!(fixed.total(), 400.0);
        assert_eq!(variable.total(), 80.0);
        assert_eq!(profile.total(), 480.0);
    }

    // -- defaults --

    #[test]
    fn sensible_defaults_validate() {
        assert!(CostProfile::sensible_defaults().validate().is_ok());
        assert!(CostProfile::sensible_defaults().total() > 0.0);
    }
}
