//! Pricing profile entity model and DTOs.

use ratecraft_core::costs::{CostProfile, FixedCosts, VariableCosts};
use ratecraft_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pricing_profiles` table. One per user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PricingProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub rent: f64,
    pub equipment: f64,
    pub insurance: f64,
    pub utilities: f64,
    pub taxes: f64,
    pub materials: f64,
    pub outsourcing: f64,
    pub marketing: f64,
    pub desired_monthly_income: f64,
    pub billable_hours_per_month: f64,
    pub profit_margin: f64,
    pub experience_years: f64,
    pub seniority_level: String,
    pub base_hourly_rate: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PricingProfile {
    /// Reassemble the domain cost profile from the flattened columns.
    pub fn cost_profile(&self) -> CostProfile {
        CostProfile {
            fixed: FixedCosts {
                rent: self.rent,
                equipment: self.equipment,
                insurance: self.insurance,
                utilities: self.utilities,
                taxes: self.taxes,
            },
            variable: VariableCosts {
                materials: self.materials,
                outsourcing: self.outsourcing,
                marketing: self.marketing,
            },
        }
    }
}

/// Full field set for inserting or replacing a profile. Callers merge
/// partial updates against the existing row before writing.
#[derive(Debug, Clone)]
pub struct PricingProfileData {
    pub costs: CostProfile,
    pub desired_monthly_income: f64,
    pub billable_hours_per_month: f64,
    pub profit_margin: f64,
    pub experience_years: f64,
    pub seniority_level: String,
    pub base_hourly_rate: Option<f64>,
}
