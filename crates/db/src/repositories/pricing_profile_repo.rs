//! Repository for the `pricing_profiles` table.

use ratecraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::pricing_profile::{PricingProfile, PricingProfileData};

/// Column list for `pricing_profiles` queries.
const COLUMNS: &str = "id, user_id, rent, equipment, insurance, utilities, taxes, \
     materials, outsourcing, marketing, desired_monthly_income, \
     billable_hours_per_month, profit_margin, experience_years, \
     seniority_level, base_hourly_rate, created_at, updated_at";

/// Provides CRUD operations for pricing profiles.
pub struct PricingProfileRepo;

impl PricingProfileRepo {
    /// Insert a new profile for a user. Fails on the unique `user_id`
    /// constraint if one already exists.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        data: &PricingProfileData,
    ) -> Result<PricingProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO pricing_profiles \
             (user_id, rent, equipment, insurance, utilities, taxes, \
              materials, outsourcing, marketing, desired_monthly_income, \
              billable_hours_per_month, profit_margin, experience_years, \
              seniority_level, base_hourly_rate) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricingProfile>(&query)
            .bind(user_id)
            .bind(data.costs.fixed.rent)
            .bind(data.costs.fixed.equipment)
            .bind(data.costs.fixed.insurance)
            .bind(data.costs.fixed.utilities)
            .bind(data.costs.fixed.taxes)
            .bind(data.costs.variable.materials)
            .bind(data.costs.variable.outsourcing)
            .bind(data.costs.variable.marketing)
            .bind(data.desired_monthly_income)
            .bind(data.billable_hours_per_month)
            .bind(data.profit_margin)
            .bind(data.experience_years)
            .bind(&data.seniority_level)
            .bind(data.base_hourly_rate)
            .fetch_one(pool)
            .await
    }

    /// Find the profile owned by a user.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<PricingProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pricing_profiles WHERE user_id = $1");
        sqlx::query_as::<_, PricingProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace every mutable field of a user's profile.
    ///
    /// Partial updates are merged against the existing row by the caller
    /// before this write.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        data: &PricingProfileData,
    ) -> Result<Option<PricingProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE pricing_profiles SET \
             rent = $2, equipment = $3, insurance = $4, utilities = $5, taxes = $6, \
             materials = $7, outsourcing = $8, marketing = $9, \
             desired_monthly_income = $10, billable_hours_per_month = $11, \
             profit_margin = $12, experience_years = $13, seniority_level = $14, \
             base_hourly_rate = $15, updated_at = now() \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricingProfile>(&query)
            .bind(user_id)
            .bind(data.costs.fixed.rent)
            .bind(data.costs.fixed.equipment)
            .bind(data.costs.fixed.insurance)
            .bind(data.costs.fixed.utilities)
            .bind(data.costs.fixed.taxes)
            .bind(data.costs.variable.materials)
            .bind(data.costs.variable.outsourcing)
            .bind(data.costs.variable.marketing)
            .bind(data.desired_monthly_income)
            .bind(data.billable_hours_per_month)
            .bind(data.profit_margin)
            .bind(data.experience_years)
            .bind(&data.seniority_level)
            .bind(data.base_hourly_rate)
            .fetch_optional(pool)
            .await
    }

    /// Update only the computed base rate on a user's profile.
    pub async fn update_base_rate(
        pool: &PgPool,
        user_id: DbId,
        base_hourly_rate: f64,
    ) -> Result<Option<PricingProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE pricing_profiles \
             SET base_hourly_rate = $2, updated_at = now() \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricingProfile>(&query)
            .bind(user_id)
            .bind(base_hourly_rate)
            .fetch_optional(pool)
            .await
    }

    /// Delete a user's profile. Returns the number of rows removed.
    pub async fn delete(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pricing_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
