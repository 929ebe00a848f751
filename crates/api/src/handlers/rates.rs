//! Handlers for base-rate and project-rate calculations.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ratecraft_core::client_context::ClientContext;
use ratecraft_core::costs::{CostProfile, FixedCosts, VariableCosts};
use ratecraft_core::error::CoreError;
use ratecraft_core::onboarding::OnboardingStatus;
use ratecraft_core::rate_formula::{
    self, RateBreakdown, Sustainability, DEFAULT_PROJECT_BUFFER,
};
use ratecraft_core::seniority::SeniorityLevel;
use ratecraft_core::types::DbId;
use ratecraft_db::models::pricing_profile::{PricingProfile, PricingProfileData};
use ratecraft_db::repositories::{
    OnboardingSessionRepo, PricingProfileRepo, ProfileCategoryRepo, SwapOutcome,
};

use crate::error::{AppError, AppResult};
use crate::handlers::resolve_category_ids;
use crate::middleware::auth::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Body for the base-rate calculation. With a session ID, inputs come from
/// that session's collected answers; without one, the stored profile is
/// recalculated.
#[derive(Debug, Deserialize)]
pub struct BaseRateRequest {
    pub session_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct BaseRateResponse {
    pub base_hourly_rate: f64,
    pub breakdown: RateBreakdown,
    pub created_profile: bool,
    pub pricing_profile: PricingProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_assignment: Option<SwapOutcome>,
}

/// Body for the project-rate calculation.
#[derive(Debug, Deserialize)]
pub struct ProjectRateRequest {
    pub client_type: String,
    pub client_region: String,
    pub project_hours: Option<f64>,
    pub buffer: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AppliedMultipliers {
    pub seniority: f64,
    pub client_type: f64,
    pub client_region: f64,
    pub combined: f64,
}

#[derive(Debug, Serialize)]
pub struct ProjectRateResponse {
    pub final_hourly_rate: f64,
    pub multipliers: AppliedMultipliers,
    pub monthly_revenue: f64,
    pub annual_revenue: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_price: Option<f64>,
    pub sustainability: Sustainability,
}

// ---------------------------------------------------------------------------
// Collected-data extraction
// ---------------------------------------------------------------------------

/// Numeric answers collected by the questionnaire, plus skills/seniority.
struct SessionInputs {
    costs: CostProfile,
    desired_monthly_income: f64,
    billable_hours_per_month: f64,
    profit_margin: f64,
    experience_years: f64,
    seniority_level: SeniorityLevel,
    skill_names: Vec<String>,
}

fn require_number(collected: &Value, key: &str) -> Result<f64, CoreError> {
    collected
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| CoreError::Validation(format!("Onboarding answer '{key}' is missing")))
}

/// Turn a completed session's collected answers into formula inputs.
fn session_inputs(collected: &Value) -> Result<SessionInputs, CoreError> {
    let fixed = FixedCosts::new(
        require_number(collected, "rent")?,
        require_number(collected, "equipment")?,
        require_number(collected, "insurance")?,
        0.0,
        0.0,
    )?;
    let variable = VariableCosts::new(require_number(collected, "materials")?, 0.0, 0.0)?;

    let experience_years = require_number(collected, "experience_years")?;
    let seniority_level = match collected.get("seniority_level").and_then(Value::as_str) {
        Some(level) => SeniorityLevel::from_str_db(level)?,
        None => SeniorityLevel::from_experience_years(experience_years),
    };

    let skill_names = collected
        .get("skill_categories")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(SessionInputs {
        costs: CostProfile::new(fixed, variable),
        desired_monthly_income: require_number(collected, "desired_monthly_income")?,
        billable_hours_per_month: require_number(collected, "billable_hours_per_month")?,
        profit_margin: require_number(collected, "profit_margin")?,
        experience_years,
        seniority_level,
        skill_names,
    })
}

// ---------------------------------------------------------------------------
// POST /rates/base
// ---------------------------------------------------------------------------

/// Compute the cost-recovery base rate and persist it to the profile.
///
/// Creates the profile on first calculation; on recalculation only the
/// session-provided fields replace stored values, prior cost components
/// that the questionnaire does not ask about are preserved.
pub async fn calculate_base_rate(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<BaseRateRequest>,
) -> AppResult<impl IntoResponse> {
    let existing = PricingProfileRepo::find_by_user_id(&state.pool, user.user_id).await?;

    let (data, breakdown, skill_names) = match request.session_id {
        Some(session_id) => {
            let session = OnboardingSessionRepo::find_by_id(&state.pool, session_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "OnboardingSession",
                    id: session_id,
                }))?;
            if session.user_id != user.user_id {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Session belongs to another user".to_string(),
                )));
            }
            if session.status == OnboardingStatus::Abandoned.as_str() {
                return Err(AppError::Core(CoreError::Validation(
                    "Cannot calculate from an abandoned session".to_string(),
                )));
            }

            let inputs = session_inputs(&session.collected_data).map_err(AppError::Core)?;

            // Keep cost components the questionnaire does not ask about.
            let mut costs = inputs.costs;
            if let Some(profile) = &existing {
                let prior = profile.cost_profile();
                costs.fixed.utilities = prior.fixed.utilities;
                costs.fixed.taxes = prior.fixed.taxes;
                costs.variable.outsourcing = prior.variable.outsourcing;
                costs.variable.marketing = prior.variable.marketing;
            }

            let breakdown = rate_formula::base_rate_breakdown(
                &costs.fixed,
                &costs.variable,
                inputs.desired_monthly_income,
                inputs.profit_margin,
                inputs.billable_hours_per_month,
            )
            .map_err(AppError::Core)?;

            let data = PricingProfileData {
                costs,
                desired_monthly_income: inputs.desired_monthly_income,
                billable_hours_per_month: inputs.billable_hours_per_month,
                profit_margin: inputs.profit_margin,
                experience_years: inputs.experience_years,
                seniority_level: inputs.seniority_level.as_str().to_string(),
                base_hourly_rate: Some(breakdown.base_hourly_rate),
            };
            (data, breakdown, inputs.skill_names)
        }
        None => {
            let profile = existing.clone().ok_or(AppError::Core(CoreError::NotFound {
                entity: "PricingProfile",
                id: user.user_id,
            }))?;
            let costs = profile.cost_profile();
            let breakdown = rate_formula::base_rate_breakdown(
                &costs.fixed,
                &costs.variable,
                profile.desired_monthly_income,
                profile.profit_margin,
                profile.billable_hours_per_month,
            )
            .map_err(AppError::Core)?;

            let data = PricingProfileData {
                costs,
                desired_monthly_income: profile.desired_monthly_income,
                billable_hours_per_month: profile.billable_hours_per_month,
                profit_margin: profile.profit_margin,
                experience_years: profile.experience_years,
                seniority_level: profile.seniority_level.clone(),
                base_hourly_rate: Some(breakdown.base_hourly_rate),
            };
            (data, breakdown, Vec::new())
        }
    };

    let created = existing.is_none();
    let profile = if created {
        PricingProfileRepo::create(&state.pool, user.user_id, &data).await?
    } else {
        PricingProfileRepo::update(&state.pool, user.user_id, &data)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "PricingProfile",
                id: user.user_id,
            }))?
    };

    // Associate the skills named during onboarding with the profile.
    let category_assignment = if skill_names.is_empty() {
        None
    } else {
        let category_ids = resolve_category_ids(&state.pool, &skill_names).await?;
        let outcome =
            ProfileCategoryRepo::swap_categories(&state.pool, profile.id, &category_ids).await?;
        Some(outcome)
    };

    tracing::info!(
        user_id = user.user_id,
        base_hourly_rate = breakdown.base_hourly_rate,
        created,
        "Base rate calculated"
    );

    Ok(Json(DataResponse {
        data: BaseRateResponse {
            base_hourly_rate: breakdown.base_hourly_rate,
            breakdown,
            created_profile: created,
            pricing_profile: profile,
            category_assignment,
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /rates/project
// ---------------------------------------------------------------------------

/// Apply seniority and client-context multipliers to the stored base rate,
/// with revenue projections and an optional buffered project price.
pub async fn calculate_project_rate(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<ProjectRateRequest>,
) -> AppResult<impl IntoResponse> {
    let context = ClientContext::from_strings(&body.client_type, &body.client_region)
        .map_err(AppError::Core)?;

    let profile = PricingProfileRepo::find_by_user_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PricingProfile",
            id: user.user_id,
        }))?;

    let base = profile.base_hourly_rate.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "No base rate on file; calculate the base rate first".to_string(),
        ))
    })?;

    let seniority = SeniorityLevel::from_str_db(&profile.seniority_level).map_err(AppError::Core)?;
    let final_rate =
        rate_formula::apply_multipliers(base, seniority, Some(&context)).map_err(AppError::Core)?;
    let final_rate = ratecraft_core::types::round2(final_rate);

    let project_price = body
        .project_hours
        .map(|hours| {
            rate_formula::project_price(
                final_rate,
                hours,
                body.buffer.unwrap_or(DEFAULT_PROJECT_BUFFER),
            )
        })
        .transpose()
        .map_err(AppError::Core)?;

    let sustainability =
        rate_formula::sustainability(final_rate, base).map_err(AppError::Core)?;

    tracing::debug!(
        user_id = user.user_id,
        final_rate,
        client_type = %body.client_type,
        client_region = %body.client_region,
        "Project rate calculated"
    );

    Ok(Json(DataResponse {
        data: ProjectRateResponse {
            final_hourly_rate: final_rate,
            multipliers: AppliedMultipliers {
                seniority: seniority.multiplier(),
                client_type: context.client_type.multiplier(),
                client_region: context.client_region.multiplier(),
                combined: seniority.multiplier() * context.multiplier(),
            },
            monthly_revenue: rate_formula::monthly_revenue(
                final_rate,
                profile.billable_hours_per_month,
            ),
            annual_revenue: rate_formula::annual_revenue(
                final_rate,
                profile.billable_hours_per_month,
            ),
            project_price,
            sustainability,
        },
    }))
}
