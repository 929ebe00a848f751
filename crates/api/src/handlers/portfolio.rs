//! Handlers for AI-assisted rate reconciliation and the accept flow.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use ratecraft_core::ai_signals::{self, PortfolioSignals};
use ratecraft_core::costs::CostProfile;
use ratecraft_core::error::CoreError;
use ratecraft_core::rate_formula;
use ratecraft_core::reconciliation::{
    self, AiStatus, BenchmarkBand, Overrides, RateRecommendation, DEFAULT_BILLABLE_HOURS,
    DEFAULT_PROFIT_MARGIN,
};
use ratecraft_core::seniority::{self, SeniorityLevel};
use ratecraft_core::types::{round2, DbId};
use ratecraft_db::models::pricing_profile::{PricingProfile, PricingProfileData};
use ratecraft_db::repositories::{PricingProfileRepo, ProfileCategoryRepo, SwapOutcome};
use ratecraft_research::types::{PortfolioMaterial, ResearchHints};

use crate::error::{AppError, AppResult};
use crate::handlers::benchmarks::fetch_benchmark_cached;
use crate::handlers::resolve_category_ids;
use crate::middleware::auth::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Portfolio material as submitted over HTTP, size-capped before it goes
/// anywhere near the research service.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AssistMaterial {
    #[validate(url, length(max = 2048))]
    pub url: Option<String>,
    #[validate(length(max = 20000))]
    pub text: Option<String>,
    /// Base64-encoded document bytes.
    #[validate(length(max = 1_400_000))]
    pub document_base64: Option<String>,
}

impl AssistMaterial {
    fn into_material(self) -> PortfolioMaterial {
        PortfolioMaterial {
            url: self.url,
            text: self.text,
            document_base64: self.document_base64,
        }
    }
}

/// Body for the portfolio-assist reconciliation.
#[derive(Debug, Deserialize, Validate)]
pub struct PortfolioAssistRequest {
    #[validate(nested)]
    pub material: Option<AssistMaterial>,
    pub hints: Option<ResearchHints>,
    pub overrides: Option<Overrides>,
    /// Skip the AI research step entirely.
    #[serde(default)]
    pub skip_ai: bool,
}

/// Body for committing an agreed rate into the profile.
#[derive(Debug, Deserialize)]
pub struct AcceptRateRequest {
    pub hourly_rate: f64,
    pub seniority_level: Option<String>,
    pub desired_monthly_income: Option<f64>,
    pub billable_hours_per_month: Option<f64>,
    pub profit_margin: Option<f64>,
    pub experience_years: Option<f64>,
    pub costs: Option<CostProfile>,
    pub skill_categories: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct CategoryAssignment {
    pub category_ids: Vec<DbId>,
    pub outcome: SwapOutcome,
}

#[derive(Debug, Serialize)]
pub struct AcceptRateResponse {
    pub pricing_profile: PricingProfile,
    /// `created` or `updated`.
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_assignment: Option<CategoryAssignment>,
}

// ---------------------------------------------------------------------------
// POST /portfolio/assist
// ---------------------------------------------------------------------------

/// Run the rate reconciliation cascade over AI portfolio signals, market
/// benchmarks, and static defaults.
pub async fn assist(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<PortfolioAssistRequest>,
) -> AppResult<Json<DataResponse<RateRecommendation>>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let material = request
        .material
        .map(AssistMaterial::into_material)
        .unwrap_or_default();
    let hints = request.hints.unwrap_or_default();
    let overrides = request.overrides.unwrap_or_default();

    // Step 1: AI research, skippable and never fatal.
    let (ai_status, signals): (AiStatus, Option<PortfolioSignals>) = if request.skip_ai
        || material.is_empty()
    {
        (AiStatus::Skipped, None)
    } else {
        match &state.research {
            None => (AiStatus::Skipped, None),
            Some(research) => match research.analyze_portfolio(&material, &hints).await {
                Ok(raw) => {
                    let signals = ai_signals::normalize(&raw);
                    tracing::info!(user_id = user.user_id, "Portfolio research succeeded");
                    (AiStatus::Used, Some(signals))
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = user.user_id,
                        error = %e,
                        "Portfolio research failed; continuing with lower cascade tiers"
                    );
                    (AiStatus::Failed, None)
                }
            },
        }
    };

    // Steps 2-4: confirm fields, resolve a category, fetch its benchmark.
    let (confirmed, _) = reconciliation::resolve_confirmed(signals.as_ref(), &overrides);
    let benchmark_band = match &confirmed.category_name {
        None => None,
        Some(category_name) => {
            let resolved =
                resolve_category_ids(&state.pool, std::slice::from_ref(category_name)).await?;
            match resolved.first() {
                None => None,
                Some(&category_id) => fetch_benchmark_cached(
                    &state,
                    category_id,
                    confirmed.seniority_level.as_str(),
                )
                .await?
                .map(|b| BenchmarkBand {
                    median: b.median_hourly_rate,
                    percentile_75: b.percentile_75_rate,
                }),
            }
        }
    };

    // Steps 5-8: one cascade tier, follow-ups, and explainability.
    let recommendation = reconciliation::build_recommendation(
        ai_status,
        signals.as_ref(),
        &overrides,
        benchmark_band,
    );

    tracing::info!(
        user_id = user.user_id,
        rate_source = ?recommendation.rate_source,
        hourly_rate = recommendation.hourly_rate,
        ai_status = ai_status.as_str(),
        "Rate recommendation produced"
    );

    Ok(Json(DataResponse {
        data: recommendation,
    }))
}

// ---------------------------------------------------------------------------
// POST /rates/accept
// ---------------------------------------------------------------------------

/// Commit an agreed rate into the user's pricing profile.
///
/// Creates the profile with sensible defaults when none exists; otherwise
/// updates only the supplied fields, preserving prior cost components
/// unless replacement costs are given.
pub async fn accept_rate(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<AcceptRateRequest>,
) -> AppResult<impl IntoResponse> {
    // Fail fast, before any I/O.
    reconciliation::validate_accepted_rate(body.hourly_rate).map_err(AppError::Core)?;
    let seniority_override = body
        .seniority_level
        .as_deref()
        .map(SeniorityLevel::from_str_db)
        .transpose()
        .map_err(AppError::Core)?;
    if let Some(costs) = &body.costs {
        costs.validate().map_err(AppError::Core)?;
    }

    let hourly_rate = round2(body.hourly_rate);
    let existing = PricingProfileRepo::find_by_user_id(&state.pool, user.user_id).await?;

    let (action, data) = match &existing {
        None => {
            let costs = body.costs.unwrap_or_else(CostProfile::sensible_defaults);
            let billable_hours = body
                .billable_hours_per_month
                .unwrap_or(DEFAULT_BILLABLE_HOURS);
            rate_formula::validate_billable_hours(billable_hours).map_err(AppError::Core)?;
            let profit_margin = body.profit_margin.unwrap_or(DEFAULT_PROFIT_MARGIN);
            rate_formula::validate_margin(profit_margin).map_err(AppError::Core)?;

            let desired_monthly_income = match body.desired_monthly_income {
                Some(income) => {
                    rate_formula::validate_desired_income(income).map_err(AppError::Core)?;
                    income
                }
                None => reconciliation::derive_income_from_rate(
                    hourly_rate,
                    billable_hours,
                    costs.total(),
                    profit_margin,
                ),
            };

            let experience_years = body
                .experience_years
                .unwrap_or_else(|| seniority::estimate_experience_from_rate(hourly_rate));
            let seniority_level = seniority_override
                .unwrap_or_else(|| SeniorityLevel::from_experience_years(experience_years));

            let data = PricingProfileData {
                costs,
                desired_monthly_income,
                billable_hours_per_month: billable_hours,
                profit_margin,
                experience_years,
                seniority_level: seniority_level.as_str().to_string(),
                base_hourly_rate: Some(hourly_rate),
            };
            ("created", data)
        }
        Some(profile) => {
            // Only supplied fields replace stored values.
            let billable_hours = body
                .billable_hours_per_month
                .unwrap_or(profile.billable_hours_per_month);
            rate_formula::validate_billable_hours(billable_hours).map_err(AppError::Core)?;
            let profit_margin = body.profit_margin.unwrap_or(profile.profit_margin);
            rate_formula::validate_margin(profit_margin).map_err(AppError::Core)?;
            let desired_monthly_income = match body.desired_monthly_income {
                Some(income) => {
                    rate_formula::validate_desired_income(income).map_err(AppError::Core)?;
                    income
                }
                None => profile.desired_monthly_income,
            };

            let data = PricingProfileData {
                costs: body.costs.unwrap_or_else(|| profile.cost_profile()),
                desired_monthly_income,
                billable_hours_per_month: billable_hours,
                profit_margin,
                experience_years: body.experience_years.unwrap_or(profile.experience_years),
                seniority_level: seniority_override
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| profile.seniority_level.clone()),
                base_hourly_rate: Some(hourly_rate),
            };
            ("updated", data)
        }
    };

    let profile = if existing.is_none() {
        PricingProfileRepo::create(&state.pool, user.user_id, &data).await?
    } else {
        PricingProfileRepo::update(&state.pool, user.user_id, &data)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "PricingProfile",
                id: user.user_id,
            }))?
    };

    // Optional skill-category swap, surfaced with its saga outcome.
    let category_assignment = match &body.skill_categories {
        None => None,
        Some(names) => {
            let category_ids = resolve_category_ids(&state.pool, names).await?;
            let outcome =
                ProfileCategoryRepo::swap_categories(&state.pool, profile.id, &category_ids)
                    .await?;
            if outcome == SwapOutcome::Inconsistent {
                tracing::error!(
                    user_id = user.user_id,
                    profile_id = profile.id,
                    "Skill category swap left associations inconsistent"
                );
            }
            Some(CategoryAssignment {
                category_ids,
                outcome,
            })
        }
    };

    tracing::info!(
        user_id = user.user_id,
        hourly_rate,
        action,
        "Rate accepted into pricing profile"
    );

    Ok(Json(DataResponse {
        data: AcceptRateResponse {
            pricing_profile: profile,
            action,
            category_assignment,
        },
    }))
}
