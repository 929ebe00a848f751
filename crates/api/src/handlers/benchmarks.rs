//! Handlers for market-benchmark lookup and maintenance.
//!
//! All reads go through the injected TTL cache, which also stores negative
//! lookups. Upserts invalidate every cached benchmark entry by key prefix.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use ratecraft_core::benchmark::{self, Confidence, RatePosition};
use ratecraft_core::error::CoreError;
use ratecraft_core::seniority::SeniorityLevel;
use ratecraft_core::types::DbId;
use ratecraft_db::models::market_benchmark::{MarketBenchmark, UpsertMarketBenchmark};
use ratecraft_db::repositories::{
    CategoryRepo, MarketBenchmarkRepo, PricingProfileRepo, ProfileCategoryRepo,
};

use crate::error::{AppError, AppResult};
use crate::handlers::resolve_category_ids;
use crate::middleware::auth::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Key prefix for all cached benchmark lookups.
const CACHE_PREFIX: &str = "benchmark:";

fn cache_key(category_id: DbId, seniority: &str) -> String {
    format!("{CACHE_PREFIX}{category_id}:{seniority}")
}

// ---------------------------------------------------------------------------
// Cached reads
// ---------------------------------------------------------------------------

/// Fetch one benchmark through the cache.
pub(crate) async fn fetch_benchmark_cached(
    state: &AppState,
    category_id: DbId,
    seniority: &str,
) -> AppResult<Option<MarketBenchmark>> {
    let key = cache_key(category_id, seniority);
    if let Some(cached) = state.benchmark_cache.get(&key) {
        return Ok(cached);
    }

    let fetched =
        MarketBenchmarkRepo::find_by_category_and_seniority(&state.pool, category_id, seniority)
            .await?;
    state.benchmark_cache.insert(key, fetched.clone());
    Ok(fetched)
}

/// Fetch benchmarks for many categories at one seniority through the
/// cache. Misses are loaded with a single batched query; absent
/// combinations are cached as negatives.
pub(crate) async fn fetch_benchmarks_cached(
    state: &AppState,
    category_ids: &[DbId],
    seniority: &str,
) -> AppResult<HashMap<DbId, Option<MarketBenchmark>>> {
    let mut results: HashMap<DbId, Option<MarketBenchmark>> = HashMap::new();
    let mut misses: Vec<DbId> = Vec::new();

    for &category_id in category_ids {
        match state.benchmark_cache.get(&cache_key(category_id, seniority)) {
            Some(cached) => {
                results.insert(category_id, cached);
            }
            None => misses.push(category_id),
        }
    }

    if !misses.is_empty() {
        let fetched =
            MarketBenchmarkRepo::find_by_categories_and_seniority(&state.pool, &misses, seniority)
                .await?;
        let mut by_category: HashMap<DbId, MarketBenchmark> =
            fetched.into_iter().map(|b| (b.category_id, b)).collect();

        for category_id in misses {
            let benchmark = by_category.remove(&category_id);
            state
                .benchmark_cache
                .insert(cache_key(category_id, seniority), benchmark.clone());
            results.insert(category_id, benchmark);
        }
    }

    Ok(results)
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Query parameters for the benchmark lookup.
#[derive(Debug, Deserialize)]
pub struct GetBenchmarksParams {
    /// Comma-separated category names; defaults to the profile's skill
    /// categories when absent.
    pub categories: Option<String>,
    /// Seniority level; defaults to the profile's when absent.
    pub seniority: Option<String>,
}

/// One benchmark lookup result, including misses.
#[derive(Debug, Serialize)]
pub struct BenchmarkEntry {
    pub category_id: DbId,
    pub category_name: String,
    pub benchmark: Option<MarketBenchmark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<RatePosition>,
}

/// Comparison of the stored base rate against the resolved benchmarks.
#[derive(Debug, Serialize)]
pub struct MarketAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_hourly_rate: Option<f64>,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct GetBenchmarksResponse {
    pub seniority_level: String,
    pub benchmarks: Vec<BenchmarkEntry>,
    pub market_analysis: MarketAnalysis,
}

/// Body for inserting or refreshing a benchmark row.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertBenchmarkRequest {
    pub category_id: DbId,
    pub seniority_level: String,
    #[validate(range(min = 0.0))]
    pub median_hourly_rate: f64,
    #[validate(range(min = 0.0))]
    pub percentile_75_rate: f64,
    #[validate(range(min = 0))]
    pub sample_size: i32,
    #[validate(length(min = 1, max = 40))]
    pub region: String,
}

// ---------------------------------------------------------------------------
// GET /benchmarks
// ---------------------------------------------------------------------------

/// Look up market benchmarks for the user's categories and seniority.
pub async fn get_benchmarks(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<GetBenchmarksParams>,
) -> AppResult<impl IntoResponse> {
    let profile = PricingProfileRepo::find_by_user_id(&state.pool, user.user_id).await?;

    // Seniority: explicit parameter, else the profile's.
    let seniority = match &params.seniority {
        Some(level) => SeniorityLevel::from_str_db(level).map_err(AppError::Core)?,
        None => {
            let profile = profile.as_ref().ok_or(AppError::Core(CoreError::NotFound {
                entity: "PricingProfile",
                id: user.user_id,
            }))?;
            SeniorityLevel::from_str_db(&profile.seniority_level).map_err(AppError::Core)?
        }
    };

    // Categories: explicit names fuzzy-resolved, else the profile's
    // associated categories.
    let category_ids: Vec<DbId> = match &params.categories {
        Some(raw) => {
            let names: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                return Err(AppError::Core(CoreError::Validation(
                    "No categories supplied".to_string(),
                )));
            }
            resolve_category_ids(&state.pool, &names).await?
        }
        None => {
            let profile = profile.as_ref().ok_or(AppError::Core(CoreError::NotFound {
                entity: "PricingProfile",
                id: user.user_id,
            }))?;
            ProfileCategoryRepo::find_category_ids(&state.pool, profile.id).await?
        }
    };

    if category_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No benchmark categories resolved; provide category names or set profile skills"
                .to_string(),
        )));
    }

    let lookups = fetch_benchmarks_cached(&state, &category_ids, seniority.as_str()).await?;

    // One registry fetch for display names instead of a lookup per entry.
    let category_names: HashMap<DbId, String> = CategoryRepo::find_all(&state.pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let base_rate = profile.as_ref().and_then(|p| p.base_hourly_rate);
    let mut entries: Vec<BenchmarkEntry> = Vec::with_capacity(category_ids.len());
    for category_id in &category_ids {
        let category_name = category_names.get(category_id).cloned().ok_or(AppError::Core(
            CoreError::NotFound {
                entity: "Category",
                id: *category_id,
            },
        ))?;
        let benchmark = lookups.get(category_id).cloned().flatten();
        let confidence = benchmark
            .as_ref()
            .map(|b| Confidence::from_sample_size(b.sample_size));
        let position = match (&benchmark, base_rate) {
            (Some(b), Some(rate)) => Some(benchmark::compare_to_median(rate, b.median_hourly_rate)),
            _ => None,
        };
        entries.push(BenchmarkEntry {
            category_id: *category_id,
            category_name,
            benchmark,
            confidence,
            position,
        });
    }

    let market_analysis = build_market_analysis(base_rate, &entries, seniority);

    tracing::debug!(
        user_id = user.user_id,
        categories = category_ids.len(),
        seniority = seniority.as_str(),
        "Benchmarks resolved"
    );

    Ok(Json(DataResponse {
        data: GetBenchmarksResponse {
            seniority_level: seniority.as_str().to_string(),
            benchmarks: entries,
            market_analysis,
        },
    }))
}

/// Summarize how the stored base rate sits against the resolved medians.
fn build_market_analysis(
    base_rate: Option<f64>,
    entries: &[BenchmarkEntry],
    seniority: SeniorityLevel,
) -> MarketAnalysis {
    let resolved = entries.iter().filter(|e| e.benchmark.is_some()).count();
    let summary = match base_rate {
        None => format!(
            "{resolved} of {} categories have {} benchmark data; calculate a base rate to see how you compare.",
            entries.len(),
            seniority.as_str()
        ),
        Some(rate) => {
            let below = entries
                .iter()
                .filter(|e| e.position == Some(RatePosition::BelowMedian))
                .count();
            let above = entries
                .iter()
                .filter(|e| e.position == Some(RatePosition::AboveMedian))
                .count();
            format!(
                "Your base rate of {rate:.2}/h is below the median in {below} and above it in {above} of {resolved} benchmarked categories."
            )
        }
    };

    MarketAnalysis {
        base_hourly_rate: base_rate,
        summary,
    }
}

// ---------------------------------------------------------------------------
// PUT /benchmarks
// ---------------------------------------------------------------------------

/// Insert or refresh a benchmark row, then invalidate cached benchmark
/// reads so the next lookup reflects the new values.
pub async fn upsert_benchmark(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(body): Json<UpsertBenchmarkRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    SeniorityLevel::from_str_db(&body.seniority_level).map_err(AppError::Core)?;
    benchmark::validate_benchmark_rates(
        body.median_hourly_rate,
        body.percentile_75_rate,
        body.sample_size,
    )
    .map_err(AppError::Core)?;

    CategoryRepo::find_by_id(&state.pool, body.category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: body.category_id,
        }))?;

    let benchmark = MarketBenchmarkRepo::upsert(
        &state.pool,
        &UpsertMarketBenchmark {
            category_id: body.category_id,
            seniority_level: body.seniority_level,
            median_hourly_rate: body.median_hourly_rate,
            percentile_75_rate: body.percentile_75_rate,
            sample_size: body.sample_size,
            region: body.region,
        },
    )
    .await?;

    let invalidated = state.benchmark_cache.invalidate_prefix(CACHE_PREFIX);
    tracing::info!(
        category_id = benchmark.category_id,
        seniority = %benchmark.seniority_level,
        invalidated,
        "Benchmark upserted; cache invalidated"
    );

    Ok(Json(DataResponse { data: benchmark }))
}
