//! Route tables.
//!
//! ```text
//! /healthz                              liveness (GET)
//! /healthz/ready                        readiness incl. DB ping (GET)
//!
//! /api/v1/onboarding/sessions           start session (POST)
//! /api/v1/onboarding/sessions/{id}      current question + progress (GET)
//! /api/v1/onboarding/sessions/{id}/answer   answer current question (POST)
//!
//! /api/v1/rates/base                    calculate base rate (POST)
//! /api/v1/rates/project                 calculate project rate (POST)
//! /api/v1/rates/accept                  accept a rate into the profile (POST)
//!
//! /api/v1/benchmarks                    lookup (GET), upsert (PUT)
//!
//! /api/v1/portfolio/assist              AI-assisted rate recommendation (POST)
//! ```

pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Guided onboarding questionnaire.
        .route(
            "/onboarding/sessions",
            post(handlers::onboarding::start_session),
        )
        .route(
            "/onboarding/sessions/{id}",
            get(handlers::onboarding::get_session),
        )
        .route(
            "/onboarding/sessions/{id}/answer",
            post(handlers::onboarding::answer),
        )
        // Rate calculations and the accept flow.
        .route("/rates/base", post(handlers::rates::calculate_base_rate))
        .route(
            "/rates/project",
            post(handlers::rates::calculate_project_rate),
        )
        .route("/rates/accept", post(handlers::portfolio::accept_rate))
        // Market benchmarks.
        .route(
            "/benchmarks",
            get(handlers::benchmarks::get_benchmarks)
                .put(handlers::benchmarks::upsert_benchmark),
        )
        // AI-assisted reconciliation.
        .route("/portfolio/assist", post(handlers::portfolio::assist))
}
