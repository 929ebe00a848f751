//! Ratecraft domain core.
//!
//! Pure domain logic for the sustainable rate engine: cost and multiplier
//! models, the cost-recovery rate formula, fuzzy category matching,
//! onboarding questionnaire validation, benchmark scoring, AI-signal
//! normalization, the rate reconciliation cascade, and the generic TTL
//! cache. No I/O; everything here is deterministic and directly
//! unit-testable.

pub mod ai_signals;
pub mod benchmark;
pub mod cache;
pub mod client_context;
pub mod costs;
pub mod error;
pub mod onboarding;
pub mod rate_formula;
pub mod reconciliation;
pub mod seniority;
pub mod similarity;
pub mod types;
