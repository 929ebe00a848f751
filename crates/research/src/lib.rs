//! HTTP client for the external AI research collaborator.
//!
//! The service analyzes portfolio material and interprets free-form
//! onboarding answers. Responses are returned as raw JSON values; all
//! validation and normalization happens in `ratecraft_core::ai_signals`,
//! so nothing from this service is trusted as-is.

pub mod api;
pub mod types;

pub use api::{ResearchApi, ResearchApiError};
