//! Onboarding session entity model.

use ratecraft_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `onboarding_sessions` table.
///
/// `questions` holds the serialized question list
/// (`Vec<ratecraft_core::onboarding::Question>`); `collected_data` is the
/// key→value map of validated answers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingSession {
    pub id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub current_question_index: i32,
    pub questions: serde_json::Value,
    pub collected_data: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}
