//! Repository for the `onboarding_sessions` table.

use ratecraft_core::onboarding::OnboardingStatus;
use ratecraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::onboarding_session::OnboardingSession;

/// Column list for `onboarding_sessions` queries.
const COLUMNS: &str = "id, user_id, status, current_question_index, questions, \
     collected_data, created_at, updated_at, completed_at";

/// Provides CRUD operations for onboarding sessions.
pub struct OnboardingSessionRepo;

impl OnboardingSessionRepo {
    /// Insert a new in-progress session seeded with the question list.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        questions: &serde_json::Value,
    ) -> Result<OnboardingSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_sessions (user_id, questions) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(user_id)
            .bind(questions)
            .fetch_one(pool)
            .await
    }

    /// Find a session by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_sessions WHERE id = $1");
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the user's in-progress session, if any.
    pub async fn find_active_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_sessions \
             WHERE user_id = $1 AND status = $2 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(user_id)
            .bind(OnboardingStatus::InProgress.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Persist one answered question: updated question list, collected
    /// data, and the advanced index.
    pub async fn update_answer_state(
        pool: &PgPool,
        id: DbId,
        questions: &serde_json::Value,
        collected_data: &serde_json::Value,
        current_question_index: i32,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions \
             SET questions = $2, collected_data = $3, current_question_index = $4, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .bind(questions)
            .bind(collected_data)
            .bind(current_question_index)
            .fetch_optional(pool)
            .await
    }

    /// Transition a session to a terminal status. Completion also stamps
    /// `completed_at`; callers invoke this once per completion.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: OnboardingStatus,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions \
             SET status = $2, \
                 completed_at = CASE WHEN $2 = 'completed' THEN now() ELSE completed_at END, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Abandon the user's in-progress session, if any. Returns the number
    /// of sessions transitioned (0 or 1 under the partial unique index).
    pub async fn abandon_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE onboarding_sessions \
             SET status = $2, updated_at = now() \
             WHERE user_id = $1 AND status = $3",
        )
        .bind(user_id)
        .bind(OnboardingStatus::Abandoned.as_str())
        .bind(OnboardingStatus::InProgress.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a session. Returns the number of rows removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM onboarding_sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
