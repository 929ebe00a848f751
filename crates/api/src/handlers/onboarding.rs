//! Handlers for the guided onboarding questionnaire.
//!
//! Sessions walk a fixed list of typed questions. Answers are interpreted
//! by the AI research service when available and fall back to deterministic
//! parsing, so the flow never blocks on the collaborator.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ratecraft_core::error::CoreError;
use ratecraft_core::onboarding::{
    self, OnboardingStatus, Progress, Question,
};
use ratecraft_core::types::DbId;
use ratecraft_db::models::onboarding_session::OnboardingSession;
use ratecraft_db::repositories::OnboardingSessionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Body for answering the current question.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// Session summary returned on start and on get.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: DbId,
    pub status: String,
    pub current_question: Option<Question>,
    pub progress: Progress,
}

/// Result of one answer submission. An invalid answer leaves the session
/// untouched and returns the same question with an error message.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub complete: bool,
    pub next_question: Option<Question>,
    pub progress: Progress,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a session and verify ownership.
async fn load_owned_session(
    pool: &sqlx::PgPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<OnboardingSession> {
    let session = OnboardingSessionRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "OnboardingSession",
            id,
        }))?;

    if session.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Session belongs to another user".to_string(),
        )));
    }
    Ok(session)
}

/// Decode the JSONB question list stored on the session row.
fn decode_questions(session: &OnboardingSession) -> AppResult<Vec<Question>> {
    serde_json::from_value(session.questions.clone()).map_err(|e| {
        AppError::InternalError(format!(
            "Corrupt question list on session {}: {e}",
            session.id
        ))
    })
}

fn session_view(session: &OnboardingSession, questions: &[Question]) -> SessionView {
    SessionView {
        session_id: session.id,
        status: session.status.clone(),
        current_question: onboarding::current_question(
            questions,
            session.current_question_index as usize,
        )
        .cloned(),
        progress: onboarding::progress(questions),
    }
}

/// Interpret a raw answer into a typed, validated value.
///
/// Tries the AI interpreter first; any failure there (transport, bad
/// payload, value rejected by validation) falls back to deterministic
/// parsing. Only a deterministic-parse failure is a user-facing error.
async fn interpret_answer(
    state: &AppState,
    question: &Question,
    raw: &str,
) -> Result<Value, CoreError> {
    if let Some(research) = &state.research {
        match research
            .interpret_answer(
                &question.key,
                &question.text,
                question.expected_type.as_str(),
                raw,
            )
            .await
        {
            Ok(payload) => {
                // Expected shape is { "value": ... }; tolerate a bare value.
                let candidate = payload.get("value").cloned().unwrap_or(payload);
                match onboarding::validate_typed(question, &candidate) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        tracing::debug!(
                            question = %question.key,
                            error = %e,
                            "AI interpretation rejected by validation; falling back"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    question = %question.key,
                    error = %e,
                    "Answer interpretation unavailable; falling back to local parsing"
                );
            }
        }
    }

    let parsed = onboarding::parse_answer(question, raw)?;
    onboarding::validate_typed(question, &parsed)
}

// ---------------------------------------------------------------------------
// POST /onboarding/sessions
// ---------------------------------------------------------------------------

/// Start a new onboarding session for the authenticated user.
///
/// Any existing in-progress session is abandoned first, keeping at most one
/// active session per user.
pub async fn start_session(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let abandoned = OnboardingSessionRepo::abandon_active_for_user(&state.pool, user.user_id).await?;
    if abandoned > 0 {
        tracing::info!(
            user_id = user.user_id,
            abandoned,
            "Abandoned prior onboarding session before starting a new one"
        );
    }

    let questions = onboarding::question_catalog();
    let questions_json = serde_json::to_value(&questions)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize questions: {e}")))?;

    let session = OnboardingSessionRepo::create(&state.pool, user.user_id, &questions_json).await?;

    tracing::info!(
        session_id = session.id,
        user_id = user.user_id,
        "Onboarding session started"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: session_view(&session, &questions),
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /onboarding/sessions/{id}
// ---------------------------------------------------------------------------

/// Get a session's current question and progress.
pub async fn get_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let session = load_owned_session(&state.pool, id, user.user_id).await?;
    let questions = decode_questions(&session)?;
    Ok(Json(DataResponse {
        data: session_view(&session, &questions),
    }))
}

// ---------------------------------------------------------------------------
// POST /onboarding/sessions/{id}/answer
// ---------------------------------------------------------------------------

/// Answer the current question.
///
/// On a valid answer the session advances; answering the final question
/// completes the session. On an invalid answer nothing is mutated and the
/// same question is returned with an error message.
pub async fn answer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<DbId>,
    Json(body): Json<AnswerRequest>,
) -> AppResult<impl IntoResponse> {
    let session = load_owned_session(&state.pool, id, user.user_id).await?;
    onboarding::ensure_in_progress(&session.status).map_err(AppError::Core)?;

    let mut questions = decode_questions(&session)?;
    let index = session.current_question_index as usize;

    let Some(question) = onboarding::current_question(&questions, index).cloned() else {
        return Err(AppError::Core(CoreError::Validation(
            "All questions have been answered".to_string(),
        )));
    };

    let value = match interpret_answer(&state, &question, &body.answer).await {
        Ok(value) => value,
        Err(CoreError::Validation(message)) => {
            // Invalid answer: report it and re-ask without touching state.
            return Ok(Json(DataResponse {
                data: AnswerResponse {
                    is_valid: false,
                    error: Some(message),
                    complete: false,
                    next_question: Some(question),
                    progress: onboarding::progress(&questions),
                },
            }));
        }
        Err(other) => return Err(AppError::Core(other)),
    };

    let mut collected = session
        .collected_data
        .as_object()
        .cloned()
        .unwrap_or_default();
    onboarding::record_answer(&mut questions, &mut collected, index, value)
        .map_err(AppError::Core)?;

    let next_index = index + 1;
    let questions_json = serde_json::to_value(&questions)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize questions: {e}")))?;
    let collected_json = Value::Object(collected);

    OnboardingSessionRepo::update_answer_state(
        &state.pool,
        id,
        &questions_json,
        &collected_json,
        next_index as i32,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "OnboardingSession",
        id,
    }))?;

    let complete = onboarding::is_complete(&questions, next_index);
    if complete {
        OnboardingSessionRepo::set_status(&state.pool, id, OnboardingStatus::Completed).await?;
        tracing::info!(
            session_id = id,
            user_id = user.user_id,
            "Onboarding session completed"
        );
    } else {
        tracing::debug!(
            session_id = id,
            question = %question.key,
            index = next_index,
            "Onboarding answer recorded"
        );
    }

    Ok(Json(DataResponse {
        data: AnswerResponse {
            is_valid: true,
            error: None,
            complete,
            next_question: onboarding::current_question(&questions, next_index).cloned(),
            progress: onboarding::progress(&questions),
        },
    }))
}
