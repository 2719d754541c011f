use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::attempt_dto::{
    AttemptStatusResponse, NavigateResponse, SaveAnswerRequest, SaveAnswerResponse,
    StartAttemptResponse, SubmitResponse,
};
use crate::dto::quiz_dto::PublicQuestion;
use crate::middleware::auth::SessionContext;
use crate::services::scoring;
use crate::AppState;

#[axum::debug_handler]
pub async fn start_attempt(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(quiz_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let quiz = state.quiz_service.resolve(quiz_id).await?;
    let attempt = state.attempt_service.start(ctx, &quiz).await?;
    Ok(Json(StartAttemptResponse::from_attempt(&attempt, Utc::now())).into_response())
}

#[axum::debug_handler]
pub async fn get_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let mut attempt = state.attempt_service.get(ctx, attempt_id).await?;
    // A status read past the deadline triggers the auto-submission, exactly
    // as the sweeper would.
    if attempt.is_expired(Utc::now()) {
        if let Some((finished, _)) = state.attempt_service.finalize_expired(&attempt).await? {
            attempt = finished;
        } else {
            attempt = state.attempt_service.get(ctx, attempt_id).await?;
        }
    }
    Ok(Json(AttemptStatusResponse::from_attempt(&attempt, Utc::now())).into_response())
}

#[axum::debug_handler]
pub async fn save_answer(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(attempt_id): Path<Uuid>,
    Json(req): Json<SaveAnswerRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let attempt = state
        .attempt_service
        .save_answer(ctx, attempt_id, &req.question_id, &req.answer)
        .await?;
    Ok(Json(SaveAnswerResponse {
        saved: true,
        question_id: req.question_id,
        questions_answered: attempt.answered_count(),
        total_questions: attempt.total_questions(),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn next_question(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let attempt = state.attempt_service.advance(ctx, attempt_id).await?;
    Ok(Json(NavigateResponse {
        current_question: attempt.current_question,
        question: attempt.current_question_def().map(PublicQuestion::from),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn previous_question(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let attempt = state.attempt_service.retreat(ctx, attempt_id).await?;
    Ok(Json(NavigateResponse {
        current_question: attempt.current_question,
        question: attempt.current_question_def().map(PublicQuestion::from),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let (attempt, result) = state.attempt_service.submit(ctx, attempt_id).await?;
    let eligible = scoring::is_eligible(result.score);
    Ok(Json(SubmitResponse {
        attempt_id: attempt.id,
        status: attempt.status,
        result,
        eligible_for_reward: eligible,
        message: "Quiz submitted successfully".to_string(),
    })
    .into_response())
}
