use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::catalog;
use crate::dto::quiz_dto::{GenerateQuizRequest, QuizDetail, QuizSummary};
use crate::error::Error;
use crate::middleware::auth::SessionContext;
use crate::models::quiz::Difficulty;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_quizzes(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> crate::error::Result<Response> {
    // A missing or unreachable profile degrades to the starter catalog
    // rather than blocking the quiz list.
    let profile = match state.profile_service.find(ctx.user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = ?e, "Profile lookup failed, listing the starter catalog");
            None
        }
    };
    let quizzes = state.quiz_service.quizzes_for_user(profile.as_ref()).await;
    let summaries: Vec<QuizSummary> = quizzes.iter().map(QuizSummary::from).collect();
    Ok(Json(summaries).into_response())
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Extension(_ctx): Extension<SessionContext>,
    Path(quiz_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let quiz = state.quiz_service.resolve(quiz_id).await?;
    Ok(Json(QuizDetail::from(&quiz)).into_response())
}

#[axum::debug_handler]
pub async fn generate_quiz(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(req): Json<GenerateQuizRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    if !catalog::is_known_subject(&req.subject) {
        return Err(Error::BadRequest(format!(
            "Unknown subject: {}",
            req.subject
        )));
    }

    let config = crate::config::get_config();
    let count = req
        .count
        .unwrap_or(5)
        .min(config.max_generated_questions)
        .max(1);
    let difficulty = req.difficulty.unwrap_or(Difficulty::Medium);

    let questions = state
        .generator_service
        .questions_or_fallback(&req.subject, count)
        .await;
    let quiz = state
        .quiz_service
        .create_generated(&req.subject, difficulty, questions, Some(ctx.user_id))
        .await?;

    tracing::info!(quiz_id = %quiz.id, subject = %req.subject, "Quiz generated");
    Ok(Json(QuizDetail::from(&quiz)).into_response())
}
