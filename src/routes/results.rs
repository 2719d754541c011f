use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;

use crate::error::Error;
use crate::middleware::auth::SessionContext;
use crate::AppState;

#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> crate::error::Result<Response> {
    let results = state.result_service.history(ctx.user_id).await?;
    Ok(Json(results).into_response())
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(result_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let result = state
        .result_service
        .get(result_id)
        .await?
        .filter(|r| r.user_id == ctx.user_id)
        .ok_or_else(|| Error::NotFound("Quiz result not found".to_string()))?;
    Ok(Json(result).into_response())
}

#[axum::debug_handler]
pub async fn claim_reward(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(result_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let outcome = state.reward_service.claim(ctx, result_id).await?;
    Ok(Json(outcome).into_response())
}
