use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::BookSessionRequest;
use crate::error::Error;
use crate::middleware::auth::SessionContext;
use crate::AppState;

#[axum::debug_handler]
pub async fn book_session(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(req): Json<BookSessionRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let tutor = state
        .profile_service
        .find(req.tutor_id)
        .await?
        .ok_or_else(|| Error::NotFound("Tutor not found".to_string()))?;
    let session = state.session_service.book(ctx, &tutor, &req).await?;
    Ok(Json(session).into_response())
}

#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> crate::error::Result<Response> {
    let sessions = state.session_service.list_for_user(ctx).await?;
    Ok(Json(sessions).into_response())
}

#[axum::debug_handler]
pub async fn confirm_session(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let session = state.session_service.confirm(ctx, session_id).await?;
    Ok(Json(session).into_response())
}

#[axum::debug_handler]
pub async fn complete_session(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let session = state.session_service.complete(ctx, session_id).await?;
    Ok(Json(session).into_response())
}

#[axum::debug_handler]
pub async fn cancel_session(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let session = state.session_service.cancel(ctx, session_id).await?;
    Ok(Json(session).into_response())
}
