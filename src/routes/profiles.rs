use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use validator::Validate;

use crate::catalog;
use crate::dto::profile_dto::UpdateProfileRequest;
use crate::middleware::auth::SessionContext;
use crate::AppState;

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> crate::error::Result<Response> {
    let profile = state.profile_service.me(ctx).await?;
    Ok(Json(profile).into_response())
}

#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let profile = state.profile_service.update(ctx, req).await?;
    Ok(Json(profile).into_response())
}

#[axum::debug_handler]
pub async fn list_tutors(
    State(state): State<AppState>,
    Extension(_ctx): Extension<SessionContext>,
) -> crate::error::Result<Response> {
    let tutors = match state.matching_service.registered_tutors().await {
        Ok(tutors) if !tutors.is_empty() => tutors,
        Ok(_) => catalog::sample_tutors(),
        Err(e) => {
            tracing::warn!(error = ?e, "Tutor roster unavailable, serving sample roster");
            catalog::sample_tutors()
        }
    };
    Ok(Json(tutors).into_response())
}
