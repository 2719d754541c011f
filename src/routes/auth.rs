use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::middleware::auth::SessionContext;
use crate::utils::token::issue_jwt;
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let profile = state.profile_service.register(req).await?;
    let token = issue_jwt(&profile)?;
    Ok(Json(AuthResponse { token, profile }).into_response())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let profile = state
        .profile_service
        .authenticate(&req.email, &req.password)
        .await?;
    let token = issue_jwt(&profile)?;
    Ok(Json(AuthResponse { token, profile }).into_response())
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(_ctx): Extension<SessionContext>,
) -> crate::error::Result<Response> {
    state.profile_service.clear_session_snapshot().await?;
    Ok(Json(json!({ "logged_out": true })).into_response())
}
