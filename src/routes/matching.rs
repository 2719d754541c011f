use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use validator::Validate;

use crate::catalog;
use crate::dto::booking_dto::{MatchRequest, MatchResponse};
use crate::error::Error;
use crate::middleware::auth::SessionContext;
use crate::AppState;

#[axum::debug_handler]
pub async fn find_tutors(
    State(state): State<AppState>,
    Extension(_ctx): Extension<SessionContext>,
    Json(req): Json<MatchRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    if !catalog::is_known_subject(&req.subject) {
        return Err(Error::BadRequest(format!(
            "Unknown subject: {}",
            req.subject
        )));
    }
    if !catalog::is_known_slot(&req.slot) {
        return Err(Error::BadRequest(format!(
            "Unknown availability slot: {}",
            req.slot
        )));
    }

    let tutors = state.matching_service.search(&req.subject, &req.slot).await?;
    tracing::info!(subject = %req.subject, slot = %req.slot, found = tutors.len(), "Tutor search");
    Ok(Json(MatchResponse {
        count: tutors.len(),
        tutors,
    })
    .into_response())
}
