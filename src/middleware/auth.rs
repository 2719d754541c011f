use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::profile::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Identity of the caller for the duration of one request. Hydrated here,
/// from the bearer token, and handed to every operation that needs to know
/// who is acting; nothing else holds a "current user".
#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

fn unauthorized(reason: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": reason }))).into_response()
}

pub async fn require_session(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return unauthorized("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return unauthorized("bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return unauthorized("unsupported_scheme");
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data,
        Err(_) => return unauthorized("invalid_token"),
    };

    let Ok(user_id) = data.claims.sub.parse::<Uuid>() else {
        return unauthorized("invalid_token");
    };
    let role = match data.claims.role.as_deref() {
        Some("tutor") => UserRole::Tutor,
        Some("learner") => UserRole::Learner,
        _ => return unauthorized("invalid_token"),
    };

    req.extensions_mut().insert(SessionContext { user_id, role });
    next.run(req).await
}
