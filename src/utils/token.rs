use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::profile::{Profile, UserRole};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

const TOKEN_TTL_HOURS: i64 = 24;

pub fn issue_jwt(profile: &Profile) -> Result<String> {
    let config = crate::config::get_config();
    let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: profile.id.to_string(),
        exp,
        role: Some(role_str(profile.role).to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to issue token: {}", e)))
}

pub fn role_str(role: UserRole) -> &'static str {
    match role {
        UserRole::Tutor => "tutor",
        UserRole::Learner => "learner",
    }
}

/// Opaque alphanumeric identifier, used for simulated reward transactions.
pub fn generate_opaque_id(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
