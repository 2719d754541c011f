use crate::models::profile::Profile;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "availability slot is required"))]
    pub slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub count: usize,
    pub tutors: Vec<Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookSessionRequest {
    pub tutor_id: Uuid,
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "availability slot is required"))]
    pub slot: String,
}
