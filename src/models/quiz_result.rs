use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Outcome of a completed attempt. `reward_claimed` is the only field that
/// changes after creation, exactly once, false to true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub time_taken_seconds: i32,
    pub completed: bool,
    pub reward_claimed: bool,
    pub created_at: DateTime<Utc>,
}
