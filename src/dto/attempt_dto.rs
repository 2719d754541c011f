use crate::dto::quiz_dto::PublicQuestion;
use crate::models::attempt::{AttemptStatus, QuizAttempt};
use crate::models::quiz_result::QuizResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartAttemptResponse {
    pub attempt_id: Uuid,
    pub quiz_id: Uuid,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub time_remaining_seconds: i64,
    pub current_question: i32,
    pub questions: Vec<PublicQuestion>,
}

impl StartAttemptResponse {
    pub fn from_attempt(attempt: &QuizAttempt, now: DateTime<Utc>) -> Self {
        Self {
            attempt_id: attempt.id,
            quiz_id: attempt.quiz_id,
            status: attempt.status,
            started_at: attempt.started_at,
            expires_at: attempt.expires_at,
            time_remaining_seconds: attempt.remaining_seconds(now),
            current_question: attempt.current_question,
            questions: attempt
                .snapshot()
                .into_iter()
                .map(PublicQuestion::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveAnswerRequest {
    #[validate(length(min = 1, message = "question_id is required"))]
    pub question_id: String,
    #[validate(length(min = 1, message = "an answer selection is required"))]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAnswerResponse {
    pub saved: bool,
    pub question_id: String,
    pub questions_answered: usize,
    pub total_questions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptStatusResponse {
    pub attempt_id: Uuid,
    pub quiz_id: Uuid,
    pub status: AttemptStatus,
    pub current_question: i32,
    pub questions_answered: usize,
    pub total_questions: usize,
    pub time_remaining_seconds: i64,
    pub can_submit: bool,
}

impl AttemptStatusResponse {
    pub fn from_attempt(attempt: &QuizAttempt, now: DateTime<Utc>) -> Self {
        Self {
            attempt_id: attempt.id,
            quiz_id: attempt.quiz_id,
            status: attempt.status,
            current_question: attempt.current_question,
            questions_answered: attempt.answered_count(),
            total_questions: attempt.total_questions(),
            time_remaining_seconds: attempt.remaining_seconds(now),
            can_submit: attempt.can_submit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateResponse {
    pub current_question: i32,
    pub question: Option<PublicQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub attempt_id: Uuid,
    pub status: AttemptStatus,
    pub result: QuizResult,
    pub eligible_for_reward: bool,
    pub message: String,
}
