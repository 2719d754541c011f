use crate::models::question::QuizQuestion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Minutes allotted for a quiz of this difficulty.
    pub fn default_time_limit(self) -> i32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 15,
            Difficulty::Hard => 20,
        }
    }
}

/// Where a quiz came from. Generated quizzes live in the session cache first
/// and are persisted best-effort; catalog quizzes are authored up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum QuizOrigin {
    Catalog,
    Generated,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    pub questions: JsonValue,
    pub difficulty: Difficulty,
    pub time_limit_minutes: i32,
    pub origin: QuizOrigin,
    pub created_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn parsed_questions(&self) -> Vec<QuizQuestion> {
        serde_json::from_value(self.questions.clone()).unwrap_or_default()
    }

    pub fn question_count(&self) -> usize {
        self.questions.as_array().map(|a| a.len()).unwrap_or(0)
    }
}
