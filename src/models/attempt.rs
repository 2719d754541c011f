use crate::error::{Error, Result};
use crate::models::question::QuizQuestion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Expired,
}

/// One run through a quiz. The answer map and navigation rules live here as
/// plain in-memory operations; persistence is the service's job. An attempt
/// is immutable once it leaves `InProgress`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub questions_snapshot: JsonValue,
    pub answers: JsonValue,
    pub current_question: i32,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl QuizAttempt {
    pub fn snapshot(&self) -> Vec<QuizQuestion> {
        serde_json::from_value(self.questions_snapshot.clone()).unwrap_or_default()
    }

    pub fn answers_map(&self) -> HashMap<String, String> {
        serde_json::from_value(self.answers.clone()).unwrap_or_default()
    }

    pub fn total_questions(&self) -> usize {
        self.questions_snapshot
            .as_array()
            .map(|a| a.len())
            .unwrap_or(0)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.as_object().map(|m| m.len()).unwrap_or(0)
    }

    pub fn all_answered(&self) -> bool {
        let answers = self.answers_map();
        let questions = self.snapshot();
        !questions.is_empty() && questions.iter().all(|q| answers.contains_key(&q.id))
    }

    pub fn current_question_def(&self) -> Option<QuizQuestion> {
        self.snapshot().into_iter().nth(self.current_question as usize)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == AttemptStatus::InProgress && now >= self.expires_at
    }

    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// Wall-clock seconds spent, capped at the deadline for auto-submitted
    /// attempts.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        let end = if now < self.expires_at { now } else { self.expires_at };
        (end - self.started_at).num_seconds().max(0)
    }

    fn ensure_in_progress(&self) -> Result<()> {
        match self.status {
            AttemptStatus::InProgress => Ok(()),
            AttemptStatus::Completed => {
                Err(Error::Conflict("Attempt has already been submitted".into()))
            }
            AttemptStatus::Expired => Err(Error::Conflict("Attempt has expired".into())),
        }
    }

    /// Record (or overwrite) the answer for a question. Last write wins.
    pub fn record_answer(&mut self, question_id: &str, answer: &str) -> Result<()> {
        self.ensure_in_progress()?;
        if !self.snapshot().iter().any(|q| q.id == question_id) {
            return Err(Error::NotFound(format!(
                "Question {} is not part of this attempt",
                question_id
            )));
        }
        let mut map = self.answers_map();
        map.insert(question_id.to_string(), answer.to_string());
        self.answers = serde_json::to_value(map)?;
        Ok(())
    }

    /// Move to the next question. Blocked until the current one is answered.
    pub fn advance(&mut self) -> Result<()> {
        self.ensure_in_progress()?;
        let total = self.total_questions() as i32;
        if self.current_question + 1 >= total {
            return Err(Error::BadRequest("Already at the last question".into()));
        }
        let current = self
            .current_question_def()
            .ok_or_else(|| Error::Internal("Attempt has no current question".into()))?;
        if !self.answers_map().contains_key(&current.id) {
            return Err(Error::BadRequest(
                "Answer the current question before moving on".into(),
            ));
        }
        self.current_question += 1;
        Ok(())
    }

    /// Move back one question. Always permitted while in progress.
    pub fn retreat(&mut self) -> Result<()> {
        self.ensure_in_progress()?;
        if self.current_question > 0 {
            self.current_question -= 1;
        }
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.status == AttemptStatus::InProgress && self.all_answered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn two_question_attempt() -> QuizAttempt {
        let questions = vec![
            QuizQuestion {
                id: "1".into(),
                question: "What is 2 + 3?".into(),
                options: vec!["4".into(), "5".into(), "6".into(), "7".into()],
                correct_answer: "5".into(),
                explanation: None,
            },
            QuizQuestion {
                id: "2".into(),
                question: "What is 9 - 4?".into(),
                options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
                correct_answer: "5".into(),
                explanation: None,
            },
        ];
        let now = Utc::now();
        QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            questions_snapshot: serde_json::to_value(questions).unwrap(),
            answers: serde_json::json!({}),
            current_question: 0,
            status: AttemptStatus::InProgress,
            started_at: now,
            expires_at: now + Duration::minutes(10),
            completed_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    #[test]
    fn advance_is_blocked_until_current_question_is_answered() {
        let mut attempt = two_question_attempt();
        let err = attempt.advance().unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert_eq!(attempt.current_question, 0);

        attempt.record_answer("1", "5").unwrap();
        attempt.advance().unwrap();
        assert_eq!(attempt.current_question, 1);
    }

    #[test]
    fn retreat_is_always_permitted() {
        let mut attempt = two_question_attempt();
        attempt.retreat().unwrap();
        assert_eq!(attempt.current_question, 0);

        attempt.record_answer("1", "5").unwrap();
        attempt.advance().unwrap();
        attempt.retreat().unwrap();
        assert_eq!(attempt.current_question, 0);
    }

    #[test]
    fn answers_overwrite_with_last_write_wins() {
        let mut attempt = two_question_attempt();
        attempt.record_answer("1", "4").unwrap();
        attempt.record_answer("1", "5").unwrap();
        let map = attempt.answers_map();
        assert_eq!(map.get("1").map(String::as_str), Some("5"));
        assert_eq!(attempt.answered_count(), 1);
    }

    #[test]
    fn recording_an_unknown_question_is_rejected() {
        let mut attempt = two_question_attempt();
        let err = attempt.record_answer("99", "5").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn submit_readiness_requires_every_question_answered() {
        let mut attempt = two_question_attempt();
        assert!(!attempt.can_submit());
        attempt.record_answer("1", "5").unwrap();
        assert!(!attempt.can_submit());
        attempt.record_answer("2", "5").unwrap();
        assert!(attempt.can_submit());
    }

    #[test]
    fn expiry_is_observed_from_the_deadline_onward() {
        let attempt = two_question_attempt();
        assert!(!attempt.is_expired(attempt.started_at));
        assert!(attempt.is_expired(attempt.expires_at));
        assert_eq!(attempt.remaining_seconds(attempt.expires_at), 0);
    }

    #[test]
    fn completed_attempts_reject_further_mutation() {
        let mut attempt = two_question_attempt();
        attempt.status = AttemptStatus::Completed;
        assert!(matches!(
            attempt.record_answer("1", "5").unwrap_err(),
            Error::Conflict(_)
        ));
        assert!(matches!(attempt.advance().unwrap_err(), Error::Conflict(_)));
    }

    #[test]
    fn elapsed_time_is_capped_at_the_deadline() {
        let attempt = two_question_attempt();
        let past_deadline = attempt.expires_at + Duration::minutes(5);
        assert_eq!(attempt.elapsed_seconds(past_deadline), 600);
    }
}
