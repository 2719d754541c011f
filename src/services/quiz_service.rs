use crate::catalog;
use crate::error::{Error, Result};
use crate::models::profile::Profile;
use crate::models::question::QuizQuestion;
use crate::models::quiz::{Difficulty, Quiz, QuizOrigin};
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
    /// Session-scoped cache of generated quizzes, keyed by quiz id. A repeat
    /// visit within the process lifetime never regenerates.
    generated_cache: Arc<Mutex<HashMap<Uuid, Quiz>>>,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            generated_cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Quizzes matching the user's subject interests. Store first, then the
    /// bundled catalog filtered the same way, then a starter subset.
    pub async fn quizzes_for_user(&self, profile: Option<&Profile>) -> Vec<Quiz> {
        let subjects: Vec<String> = profile.map(|p| p.subjects.clone()).unwrap_or_default();
        if subjects.is_empty() {
            return catalog::sample_quizzes();
        }

        match self.stored_quizzes_for_subjects(&subjects).await {
            Ok(stored) if !stored.is_empty() => stored,
            Ok(_) => {
                let filtered = filter_catalog(&subjects);
                if filtered.is_empty() {
                    catalog::sample_quizzes().into_iter().take(3).collect()
                } else {
                    filtered
                }
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Quiz store unavailable, serving bundled catalog");
                catalog::sample_quizzes()
            }
        }
    }

    async fn stored_quizzes_for_subjects(&self, subjects: &[String]) -> Result<Vec<Quiz>> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, subject, questions, difficulty, time_limit_minutes, origin,
                   created_by, created_at
            FROM quizzes
            WHERE subject = ANY($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(subjects)
        .fetch_all(&self.pool)
        .await?;
        Ok(quizzes)
    }

    /// Resolve a quiz by id: session cache, then the store, then the bundled
    /// catalog. Unresolvable ids are a NotFound for the caller to redirect on.
    pub async fn resolve(&self, quiz_id: Uuid) -> Result<Quiz> {
        if let Some(quiz) = self.cached(quiz_id) {
            return Ok(quiz);
        }

        match self.stored_quiz(quiz_id).await {
            Ok(Some(quiz)) => return Ok(quiz),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = ?e, %quiz_id, "Quiz store unavailable, checking bundled catalog");
            }
        }

        catalog::sample_quizzes()
            .into_iter()
            .find(|q| q.id == quiz_id)
            .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))
    }

    async fn stored_quiz(&self, quiz_id: Uuid) -> Result<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, subject, questions, difficulty, time_limit_minutes, origin,
                   created_by, created_at
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    /// Build a generated quiz, cache it for the session, and persist it
    /// best-effort so other sessions can pick it up later.
    pub async fn create_generated(
        &self,
        subject: &str,
        difficulty: Difficulty,
        questions: Vec<QuizQuestion>,
        created_by: Option<Uuid>,
    ) -> Result<Quiz> {
        if questions.is_empty() {
            return Err(Error::BadRequest(
                "A quiz needs at least one question".to_string(),
            ));
        }

        let quiz = Quiz {
            id: Uuid::new_v4(),
            title: format!("AI-Generated {} Quiz", subject),
            subject: subject.to_string(),
            questions: serde_json::to_value(&questions)?,
            difficulty,
            time_limit_minutes: difficulty.default_time_limit(),
            origin: QuizOrigin::Generated,
            created_by,
            created_at: Some(Utc::now()),
        };

        self.cache_quiz(quiz.clone());

        if let Err(e) = self.persist(&quiz).await {
            tracing::warn!(error = ?e, quiz_id = %quiz.id, "Could not persist generated quiz, keeping it session-local");
        }

        Ok(quiz)
    }

    async fn persist(&self, quiz: &Quiz) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quizzes (id, title, subject, questions, difficulty, time_limit_minutes,
                                 origin, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(quiz.id)
        .bind(&quiz.title)
        .bind(&quiz.subject)
        .bind(&quiz.questions)
        .bind(quiz.difficulty)
        .bind(quiz.time_limit_minutes)
        .bind(quiz.origin)
        .bind(quiz.created_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub fn cache_quiz(&self, quiz: Quiz) {
        let mut cache = self
            .generated_cache
            .lock()
            .expect("generated quiz cache mutex poisoned");
        cache.insert(quiz.id, quiz);
    }

    pub fn cached(&self, quiz_id: Uuid) -> Option<Quiz> {
        let cache = self
            .generated_cache
            .lock()
            .expect("generated quiz cache mutex poisoned");
        cache.get(&quiz_id).cloned()
    }
}

/// Bundled catalog filtered by subject interest.
pub fn filter_catalog(subjects: &[String]) -> Vec<Quiz> {
    catalog::sample_quizzes()
        .into_iter()
        .filter(|q| subjects.iter().any(|s| s == &q.subject))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_filter_matches_subject_interests() {
        let filtered = filter_catalog(&["Physics".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Introduction to Physics");
    }

    #[test]
    fn catalog_filter_with_unknown_subject_is_empty() {
        assert!(filter_catalog(&["Underwater Basket Weaving".to_string()]).is_empty());
    }
}
