use crate::error::{Error, Result};
use crate::middleware::auth::SessionContext;
use crate::models::attempt::{AttemptStatus, QuizAttempt};
use crate::models::quiz::Quiz;
use crate::models::quiz_result::QuizResult;
use crate::services::audit_service::AuditService;
use crate::services::result_service::ResultService;
use crate::services::scoring;
use chrono::{Duration, Utc};
use uuid::Uuid;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AttemptService {
    pool: PgPool,
    results: ResultService,
    audit: AuditService,
}

impl AttemptService {
    pub fn new(pool: PgPool, results: ResultService, audit: AuditService) -> Self {
        Self {
            pool,
            results,
            audit,
        }
    }

    /// Open an attempt against a resolved quiz. Snapshots the questions and
    /// starts the countdown.
    pub async fn start(&self, ctx: SessionContext, quiz: &Quiz) -> Result<QuizAttempt> {
        if quiz.question_count() == 0 {
            return Err(Error::BadRequest(
                "This quiz has no questions to attempt".to_string(),
            ));
        }

        let now = Utc::now();
        let expires_at = now + Duration::minutes(quiz.time_limit_minutes as i64);

        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (quiz_id, user_id, questions_snapshot, answers,
                                       current_question, status, started_at, expires_at)
            VALUES ($1, $2, $3, $4, 0, $5, $6, $7)
            RETURNING id, quiz_id, user_id, questions_snapshot, answers, current_question,
                      status, started_at, expires_at, completed_at, created_at, updated_at
            "#,
        )
        .bind(quiz.id)
        .bind(ctx.user_id)
        .bind(&quiz.questions)
        .bind(serde_json::json!({}))
        .bind(AttemptStatus::InProgress)
        .bind(now)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(attempt_id = %attempt.id, quiz_id = %quiz.id, "Attempt started");
        Ok(attempt)
    }

    pub async fn get(&self, ctx: SessionContext, attempt_id: Uuid) -> Result<QuizAttempt> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT id, quiz_id, user_id, questions_snapshot, answers, current_question,
                   status, started_at, expires_at, completed_at, created_at, updated_at
            FROM quiz_attempts
            WHERE id = $1
            "#,
        )
        .bind(attempt_id)
        .fetch_optional(&self.pool)
        .await?
        .filter(|a| a.user_id == ctx.user_id)
        .ok_or_else(|| Error::NotFound("Attempt not found".to_string()))?;
        Ok(attempt)
    }

    /// Record (or overwrite) an answer. A write landing after the deadline
    /// finalizes the attempt instead.
    pub async fn save_answer(
        &self,
        ctx: SessionContext,
        attempt_id: Uuid,
        question_id: &str,
        answer: &str,
    ) -> Result<QuizAttempt> {
        let mut attempt = self.get(ctx, attempt_id).await?;
        if attempt.is_expired(Utc::now()) {
            self.finalize_expired(&attempt).await?;
            return Err(Error::Conflict("Attempt has expired".to_string()));
        }

        attempt.record_answer(question_id, answer)?;

        sqlx::query(r#"UPDATE quiz_attempts SET answers = $1, updated_at = NOW() WHERE id = $2"#)
            .bind(&attempt.answers)
            .bind(attempt.id)
            .execute(&self.pool)
            .await?;

        Ok(attempt)
    }

    pub async fn advance(&self, ctx: SessionContext, attempt_id: Uuid) -> Result<QuizAttempt> {
        let mut attempt = self.get(ctx, attempt_id).await?;
        if attempt.is_expired(Utc::now()) {
            self.finalize_expired(&attempt).await?;
            return Err(Error::Conflict("Attempt has expired".to_string()));
        }
        attempt.advance()?;
        self.persist_position(&attempt).await?;
        Ok(attempt)
    }

    pub async fn retreat(&self, ctx: SessionContext, attempt_id: Uuid) -> Result<QuizAttempt> {
        let mut attempt = self.get(ctx, attempt_id).await?;
        if attempt.is_expired(Utc::now()) {
            self.finalize_expired(&attempt).await?;
            return Err(Error::Conflict("Attempt has expired".to_string()));
        }
        attempt.retreat()?;
        self.persist_position(&attempt).await?;
        Ok(attempt)
    }

    async fn persist_position(&self, attempt: &QuizAttempt) -> Result<()> {
        sqlx::query(
            r#"UPDATE quiz_attempts SET current_question = $1, updated_at = NOW() WHERE id = $2"#,
        )
        .bind(attempt.current_question)
        .bind(attempt.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Manual submission. Requires every question answered unless the
    /// deadline has already passed, in which case the attempt is finalized
    /// with whatever answers are present.
    pub async fn submit(
        &self,
        ctx: SessionContext,
        attempt_id: Uuid,
    ) -> Result<(QuizAttempt, QuizResult)> {
        let attempt = self.get(ctx, attempt_id).await?;
        match attempt.status {
            AttemptStatus::InProgress => {}
            _ => return Err(Error::Conflict("Attempt has already been submitted".to_string())),
        }

        let now = Utc::now();
        if attempt.is_expired(now) {
            return match self.finalize_expired(&attempt).await? {
                Some(done) => Ok(done),
                None => Err(Error::Conflict(
                    "Attempt has already been submitted".to_string(),
                )),
            };
        }

        if !attempt.all_answered() {
            let missing = attempt.total_questions() - attempt.answered_count();
            return Err(Error::BadRequest(format!(
                "You still have {} unanswered question(s)",
                missing
            )));
        }

        let score = scoring::score(&attempt.snapshot(), &attempt.answers_map())?;
        let time_taken = attempt.elapsed_seconds(now) as i32;

        // Whoever transitions the row first wins; the deadline sweeper and a
        // manual submit can never both produce a result.
        let claimed = sqlx::query(
            r#"
            UPDATE quiz_attempts
            SET status = $1, completed_at = $2, updated_at = $2
            WHERE id = $3 AND status = $4
            "#,
        )
        .bind(AttemptStatus::Completed)
        .bind(now)
        .bind(attempt.id)
        .bind(AttemptStatus::InProgress)
        .execute(&self.pool)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(Error::Conflict(
                "Attempt has already been submitted".to_string(),
            ));
        }

        let result = self
            .record_result(&attempt, score, time_taken, "submit_attempt")
            .await?;

        let mut finished = attempt;
        finished.status = AttemptStatus::Completed;
        finished.completed_at = Some(now);
        tracing::info!(attempt_id = %finished.id, score, "Attempt submitted");
        Ok((finished, result))
    }

    /// Force-submit an overdue attempt with the answers present at the
    /// deadline. Returns None when another caller finalized it first.
    pub async fn finalize_expired(
        &self,
        attempt: &QuizAttempt,
    ) -> Result<Option<(QuizAttempt, QuizResult)>> {
        let claimed = sqlx::query(
            r#"
            UPDATE quiz_attempts
            SET status = $1, completed_at = expires_at, updated_at = NOW()
            WHERE id = $2 AND status = $3
            "#,
        )
        .bind(AttemptStatus::Expired)
        .bind(attempt.id)
        .bind(AttemptStatus::InProgress)
        .execute(&self.pool)
        .await?;
        if claimed.rows_affected() == 0 {
            return Ok(None);
        }

        let score = scoring::score(&attempt.snapshot(), &attempt.answers_map())?;
        let time_taken = attempt.elapsed_seconds(attempt.expires_at) as i32;
        let result = self
            .record_result(attempt, score, time_taken, "attempt_expired")
            .await?;

        let mut finished = attempt.clone();
        finished.status = AttemptStatus::Expired;
        finished.completed_at = Some(attempt.expires_at);
        tracing::info!(attempt_id = %finished.id, score, "Attempt expired and auto-submitted");
        Ok(Some((finished, result)))
    }

    async fn record_result(
        &self,
        attempt: &QuizAttempt,
        score: i32,
        time_taken: i32,
        action: &str,
    ) -> Result<QuizResult> {
        let result = QuizResult {
            id: Uuid::new_v4(),
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            score,
            total_questions: attempt.total_questions() as i32,
            time_taken_seconds: time_taken,
            completed: true,
            reward_claimed: false,
            created_at: Utc::now(),
        };
        let result = self.results.save(result).await?;
        self.audit
            .log_best_effort(
                Some(attempt.user_id),
                action,
                "quiz_attempt",
                attempt.id,
                Some(serde_json::json!({
                    "result_id": result.id,
                    "score": score,
                    "answered": attempt.answered_count(),
                    "total": attempt.total_questions(),
                })),
            )
            .await;
        Ok(result)
    }

    /// One sweep of the deadline checker: finalize every overdue attempt.
    pub async fn expire_overdue(&self) -> Result<usize> {
        let overdue = sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT id, quiz_id, user_id, questions_snapshot, answers, current_question,
                   status, started_at, expires_at, completed_at, created_at, updated_at
            FROM quiz_attempts
            WHERE status = $1 AND expires_at <= NOW()
            "#,
        )
        .bind(AttemptStatus::InProgress)
        .fetch_all(&self.pool)
        .await?;

        let mut finalized = 0;
        for attempt in &overdue {
            match self.finalize_expired(attempt).await {
                Ok(Some(_)) => finalized += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = ?e, attempt_id = %attempt.id, "Failed to finalize overdue attempt");
                }
            }
        }
        Ok(finalized)
    }
}
