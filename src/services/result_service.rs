use crate::database::local_store::{LocalStore, RESULTS_KEY};
use crate::error::Result;
use crate::models::quiz_result::QuizResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Key under which fallback writes are journaled, so a fork between the
/// primary and the local history is detectable instead of silent.
pub const FALLBACK_AUDIT_KEY: &str = "fallback_audit";

/// Outcome of flipping `reward_claimed` on a stored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimFlip {
    Flipped,
    AlreadyClaimed,
    Missing,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn insert(&self, result: &QuizResult) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<QuizResult>>;
    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<QuizResult>>;
    async fn mark_claimed(&self, id: Uuid) -> Result<ClaimFlip>;
}

pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn insert(&self, result: &QuizResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quiz_results (id, user_id, quiz_id, score, total_questions,
                                      time_taken_seconds, completed, reward_claimed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(result.id)
        .bind(result.user_id)
        .bind(result.quiz_id)
        .bind(result.score)
        .bind(result.total_questions)
        .bind(result.time_taken_seconds)
        .bind(result.completed)
        .bind(result.reward_claimed)
        .bind(result.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<QuizResult>> {
        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT id, user_id, quiz_id, score, total_questions, time_taken_seconds,
                   completed, reward_claimed, created_at
            FROM quiz_results
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(result)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<QuizResult>> {
        let results = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT id, user_id, quiz_id, score, total_questions, time_taken_seconds,
                   completed, reward_claimed, created_at
            FROM quiz_results
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    async fn mark_claimed(&self, id: Uuid) -> Result<ClaimFlip> {
        let updated = sqlx::query(
            r#"UPDATE quiz_results SET reward_claimed = TRUE WHERE id = $1 AND reward_claimed = FALSE"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() > 0 {
            return Ok(ClaimFlip::Flipped);
        }
        match self.get(id).await? {
            Some(_) => Ok(ClaimFlip::AlreadyClaimed),
            None => Ok(ClaimFlip::Missing),
        }
    }
}

/// Local JSON-file rendition of the result history, one flat list under a
/// fixed key.
#[derive(Clone)]
pub struct LocalResultStore {
    store: LocalStore,
}

impl LocalResultStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResultStore for LocalResultStore {
    async fn insert(&self, result: &QuizResult) -> Result<()> {
        let result = result.clone();
        self.store
            .update(RESULTS_KEY, Vec::new(), move |mut list: Vec<QuizResult>| {
                list.push(result);
                list
            })
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<QuizResult>> {
        let list: Vec<QuizResult> = self.store.get(RESULTS_KEY).await?.unwrap_or_default();
        Ok(list.into_iter().find(|r| r.id == id))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<QuizResult>> {
        let list: Vec<QuizResult> = self.store.get(RESULTS_KEY).await?.unwrap_or_default();
        let mut mine: Vec<QuizResult> = list.into_iter().filter(|r| r.user_id == user_id).collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn mark_claimed(&self, id: Uuid) -> Result<ClaimFlip> {
        let mut flip = ClaimFlip::Missing;
        self.store
            .update(RESULTS_KEY, Vec::new(), |mut list: Vec<QuizResult>| {
                if let Some(found) = list.iter_mut().find(|r| r.id == id) {
                    flip = if found.reward_claimed {
                        ClaimFlip::AlreadyClaimed
                    } else {
                        found.reward_claimed = true;
                        ClaimFlip::Flipped
                    };
                }
                list
            })
            .await?;
        Ok(flip)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackAuditEntry {
    pub result_id: Uuid,
    pub action: String,
    pub recorded_at: DateTime<Utc>,
}

/// Result persistence with a declared primary and a local fallback. A primary
/// failure substitutes the fallback exactly once per call, never retries, and
/// journals the divergence.
#[derive(Clone)]
pub struct ResultService {
    primary: Arc<dyn ResultStore>,
    fallback: LocalResultStore,
    journal: LocalStore,
}

impl ResultService {
    pub fn new(primary: Arc<dyn ResultStore>, local: LocalStore) -> Self {
        Self {
            primary,
            fallback: LocalResultStore::new(local.clone()),
            journal: local,
        }
    }

    /// Persist a completed attempt's result. The caller always gets the
    /// result back, whichever store ended up holding it.
    pub async fn save(&self, result: QuizResult) -> Result<QuizResult> {
        match self.primary.insert(&result).await {
            Ok(()) => Ok(result),
            Err(e) => {
                tracing::warn!(error = ?e, result_id = %result.id, "Primary result store failed, writing to local fallback");
                self.fallback.insert(&result).await?;
                self.journal_divergence(result.id, "save_result").await;
                Ok(result)
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<QuizResult>> {
        match self.primary.get(id).await {
            Ok(Some(result)) => Ok(Some(result)),
            // The result may only exist locally after an earlier fallback.
            Ok(None) => self.fallback.get(id).await,
            Err(e) => {
                tracing::warn!(error = ?e, result_id = %id, "Primary result store failed, reading local fallback");
                self.fallback.get(id).await
            }
        }
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<QuizResult>> {
        match self.primary.list_for_user(user_id).await {
            Ok(results) => Ok(results),
            Err(e) => {
                tracing::warn!(error = ?e, %user_id, "Primary result store failed, reading local history");
                self.fallback.list_for_user(user_id).await
            }
        }
    }

    pub async fn mark_claimed(&self, id: Uuid) -> Result<ClaimFlip> {
        match self.primary.mark_claimed(id).await {
            Ok(ClaimFlip::Missing) => self.fallback.mark_claimed(id).await,
            Ok(flip) => Ok(flip),
            Err(e) => {
                tracing::warn!(error = ?e, result_id = %id, "Primary result store failed, flipping claim in local fallback");
                let flip = self.fallback.mark_claimed(id).await?;
                if flip == ClaimFlip::Flipped {
                    self.journal_divergence(id, "claim_reward").await;
                }
                Ok(flip)
            }
        }
    }

    async fn journal_divergence(&self, result_id: Uuid, action: &str) {
        let entry = FallbackAuditEntry {
            result_id,
            action: action.to_string(),
            recorded_at: Utc::now(),
        };
        let outcome = self
            .journal
            .update(
                FALLBACK_AUDIT_KEY,
                Vec::new(),
                move |mut entries: Vec<FallbackAuditEntry>| {
                    entries.push(entry);
                    entries
                },
            )
            .await;
        if let Err(e) = outcome {
            tracing::warn!(error = ?e, "Failed to journal fallback divergence");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn temp_local() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("tutorlink_results_{}", Uuid::new_v4()));
        LocalStore::new(dir)
    }

    fn sample_result() -> QuizResult {
        QuizResult {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            score: 80,
            total_questions: 5,
            time_taken_seconds: 120,
            completed: true,
            reward_claimed: false,
            created_at: Utc::now(),
        }
    }

    fn failing_primary() -> MockResultStore {
        let mut primary = MockResultStore::new();
        primary
            .expect_insert()
            .returning(|_| Err(Error::Internal("store down".into())));
        primary
            .expect_get()
            .returning(|_| Err(Error::Internal("store down".into())));
        primary
            .expect_list_for_user()
            .returning(|_| Err(Error::Internal("store down".into())));
        primary
            .expect_mark_claimed()
            .returning(|_| Err(Error::Internal("store down".into())));
        primary
    }

    #[tokio::test]
    async fn save_falls_back_locally_and_journals_the_divergence() {
        let local = temp_local();
        let service = ResultService::new(Arc::new(failing_primary()), local.clone());
        let result = sample_result();

        let saved = service.save(result.clone()).await.unwrap();
        assert_eq!(saved.id, result.id);

        let held: Vec<QuizResult> = local.get(RESULTS_KEY).await.unwrap().unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].id, result.id);

        let journal: Vec<FallbackAuditEntry> =
            local.get(FALLBACK_AUDIT_KEY).await.unwrap().unwrap();
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].action, "save_result");
        assert_eq!(journal[0].result_id, result.id);
    }

    #[tokio::test]
    async fn save_with_healthy_primary_leaves_the_fallback_untouched() {
        let local = temp_local();
        let mut primary = MockResultStore::new();
        primary.expect_insert().times(1).returning(|_| Ok(()));
        let service = ResultService::new(Arc::new(primary), local.clone());

        service.save(sample_result()).await.unwrap();

        let held: Option<Vec<QuizResult>> = local.get(RESULTS_KEY).await.unwrap();
        assert!(held.is_none());
    }

    #[tokio::test]
    async fn history_reads_the_fallback_when_the_primary_is_down() {
        let local = temp_local();
        let service = ResultService::new(Arc::new(failing_primary()), local.clone());
        let result = sample_result();
        service.save(result.clone()).await.unwrap();

        let history = service.history(result.user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, result.id);
    }

    #[tokio::test]
    async fn claim_flip_is_idempotent_in_the_fallback_store() {
        let local = temp_local();
        let service = ResultService::new(Arc::new(failing_primary()), local);
        let result = sample_result();
        service.save(result.clone()).await.unwrap();

        assert_eq!(
            service.mark_claimed(result.id).await.unwrap(),
            ClaimFlip::Flipped
        );
        assert_eq!(
            service.mark_claimed(result.id).await.unwrap(),
            ClaimFlip::AlreadyClaimed
        );
    }

    #[tokio::test]
    async fn claim_on_result_missing_from_primary_tries_the_fallback() {
        let local = temp_local();
        let mut primary = MockResultStore::new();
        primary.expect_insert().returning(|_| Err(Error::Internal("down".into())));
        primary.expect_mark_claimed().returning(|_| Ok(ClaimFlip::Missing));
        let service = ResultService::new(Arc::new(primary), local);

        let result = sample_result();
        service.save(result.clone()).await.unwrap();
        assert_eq!(
            service.mark_claimed(result.id).await.unwrap(),
            ClaimFlip::Flipped
        );
    }

    #[tokio::test]
    async fn unknown_result_is_missing_everywhere() {
        let local = temp_local();
        let service = ResultService::new(Arc::new(failing_primary()), local);
        assert_eq!(
            service.mark_claimed(Uuid::new_v4()).await.unwrap(),
            ClaimFlip::Missing
        );
        assert!(service.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
