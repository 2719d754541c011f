use crate::error::{Error, Result};
use crate::middleware::auth::SessionContext;
use crate::services::audit_service::AuditService;
use crate::services::result_service::{ClaimFlip, ResultService};
use crate::services::scoring;
use crate::utils::token::generate_opaque_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Simulated settlement time of the token transfer.
const SETTLEMENT_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardTransaction {
    pub id: String,
    /// Token amount, one token per ten score points.
    pub amount: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimOutcome {
    pub success: bool,
    pub already_claimed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<RewardTransaction>,
}

#[derive(Clone)]
pub struct RewardService {
    results: ResultService,
    audit: AuditService,
}

impl RewardService {
    pub fn new(results: ResultService, audit: AuditService) -> Self {
        Self { results, audit }
    }

    /// Claim the reward for a result. Re-validates eligibility, flips the
    /// claimed flag exactly once, and returns the already-claimed state as a
    /// no-op on any repeat call — no second transaction is ever produced.
    pub async fn claim(&self, ctx: SessionContext, result_id: Uuid) -> Result<ClaimOutcome> {
        let result = self
            .results
            .get(result_id)
            .await?
            .filter(|r| r.user_id == ctx.user_id)
            .ok_or_else(|| Error::NotFound("Quiz result not found".to_string()))?;

        if !result.completed {
            return Err(Error::BadRequest(
                "Only completed attempts can claim a reward".to_string(),
            ));
        }
        if result.reward_claimed {
            return Ok(already_claimed());
        }
        if !scoring::is_eligible(result.score) {
            return Err(Error::BadRequest(format!(
                "Score is too low to claim reward (minimum {}%)",
                scoring::REWARD_THRESHOLD
            )));
        }

        tokio::time::sleep(SETTLEMENT_DELAY).await;

        match self.results.mark_claimed(result_id).await? {
            ClaimFlip::Flipped => {
                let transaction = RewardTransaction {
                    id: format!("tx-{}", generate_opaque_id(16)),
                    amount: ((result.score as f64) / 10.0).round() as i32,
                    timestamp: Utc::now(),
                };
                self.audit
                    .log_best_effort(
                        Some(ctx.user_id),
                        "claim_reward",
                        "quiz_result",
                        result_id,
                        Some(serde_json::json!({
                            "score": result.score,
                            "amount": transaction.amount,
                            "transaction_id": transaction.id,
                        })),
                    )
                    .await;
                tracing::info!(%result_id, amount = transaction.amount, "Reward claimed");
                Ok(ClaimOutcome {
                    success: true,
                    already_claimed: false,
                    message: "Blockchain reward claimed successfully".to_string(),
                    transaction: Some(transaction),
                })
            }
            // Lost a race with another claim on the same result.
            ClaimFlip::AlreadyClaimed => Ok(already_claimed()),
            ClaimFlip::Missing => Err(Error::NotFound("Quiz result not found".to_string())),
        }
    }
}

fn already_claimed() -> ClaimOutcome {
    ClaimOutcome {
        success: true,
        already_claimed: true,
        message: "Reward has already been claimed".to_string(),
        transaction: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::local_store::LocalStore;
    use crate::models::profile::UserRole;
    use crate::models::quiz_result::QuizResult;
    use crate::services::result_service::{MockResultStore, ResultService};
    use std::sync::Arc;

    fn service_with_dead_primary() -> (RewardService, ResultService) {
        let dir = std::env::temp_dir().join(format!("tutorlink_rewards_{}", Uuid::new_v4()));
        let local = LocalStore::new(dir);

        let mut primary = MockResultStore::new();
        primary
            .expect_insert()
            .returning(|_| Err(Error::Internal("store down".into())));
        primary
            .expect_get()
            .returning(|_| Err(Error::Internal("store down".into())));
        primary
            .expect_mark_claimed()
            .returning(|_| Err(Error::Internal("store down".into())));
        primary
            .expect_list_for_user()
            .returning(|_| Err(Error::Internal("store down".into())));

        let results = ResultService::new(Arc::new(primary), local);
        // Audit writes are best-effort; a lazily-connected pool that never
        // reaches a server exercises exactly that path.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/unreachable")
            .expect("lazy pool");
        let audit = AuditService::new(pool);
        (RewardService::new(results.clone(), audit), results)
    }

    fn ctx_for(user_id: Uuid) -> SessionContext {
        SessionContext {
            user_id,
            role: UserRole::Learner,
        }
    }

    fn result_with_score(user_id: Uuid, score: i32) -> QuizResult {
        QuizResult {
            id: Uuid::new_v4(),
            user_id,
            quiz_id: Uuid::new_v4(),
            score,
            total_questions: 5,
            time_taken_seconds: 90,
            completed: true,
            reward_claimed: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn claim_succeeds_once_then_becomes_a_no_op() {
        let (rewards, results) = service_with_dead_primary();
        let user_id = Uuid::new_v4();
        let result = result_with_score(user_id, 80);
        results.save(result.clone()).await.unwrap();

        let first = rewards.claim(ctx_for(user_id), result.id).await.unwrap();
        assert!(first.success);
        assert!(!first.already_claimed);
        let tx = first.transaction.expect("first claim carries a transaction");
        assert_eq!(tx.amount, 8);
        assert!(tx.id.starts_with("tx-"));

        let second = rewards.claim(ctx_for(user_id), result.id).await.unwrap();
        assert!(second.success);
        assert!(second.already_claimed);
        assert!(second.transaction.is_none());
    }

    #[tokio::test]
    async fn claim_below_threshold_is_rejected() {
        let (rewards, results) = service_with_dead_primary();
        let user_id = Uuid::new_v4();
        let result = result_with_score(user_id, 69);
        results.save(result.clone()).await.unwrap();

        let err = rewards.claim(ctx_for(user_id), result.id).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn claim_on_someone_elses_result_is_not_found() {
        let (rewards, results) = service_with_dead_primary();
        let owner = Uuid::new_v4();
        let result = result_with_score(owner, 90);
        results.save(result.clone()).await.unwrap();

        let err = rewards
            .claim(ctx_for(Uuid::new_v4()), result.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn claim_on_unknown_result_is_not_found() {
        let (rewards, _) = service_with_dead_primary();
        let err = rewards
            .claim(ctx_for(Uuid::new_v4()), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
