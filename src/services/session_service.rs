use crate::dto::booking_dto::BookSessionRequest;
use crate::error::{Error, Result};
use crate::middleware::auth::SessionContext;
use crate::models::profile::Profile;
use crate::models::session::{PaymentStatus, Session, SessionStatus};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Book a tutor for a subject and slot. The tutor must actually teach
    /// the subject and be free in the slot.
    pub async fn book(
        &self,
        ctx: SessionContext,
        tutor: &Profile,
        req: &BookSessionRequest,
    ) -> Result<Session> {
        if !tutor.is_tutor() {
            return Err(Error::BadRequest(
                "Sessions can only be booked with tutors".to_string(),
            ));
        }
        if tutor.id == ctx.user_id {
            return Err(Error::BadRequest(
                "You cannot book a session with yourself".to_string(),
            ));
        }
        if !tutor.teaches(&req.subject) {
            return Err(Error::BadRequest(format!(
                "This tutor does not teach {}",
                req.subject
            )));
        }
        if !tutor.available_at(&req.slot) {
            return Err(Error::BadRequest(format!(
                "This tutor is not available at {}",
                req.slot
            )));
        }

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (tutor_id, learner_id, subject, slot, status, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, tutor_id, learner_id, subject, slot, status, payment_status,
                      created_at, updated_at
            "#,
        )
        .bind(tutor.id)
        .bind(ctx.user_id)
        .bind(&req.subject)
        .bind(&req.slot)
        .bind(SessionStatus::Pending)
        .bind(PaymentStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(session_id = %session.id, tutor_id = %tutor.id, "Session booked");
        Ok(session)
    }

    pub async fn list_for_user(&self, ctx: SessionContext) -> Result<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, tutor_id, learner_id, subject, slot, status, payment_status,
                   created_at, updated_at
            FROM sessions
            WHERE learner_id = $1 OR tutor_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(ctx.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    pub async fn get(&self, ctx: SessionContext, session_id: Uuid) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, tutor_id, learner_id, subject, slot, status, payment_status,
                   created_at, updated_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .filter(|s| s.learner_id == ctx.user_id || s.tutor_id == ctx.user_id)
        .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;
        Ok(session)
    }

    /// Tutor accepts a pending booking.
    pub async fn confirm(&self, ctx: SessionContext, session_id: Uuid) -> Result<Session> {
        let session = self.get(ctx, session_id).await?;
        if session.tutor_id != ctx.user_id {
            return Err(Error::BadRequest(
                "Only the tutor can confirm a session".to_string(),
            ));
        }
        if session.status != SessionStatus::Pending {
            return Err(Error::Conflict(
                "Session cannot be confirmed from its current state".to_string(),
            ));
        }
        self.transition(session_id, SessionStatus::Confirmed, None).await
    }

    /// Completing a session settles its payment.
    pub async fn complete(&self, ctx: SessionContext, session_id: Uuid) -> Result<Session> {
        let session = self.get(ctx, session_id).await?;
        if session.status != SessionStatus::Confirmed {
            return Err(Error::Conflict(
                "Only confirmed sessions can be completed".to_string(),
            ));
        }
        self.transition(session_id, SessionStatus::Completed, Some(PaymentStatus::Paid))
            .await
    }

    pub async fn cancel(&self, ctx: SessionContext, session_id: Uuid) -> Result<Session> {
        let session = self.get(ctx, session_id).await?;
        match session.status {
            SessionStatus::Pending | SessionStatus::Confirmed => {}
            _ => {
                return Err(Error::Conflict(
                    "Session can no longer be cancelled".to_string(),
                ))
            }
        }
        self.transition(session_id, SessionStatus::Cancelled, None).await
    }

    async fn transition(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        payment: Option<PaymentStatus>,
    ) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET status = $1, payment_status = COALESCE($2, payment_status), updated_at = NOW()
            WHERE id = $3
            RETURNING id, tutor_id, learner_id, subject, slot, status, payment_status,
                      created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(payment)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }
}
