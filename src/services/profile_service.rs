use crate::catalog;
use crate::database::local_store::{LocalStore, PROFILE_KEY};
use crate::dto::auth_dto::RegisterRequest;
use crate::dto::profile_dto::UpdateProfileRequest;
use crate::error::{Error, Result};
use crate::middleware::auth::SessionContext;
use crate::models::profile::{Profile, UserRole};
use crate::utils::crypto::{hash_password, verify_password};
use sqlx::PgPool;
use uuid::Uuid;

/// Availability and subject lists behave as sets: first occurrence wins,
/// order preserved.
pub fn dedupe_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn validate_subjects(subjects: &[String]) -> Result<()> {
    for subject in subjects {
        if !catalog::is_known_subject(subject) {
            return Err(Error::BadRequest(format!("Unknown subject: {}", subject)));
        }
    }
    Ok(())
}

fn validate_slots(slots: &[String]) -> Result<()> {
    for slot in slots {
        if !catalog::is_known_slot(slot) {
            return Err(Error::BadRequest(format!(
                "Unknown availability slot: {}",
                slot
            )));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
    local: LocalStore,
}

impl ProfileService {
    pub fn new(pool: PgPool, local: LocalStore) -> Self {
        Self { pool, local }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Profile> {
        let subjects = dedupe_preserving_order(req.subjects.unwrap_or_default());
        let availability = dedupe_preserving_order(req.availability.unwrap_or_default());
        validate_subjects(&subjects)?;
        validate_slots(&availability)?;

        if req.role == UserRole::Learner && req.hourly_rate.is_some() {
            return Err(Error::BadRequest(
                "Hourly rate applies to tutors only".to_string(),
            ));
        }

        let existing = sqlx::query(r#"SELECT id FROM profiles WHERE email = $1"#)
            .bind(&req.email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(Error::BadRequest(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&req.password)?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (email, password_hash, role, subjects, availability, bio, hourly_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, password_hash, role, subjects, availability, bio, hourly_rate,
                      created_at, updated_at
            "#,
        )
        .bind(&req.email)
        .bind(&password_hash)
        .bind(req.role)
        .bind(&subjects)
        .bind(&availability)
        .bind(&req.bio)
        .bind(req.hourly_rate)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(profile_id = %profile.id, role = ?profile.role, "Profile registered");
        Ok(profile)
    }

    /// Verify credentials and hydrate the session snapshot. This is the one
    /// place a "current profile" comes into existence.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, password_hash, role, subjects, availability, bio, hourly_rate,
                   created_at, updated_at
            FROM profiles
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(password, &profile.password_hash)? {
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }

        if let Err(e) = self.local.put(PROFILE_KEY, &profile).await {
            tracing::warn!(error = ?e, "Failed to snapshot session profile");
        }

        Ok(profile)
    }

    /// Teardown counterpart of `authenticate`.
    pub async fn clear_session_snapshot(&self) -> Result<()> {
        self.local.remove(PROFILE_KEY).await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, password_hash, role, subjects, availability, bio, hourly_rate,
                   created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn me(&self, ctx: SessionContext) -> Result<Profile> {
        self.find(ctx.user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Profile not found".to_string()))
    }

    pub async fn update(&self, ctx: SessionContext, req: UpdateProfileRequest) -> Result<Profile> {
        let current = self.me(ctx).await?;

        let subjects = match req.subjects {
            Some(subjects) => {
                let subjects = dedupe_preserving_order(subjects);
                validate_subjects(&subjects)?;
                subjects
            }
            None => current.subjects,
        };
        let availability = match req.availability {
            Some(slots) => {
                let slots = dedupe_preserving_order(slots);
                validate_slots(&slots)?;
                slots
            }
            None => current.availability,
        };

        let hourly_rate = match req.hourly_rate {
            Some(rate) => {
                if current.role != UserRole::Tutor {
                    return Err(Error::BadRequest(
                        "Hourly rate applies to tutors only".to_string(),
                    ));
                }
                Some(rate)
            }
            None => current.hourly_rate,
        };
        let bio = req.bio.or(current.bio);

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET subjects = $1, availability = $2, bio = $3, hourly_rate = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, email, password_hash, role, subjects, availability, bio, hourly_rate,
                      created_at, updated_at
            "#,
        )
        .bind(&subjects)
        .bind(&availability)
        .bind(&bio)
        .bind(hourly_rate)
        .bind(ctx.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_slots_are_suppressed_keeping_first_occurrence() {
        let slots = vec![
            "Monday 9:00 AM".to_string(),
            "Tuesday 2:00 PM".to_string(),
            "Monday 9:00 AM".to_string(),
        ];
        assert_eq!(
            dedupe_preserving_order(slots),
            vec!["Monday 9:00 AM".to_string(), "Tuesday 2:00 PM".to_string()]
        );
    }

    #[test]
    fn unknown_subjects_and_slots_are_rejected() {
        assert!(validate_subjects(&["Mathematics".to_string()]).is_ok());
        assert!(validate_subjects(&["Alchemy".to_string()]).is_err());
        assert!(validate_slots(&["Monday 9:00 AM".to_string()]).is_ok());
        assert!(validate_slots(&["Sunday 3:00 AM".to_string()]).is_err());
    }
}
