//! Profile store — resolves a user's career profile and target career.
//!
//! Behind a trait so the pipeline and its tests never depend on Postgres
//! directly. Missing rows are reported as `None`; the pipeline turns them
//! into `ProfileNotFound` / `CareerNotFound`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;

/// A user's career-profile attributes, as captured during onboarding.
/// Every field except the key is optional — an incomplete profile degrades
/// prompt quality, it never blocks generation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareerProfile {
    pub user_id: Uuid,
    pub education_level: Option<String>,
    pub field_of_study: Option<String>,
    pub interests: Option<String>,
    pub skills: Option<String>,
    pub goals: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl CareerProfile {
    /// An empty profile for the given user. Test constructor — production
    /// profiles always come out of the store.
    #[cfg(test)]
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            education_level: None,
            field_of_study: None,
            interests: None,
            skills: None,
            goals: None,
            updated_at: Utc::now(),
        }
    }
}

/// Lookup interface consumed by the roadmap pipeline.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn career_profile(&self, user_id: Uuid) -> Result<Option<CareerProfile>, AppError>;
    async fn target_career(&self, user_id: Uuid) -> Result<Option<String>, AppError>;
}

/// Postgres-backed profile store used in production.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn career_profile(&self, user_id: Uuid) -> Result<Option<CareerProfile>, AppError> {
        let profile = sqlx::query_as::<_, CareerProfile>(
            "SELECT user_id, education_level, field_of_study, interests, skills, goals, updated_at \
             FROM career_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn target_career(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        let career = sqlx::query_scalar::<_, String>(
            "SELECT target_career FROM career_selections WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        // An empty selection row is as good as no selection
        Ok(career.filter(|c| !c.trim().is_empty()))
    }
}
