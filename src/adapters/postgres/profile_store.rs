//! PostgreSQL implementation of ProfileStore.
//!
//! Profiles live in a single table keyed by (owner_id, mode), with the
//! preference and constraint lists as JSON text columns. Seeding on
//! first access upserts with last-writer-wins, which is the tolerated
//! outcome when two callers race on the same (user, mode).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::rows;
use crate::domain::foundation::{DomainError, ErrorCode, Mode, Timestamp, UserId};
use crate::domain::profile::Profile;
use crate::ports::ProfileStore;

/// PostgreSQL implementation of ProfileStore.
#[derive(Clone)]
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    /// Creates a new PostgresProfileStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert(&self, profile: &Profile) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (owner_id, mode, preferences, constraints, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (owner_id, mode) DO UPDATE SET
                preferences = EXCLUDED.preferences,
                constraints = EXCLUDED.constraints,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.owner.as_str())
        .bind(profile.mode.as_str())
        .bind(rows::preferences_to_json(&profile.preferences)?)
        .bind(rows::constraints_to_json(&profile.constraints)?)
        .bind(profile.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to upsert profile: {}", e),
            )
        })?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn find(&self, owner: &UserId, mode: Mode) -> Result<Option<Profile>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT owner_id, mode, preferences, constraints, updated_at
            FROM profiles
            WHERE owner_id = $1 AND mode = $2
            "#,
        )
        .bind(owner.as_str())
        .bind(mode.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch profile: {}", e),
            )
        })?;

        row.map(|r| row_to_profile(&r)).transpose()
    }

    async fn get_or_create(&self, owner: &UserId, mode: Mode) -> Result<Profile, DomainError> {
        if let Some(existing) = self.find(owner, mode).await? {
            return Ok(existing);
        }

        let profile = Profile::seeded(owner.clone(), mode);
        self.upsert(&profile).await?;
        Ok(profile)
    }

    async fn save(&self, profile: &Profile) -> Result<(), DomainError> {
        self.upsert(profile).await
    }
}

fn row_to_profile(row: &sqlx::postgres::PgRow) -> Result<Profile, DomainError> {
    let updated_at: DateTime<Utc> = row.get("updated_at");

    Ok(Profile {
        owner: UserId::new(row.get::<String, _>("owner_id"))?,
        mode: row.get::<String, _>("mode").parse()?,
        preferences: rows::preferences_from_json(&row.get::<String, _>("preferences"))?,
        constraints: rows::constraints_from_json(&row.get::<String, _>("constraints"))?,
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
