//! PostgreSQL implementation of ConstraintStore.
//!
//! Constraint sets and constraints live in separate tables joined by a
//! foreign key; constraints are always deleted before their owning set.
//! User scoping happens in SQL (`owner_id IS NULL OR owner_id = $1`);
//! applicability filtering reuses the same `ConstraintSet` logic as the
//! in-memory backend so both produce identical results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

use super::rows;
use crate::domain::foundation::{
    ConstraintId, ConstraintSetId, DomainError, ErrorCode, Mode, Persona, Timestamp, UserId,
};
use crate::domain::policy::{Applicability, Constraint, ConstraintSet, Severity};
use crate::ports::ConstraintStore;

/// PostgreSQL implementation of ConstraintStore.
#[derive(Clone)]
pub struct PostgresConstraintStore {
    pool: PgPool,
}

impl PostgresConstraintStore {
    /// Creates a new PostgresConstraintStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn constraints_for_sets(
        &self,
        set_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Constraint>>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, set_id, severity, active, description, params
            FROM constraints
            WHERE set_id = ANY($1)
            ORDER BY set_id, position
            "#,
        )
        .bind(set_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch constraints: {}", e),
            )
        })?;

        let mut by_set: HashMap<Uuid, Vec<Constraint>> = HashMap::new();
        for row in rows {
            let set_id: Uuid = row.get("set_id");
            by_set
                .entry(set_id)
                .or_default()
                .push(row_to_constraint(&row)?);
        }
        Ok(by_set)
    }
}

#[async_trait]
impl ConstraintStore for PostgresConstraintStore {
    async fn constraint_sets_for(
        &self,
        owner: Option<&UserId>,
        mode: Mode,
        persona: Option<Persona>,
    ) -> Result<Vec<ConstraintSet>, DomainError> {
        let base = r#"
            SELECT id, owner_id, name, priority, applies_to_modes, applies_to_personas, updated_at
            FROM constraint_sets
            "#;
        let rows = match owner {
            Some(owner) => {
                sqlx::query(&format!(
                    "{} WHERE owner_id IS NULL OR owner_id = $1 ORDER BY priority DESC, name",
                    base
                ))
                .bind(owner.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "{} WHERE owner_id IS NULL ORDER BY priority DESC, name",
                    base
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch constraint sets: {}", e),
            )
        })?;

        let mut sets = Vec::with_capacity(rows.len());
        for row in &rows {
            sets.push(row_to_set(row)?);
        }

        let ids: Vec<Uuid> = sets.iter().map(|s| *s.id.as_uuid()).collect();
        let mut by_set = if ids.is_empty() {
            HashMap::new()
        } else {
            self.constraints_for_sets(&ids).await?
        };
        for set in &mut sets {
            if let Some(constraints) = by_set.remove(set.id.as_uuid()) {
                set.constraints = constraints;
            }
        }

        Ok(sets
            .into_iter()
            .filter(|set| set.applies_to(mode, persona))
            .collect())
    }

    async fn save_set(&self, set: &ConstraintSet) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO constraint_sets (
                id, owner_id, name, priority, applies_to_modes, applies_to_personas, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                owner_id = EXCLUDED.owner_id,
                name = EXCLUDED.name,
                priority = EXCLUDED.priority,
                applies_to_modes = EXCLUDED.applies_to_modes,
                applies_to_personas = EXCLUDED.applies_to_personas,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(set.id.as_uuid())
        .bind(set.owner.as_ref().map(|o| o.as_str()))
        .bind(&set.name)
        .bind(set.priority)
        .bind(rows::modes_to_json(&set.applies_to.modes)?)
        .bind(rows::personas_to_json(&set.applies_to.personas)?)
        .bind(set.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to upsert constraint set: {}", e),
            )
        })?;

        // Child rows are rewritten wholesale; delete before re-insert.
        sqlx::query("DELETE FROM constraints WHERE set_id = $1")
            .bind(set.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to clear constraints: {}", e),
                )
            })?;

        for (position, constraint) in set.constraints.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO constraints (
                    id, set_id, position, severity, active, description, kind, params
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(constraint.id.as_str())
            .bind(set.id.as_uuid())
            .bind(position as i32)
            .bind(constraint.severity.as_str())
            .bind(constraint.active)
            .bind(&constraint.description)
            .bind(constraint.kind.name())
            .bind(rows::kind_to_json(&constraint.kind)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to insert constraint: {}", e),
                )
            })?;
        }

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit constraint set: {}", e),
            )
        })
    }

    async fn find_constraint(
        &self,
        id: &ConstraintId,
    ) -> Result<Option<Constraint>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, severity, active, description, params
            FROM constraints
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch constraint: {}", e),
            )
        })?;

        row.map(|r| row_to_constraint(&r)).transpose()
    }

    async fn update_constraint(&self, constraint: &Constraint) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE constraints SET
                severity = $2,
                active = $3,
                description = $4,
                kind = $5,
                params = $6
            WHERE id = $1
            "#,
        )
        .bind(constraint.id.as_str())
        .bind(constraint.severity.as_str())
        .bind(constraint.active)
        .bind(&constraint.description)
        .bind(constraint.kind.name())
        .bind(rows::kind_to_json(&constraint.kind)?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update constraint: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConstraintNotFound,
                format!("Constraint not found: {}", constraint.id),
            ));
        }

        Ok(())
    }

    async fn delete_set(&self, id: &ConstraintSetId) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })?;

        sqlx::query("DELETE FROM constraints WHERE set_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to delete constraints: {}", e),
                )
            })?;

        let result = sqlx::query("DELETE FROM constraint_sets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to delete constraint set: {}", e),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConstraintSetNotFound,
                format!("Constraint set not found: {}", id),
            ));
        }

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit delete: {}", e),
            )
        })
    }
}

fn row_to_set(row: &sqlx::postgres::PgRow) -> Result<ConstraintSet, DomainError> {
    let owner = row
        .get::<Option<String>, _>("owner_id")
        .map(UserId::new)
        .transpose()?;
    let updated_at: DateTime<Utc> = row.get("updated_at");

    Ok(ConstraintSet {
        id: ConstraintSetId::from_uuid(row.get("id")),
        owner,
        name: row.get("name"),
        priority: row.get("priority"),
        applies_to: Applicability {
            modes: rows::modes_from_json(row.get("applies_to_modes"))?,
            personas: rows::personas_from_json(row.get("applies_to_personas"))?,
        },
        constraints: Vec::new(),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}

fn row_to_constraint(row: &sqlx::postgres::PgRow) -> Result<Constraint, DomainError> {
    let severity: Severity = row.get::<String, _>("severity").parse()?;

    Ok(Constraint {
        id: ConstraintId::new(row.get::<String, _>("id"))?,
        severity,
        active: row.get("active"),
        description: row.get("description"),
        kind: rows::kind_from_json(&row.get::<String, _>("params"))?,
    })
}
