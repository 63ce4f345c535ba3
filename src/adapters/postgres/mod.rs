//! PostgreSQL adapters.

mod constraint_store;
mod profile_store;
mod rows;

pub use constraint_store::PostgresConstraintStore;
pub use profile_store::PostgresProfileStore;

use crate::domain::foundation::{DomainError, ErrorCode};
use sqlx::PgPool;

/// Applies the schema migrations for the policy tables.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to run migrations: {}", e),
        )
    })
}
