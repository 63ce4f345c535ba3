//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory backends for tests and development
//! - `postgres` - sqlx/PostgreSQL backends

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryConstraintStore, InMemoryProfileStore};
pub use postgres::{PostgresConstraintStore, PostgresProfileStore};
