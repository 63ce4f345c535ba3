//! ConstraintStore port for constraint set persistence.

use async_trait::async_trait;

use crate::domain::foundation::{
    ConstraintId, ConstraintSetId, DomainError, Mode, Persona, UserId,
};
use crate::domain::policy::{Constraint, ConstraintSet};

/// Persistence for constraint sets and their constraints.
///
/// Every backend must produce identical filtering and ordering:
/// applicability is checked against (mode, persona) before a set is
/// returned, and results are sorted by priority descending (stable).
#[async_trait]
pub trait ConstraintStore: Send + Sync {
    /// Returns the sets applicable to (owner, mode, persona).
    ///
    /// With an owner, system-wide default sets (no owner) are merged in;
    /// without one, only system-wide sets are returned.
    async fn constraint_sets_for(
        &self,
        owner: Option<&UserId>,
        mode: Mode,
        persona: Option<Persona>,
    ) -> Result<Vec<ConstraintSet>, DomainError>;

    /// Inserts or replaces a whole set, constraints included.
    async fn save_set(&self, set: &ConstraintSet) -> Result<(), DomainError>;

    /// Looks a single constraint up by id, across all sets.
    async fn find_constraint(
        &self,
        id: &ConstraintId,
    ) -> Result<Option<Constraint>, DomainError>;

    /// Updates a single constraint in place.
    async fn update_constraint(&self, constraint: &Constraint) -> Result<(), DomainError>;

    /// Deletes a set and every constraint it owns.
    async fn delete_set(&self, id: &ConstraintSetId) -> Result<(), DomainError>;
}
