//! In-memory ConstraintStore adapter.
//!
//! Reference backend used by tests and development; shares filtering and
//! ordering logic with the relational backend through `ConstraintSet`.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    ConstraintId, ConstraintSetId, DomainError, ErrorCode, Mode, Persona, UserId,
};
use crate::domain::policy::{Constraint, ConstraintSet};
use crate::ports::ConstraintStore;

/// In-memory storage for constraint sets.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConstraintStore {
    sets: Arc<RwLock<Vec<ConstraintSet>>>,
}

impl InMemoryConstraintStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests).
    pub async fn clear(&self) {
        self.sets.write().await.clear();
    }

    /// Get the number of stored sets.
    pub async fn set_count(&self) -> usize {
        self.sets.read().await.len()
    }
}

#[async_trait]
impl ConstraintStore for InMemoryConstraintStore {
    async fn constraint_sets_for(
        &self,
        owner: Option<&UserId>,
        mode: Mode,
        persona: Option<Persona>,
    ) -> Result<Vec<ConstraintSet>, DomainError> {
        let sets = self.sets.read().await;
        let mut matching: Vec<ConstraintSet> = sets
            .iter()
            .filter(|set| match (&set.owner, owner) {
                (None, _) => true,
                (Some(set_owner), Some(requested)) => set_owner == requested,
                (Some(_), None) => false,
            })
            .filter(|set| set.applies_to(mode, persona))
            .cloned()
            .collect();
        matching.sort_by(ConstraintSet::priority_desc);
        Ok(matching)
    }

    async fn save_set(&self, set: &ConstraintSet) -> Result<(), DomainError> {
        let mut sets = self.sets.write().await;
        match sets.iter_mut().find(|s| s.id == set.id) {
            Some(existing) => *existing = set.clone(),
            None => sets.push(set.clone()),
        }
        Ok(())
    }

    async fn find_constraint(
        &self,
        id: &ConstraintId,
    ) -> Result<Option<Constraint>, DomainError> {
        let sets = self.sets.read().await;
        Ok(sets
            .iter()
            .flat_map(|set| set.constraints.iter())
            .find(|c| &c.id == id)
            .cloned())
    }

    async fn update_constraint(&self, constraint: &Constraint) -> Result<(), DomainError> {
        let mut sets = self.sets.write().await;
        for set in sets.iter_mut() {
            if let Some(existing) = set.constraints.iter_mut().find(|c| c.id == constraint.id) {
                *existing = constraint.clone();
                return Ok(());
            }
        }
        Err(DomainError::new(
            ErrorCode::ConstraintNotFound,
            format!("Constraint not found: {}", constraint.id),
        ))
    }

    async fn delete_set(&self, id: &ConstraintSetId) -> Result<(), DomainError> {
        let mut sets = self.sets.write().await;
        let before = sets.len();
        sets.retain(|s| &s.id != id);
        if sets.len() == before {
            return Err(DomainError::new(
                ErrorCode::ConstraintSetNotFound,
                format!("Constraint set not found: {}", id),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::{Applicability, ConstraintKind, Severity};

    fn owner() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn cid(id: &str) -> ConstraintId {
        ConstraintId::new(id).unwrap()
    }

    fn tool_block(id: &str) -> Constraint {
        Constraint::new(
            cid(id),
            Severity::Hard,
            ConstraintKind::BlockTool {
                tool_id: "delete-file".to_string(),
            },
            "No deleting",
        )
    }

    #[tokio::test]
    async fn returns_system_and_owned_sets_for_a_user() {
        let store = InMemoryConstraintStore::new();
        store.save_set(&ConstraintSet::system("defaults", 0)).await.unwrap();
        store
            .save_set(&ConstraintSet::new(owner(), "mine", 10))
            .await
            .unwrap();
        store
            .save_set(&ConstraintSet::new(
                UserId::new("someone-else").unwrap(),
                "theirs",
                20,
            ))
            .await
            .unwrap();

        let sets = store
            .constraint_sets_for(Some(&owner()), Mode::Work, None)
            .await
            .unwrap();

        let names: Vec<&str> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["mine", "defaults"]);
    }

    #[tokio::test]
    async fn without_owner_only_system_sets_are_returned() {
        let store = InMemoryConstraintStore::new();
        store.save_set(&ConstraintSet::system("defaults", 0)).await.unwrap();
        store
            .save_set(&ConstraintSet::new(owner(), "mine", 10))
            .await
            .unwrap();

        let sets = store
            .constraint_sets_for(None, Mode::Work, None)
            .await
            .unwrap();

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "defaults");
    }

    #[tokio::test]
    async fn applicability_filter_happens_in_the_store() {
        let store = InMemoryConstraintStore::new();
        store
            .save_set(
                &ConstraintSet::system("home-only", 5)
                    .with_applicability(Applicability::for_modes(vec![Mode::Home])),
            )
            .await
            .unwrap();

        assert!(store
            .constraint_sets_for(None, Mode::Work, None)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store
                .constraint_sets_for(None, Mode::Home, None)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn sets_come_back_priority_descending() {
        let store = InMemoryConstraintStore::new();
        store.save_set(&ConstraintSet::system("low", 1)).await.unwrap();
        store.save_set(&ConstraintSet::system("high", 100)).await.unwrap();
        store.save_set(&ConstraintSet::system("mid", 50)).await.unwrap();

        let sets = store
            .constraint_sets_for(None, Mode::Default, None)
            .await
            .unwrap();

        let priorities: Vec<i32> = sets.iter().map(|s| s.priority).collect();
        assert_eq!(priorities, vec![100, 50, 1]);
    }

    #[tokio::test]
    async fn save_set_replaces_existing_set() {
        let store = InMemoryConstraintStore::new();
        let set = ConstraintSet::system("defaults", 0).with_constraint(tool_block("c-1"));
        store.save_set(&set).await.unwrap();

        let mut updated = set.clone();
        updated.priority = 42;
        store.save_set(&updated).await.unwrap();

        assert_eq!(store.set_count().await, 1);
        let sets = store
            .constraint_sets_for(None, Mode::Default, None)
            .await
            .unwrap();
        assert_eq!(sets[0].priority, 42);
    }

    #[tokio::test]
    async fn find_constraint_searches_across_sets() {
        let store = InMemoryConstraintStore::new();
        store
            .save_set(&ConstraintSet::system("defaults", 0).with_constraint(tool_block("c-1")))
            .await
            .unwrap();

        let found = store.find_constraint(&cid("c-1")).await.unwrap();
        assert!(found.is_some());
        assert!(store.find_constraint(&cid("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_constraint_replaces_in_place() {
        let store = InMemoryConstraintStore::new();
        store
            .save_set(&ConstraintSet::system("defaults", 0).with_constraint(tool_block("c-1")))
            .await
            .unwrap();

        let updated = tool_block("c-1").with_active(false);
        store.update_constraint(&updated).await.unwrap();

        let found = store.find_constraint(&cid("c-1")).await.unwrap().unwrap();
        assert!(!found.active);
    }

    #[tokio::test]
    async fn update_unknown_constraint_errors() {
        let store = InMemoryConstraintStore::new();

        let err = store.update_constraint(&tool_block("ghost")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConstraintNotFound);
    }

    #[tokio::test]
    async fn delete_set_removes_it_and_its_constraints() {
        let store = InMemoryConstraintStore::new();
        let set = ConstraintSet::system("defaults", 0).with_constraint(tool_block("c-1"));
        store.save_set(&set).await.unwrap();

        store.delete_set(&set.id).await.unwrap();

        assert_eq!(store.set_count().await, 0);
        assert!(store.find_constraint(&cid("c-1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_unknown_set_errors() {
        let store = InMemoryConstraintStore::new();

        let err = store.delete_set(&ConstraintSetId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConstraintSetNotFound);
    }
}
