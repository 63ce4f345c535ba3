//! In-memory ProfileStore adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Mode, UserId};
use crate::domain::profile::Profile;
use crate::ports::ProfileStore;

/// In-memory storage for profiles, keyed by (owner, mode).
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<(UserId, Mode), Profile>>>,
}

impl InMemoryProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests).
    pub async fn clear(&self) {
        self.profiles.write().await.clear();
    }

    /// Get the number of stored profiles.
    pub async fn profile_count(&self) -> usize {
        self.profiles.read().await.len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find(&self, owner: &UserId, mode: Mode) -> Result<Option<Profile>, DomainError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(&(owner.clone(), mode)).cloned())
    }

    async fn get_or_create(&self, owner: &UserId, mode: Mode) -> Result<Profile, DomainError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry((owner.clone(), mode))
            .or_insert_with(|| Profile::seeded(owner.clone(), mode));
        Ok(profile.clone())
    }

    async fn save(&self, profile: &Profile) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        profiles.insert((profile.owner.clone(), profile.mode), profile.clone());
        Ok(())
    }
}
