//! ProfileStore port for per-(user, mode) profile persistence.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Mode, UserId};
use crate::domain::profile::Profile;

/// Persistence for profiles.
///
/// Profiles are created lazily on first access and overwritten in
/// place. Two concurrent first accesses for the same (user, mode) may
/// both seed defaults; backends tolerate last-writer-wins on that race.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Finds an existing profile.
    async fn find(&self, owner: &UserId, mode: Mode) -> Result<Option<Profile>, DomainError>;

    /// Returns the profile, seeding the mode's defaults on first access.
    async fn get_or_create(&self, owner: &UserId, mode: Mode) -> Result<Profile, DomainError>;

    /// Inserts or overwrites a profile.
    async fn save(&self, profile: &Profile) -> Result<(), DomainError>;
}
