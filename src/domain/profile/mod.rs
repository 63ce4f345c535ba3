//! Profile module - per-(user, mode) preferences and learned constraints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Mode, Timestamp, UserId};
use crate::domain::modes::ModeDescriptor;
use crate::domain::policy::Constraint;

/// One ordered preference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub key: String,
    pub value: String,
}

impl Preference {
    /// Creates a preference entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Per-(user, mode) profile.
///
/// Created lazily on first access from the mode's defaults; mutated by
/// learning application or explicit edits; overwritten in place, never
/// hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub owner: UserId,
    pub mode: Mode,
    /// Ordered preference list; keys are unique.
    pub preferences: Vec<Preference>,
    /// Constraints attached directly to this profile (learned guards).
    pub constraints: Vec<Constraint>,
    pub updated_at: Timestamp,
}

impl Profile {
    /// Creates an empty profile.
    pub fn new(owner: UserId, mode: Mode) -> Self {
        Self {
            owner,
            mode,
            preferences: Vec::new(),
            constraints: Vec::new(),
            updated_at: Timestamp::now(),
        }
    }

    /// Creates a profile seeded with the mode's defaults.
    pub fn seeded(owner: UserId, mode: Mode) -> Self {
        let descriptor = ModeDescriptor::for_mode(mode);
        Self {
            owner,
            mode,
            preferences: descriptor.default_preferences(),
            constraints: descriptor.default_constraints(),
            updated_at: Timestamp::now(),
        }
    }

    /// Returns the value of a preference key, if present.
    pub fn preference(&self, key: &str) -> Option<&str> {
        self.preferences
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Rewrites a single preference key in place, appending when absent.
    pub fn set_preference(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        now: Timestamp,
    ) {
        let key = key.into();
        let value = value.into();
        match self.preferences.iter_mut().find(|p| p.key == key) {
            Some(existing) => existing.value = value,
            None => self.preferences.push(Preference { key, value }),
        }
        self.updated_at = now;
    }

    /// Appends a learned constraint.
    pub fn add_constraint(&mut self, constraint: Constraint, now: Timestamp) {
        self.constraints.push(constraint);
        self.updated_at = now;
    }
}
