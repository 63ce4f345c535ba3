//! Persona overrides - explicit pins that beat every inferred signal.

use serde::{Deserialize, Serialize};

use super::signals::ClassificationContext;
use crate::domain::foundation::{DeviceClass, Mode, Persona, SessionId, Timestamp, UserId};

/// Optional context triple narrowing where an override applies.
///
/// Every set field must match the classification context for the
/// override to take effect; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideScope {
    pub device: Option<DeviceClass>,
    pub mode: Option<Mode>,
    pub feature: Option<String>,
}

impl OverrideScope {
    fn matches(&self, ctx: &ClassificationContext) -> bool {
        let device_ok = match self.device {
            None => true,
            Some(d) => ctx.device == Some(d),
        };
        let mode_ok = match self.mode {
            None => true,
            Some(m) => ctx.mode == Some(m),
        };
        let feature_ok = match &self.feature {
            None => true,
            Some(f) => ctx
                .active_feature
                .as_deref()
                .is_some_and(|active| active.eq_ignore_ascii_case(f)),
        };
        device_ok && mode_ok && feature_ok
    }
}

/// An explicit persona pin for a user, optionally scoped and expiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaOverride {
    pub user_id: UserId,
    /// When set, the override only applies to this session.
    pub session_id: Option<SessionId>,
    /// When set, the override only applies where the scope matches.
    pub scope: Option<OverrideScope>,
    pub persona: Persona,
    pub expires_at: Option<Timestamp>,
}

impl PersonaOverride {
    /// Creates a user-wide, non-expiring override.
    pub fn new(user_id: UserId, persona: Persona) -> Self {
        Self {
            user_id,
            session_id: None,
            scope: None,
            persona,
            expires_at: None,
        }
    }

    /// Restricts the override to one session.
    pub fn for_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Restricts the override to a context triple.
    pub fn with_scope(mut self, scope: OverrideScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Makes the override expire.
    pub fn expiring_at(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if this override applies to the given context.
    pub fn matches(&self, ctx: &ClassificationContext) -> bool {
        if self.user_id != ctx.user_id {
            return false;
        }
        if let Some(session) = &self.session_id {
            if ctx.session_id.as_ref() != Some(session) {
                return false;
            }
        }
        if let Some(scope) = &self.scope {
            if !scope.matches(ctx) {
                return false;
            }
        }
        if let Some(expires_at) = &self.expires_at {
            if !ctx.observed_at.is_before(expires_at) {
                return false;
            }
        }
        true
    }

    fn same_slot(&self, other: &PersonaOverride) -> bool {
        self.user_id == other.user_id
            && self.session_id == other.session_id
            && self.scope == other.scope
    }
}

/// In-process book of installed overrides.
///
/// Among several matching overrides, the most recently installed wins.
#[derive(Debug, Default)]
pub(crate) struct OverrideBook {
    entries: Vec<PersonaOverride>,
}

impl OverrideBook {
    /// Installs an override, replacing any previous one in the same
    /// (user, session, scope) slot.
    pub fn set(&mut self, entry: PersonaOverride) {
        self.entries.retain(|e| !e.same_slot(&entry));
        self.entries.push(entry);
    }

    /// Finds the override that applies to the context, if any.
    pub fn find(&self, ctx: &ClassificationContext) -> Option<&PersonaOverride> {
        self.entries.iter().rev().find(|e| e.matches(ctx))
    }

    /// Returns the most recently installed override for (user, session).
    pub fn get(&self, user_id: &UserId, session_id: Option<&SessionId>) -> Option<&PersonaOverride> {
        self.entries
            .iter()
            .rev()
            .find(|e| &e.user_id == user_id && e.session_id.as_ref() == session_id)
    }

    /// Clears overrides for a user.
    ///
    /// With a session, only that session's overrides are removed; without
    /// one, every override for the user goes.
    pub fn clear(&mut self, user_id: &UserId, session_id: Option<&SessionId>) {
        self.entries.retain(|e| {
            if &e.user_id != user_id {
                return true;
            }
            match session_id {
                None => false,
                Some(session) => e.session_id.as_ref() != Some(session),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn session(id: &str) -> SessionId {
        SessionId::new(id).unwrap()
    }

    fn ctx() -> ClassificationContext {
        ClassificationContext::new(user())
    }

    #[test]
    fn user_wide_override_matches_any_context() {
        let entry = PersonaOverride::new(user(), Persona::Planner);

        assert!(entry.matches(&ctx()));
        assert!(entry.matches(&ctx().with_mode(Mode::Work).with_device(DeviceClass::Shared)));
    }

    #[test]
    fn override_does_not_match_other_users() {
        let entry = PersonaOverride::new(UserId::new("someone-else").unwrap(), Persona::Planner);

        assert!(!entry.matches(&ctx()));
    }

    #[test]
    fn session_scoped_override_requires_the_session() {
        let entry = PersonaOverride::new(user(), Persona::Operator).for_session(session("s-1"));

        assert!(entry.matches(&ctx().with_session(session("s-1"))));
        assert!(!entry.matches(&ctx().with_session(session("s-2"))));
        assert!(!entry.matches(&ctx()));
    }

    #[test]
    fn scoped_override_requires_every_set_field() {
        let entry = PersonaOverride::new(user(), Persona::Planner).with_scope(OverrideScope {
            device: Some(DeviceClass::Workstation),
            mode: Some(Mode::Finance),
            feature: None,
        });

        let matching = ctx()
            .with_device(DeviceClass::Workstation)
            .with_mode(Mode::Finance);
        let wrong_mode = ctx()
            .with_device(DeviceClass::Workstation)
            .with_mode(Mode::Home);

        assert!(entry.matches(&matching));
        assert!(!entry.matches(&wrong_mode));
    }

    #[test]
    fn feature_scope_is_case_insensitive() {
        let entry = PersonaOverride::new(user(), Persona::Planner).with_scope(OverrideScope {
            device: None,
            mode: None,
            feature: Some("Ledger".to_string()),
        });

        assert!(entry.matches(&ctx().with_feature("ledger")));
        assert!(!entry.matches(&ctx().with_feature("inbox")));
    }

    #[test]
    fn expired_override_does_not_match() {
        let now = Timestamp::from_unix_secs(1_000_000);
        let entry = PersonaOverride::new(user(), Persona::Reflector)
            .expiring_at(now.minus_secs(60));

        assert!(!entry.matches(&ctx().at(now)));
        let live = PersonaOverride::new(user(), Persona::Reflector)
            .expiring_at(now.plus_secs(60));
        assert!(live.matches(&ctx().at(now)));
    }

    #[test]
    fn set_replaces_same_slot() {
        let mut book = OverrideBook::default();
        book.set(PersonaOverride::new(user(), Persona::Operator));
        book.set(PersonaOverride::new(user(), Persona::Planner));

        let found = book.find(&ctx()).unwrap();
        assert_eq!(found.persona, Persona::Planner);
        assert_eq!(book.get(&user(), None).unwrap().persona, Persona::Planner);
    }

    #[test]
    fn most_recently_installed_override_wins() {
        let mut book = OverrideBook::default();
        book.set(PersonaOverride::new(user(), Persona::Operator));
        book.set(PersonaOverride::new(user(), Persona::Caretaker).for_session(session("s-1")));

        let found = book.find(&ctx().with_session(session("s-1"))).unwrap();
        assert_eq!(found.persona, Persona::Caretaker);
    }

    #[test]
    fn clear_without_session_removes_everything_for_user() {
        let mut book = OverrideBook::default();
        book.set(PersonaOverride::new(user(), Persona::Operator));
        book.set(PersonaOverride::new(user(), Persona::Caretaker).for_session(session("s-1")));

        book.clear(&user(), None);

        assert!(book.find(&ctx()).is_none());
        assert!(book.find(&ctx().with_session(session("s-1"))).is_none());
    }

    #[test]
    fn clear_with_session_only_removes_that_session() {
        let mut book = OverrideBook::default();
        book.set(PersonaOverride::new(user(), Persona::Operator));
        book.set(PersonaOverride::new(user(), Persona::Caretaker).for_session(session("s-1")));

        book.clear(&user(), Some(&session("s-1")));

        assert!(book.find(&ctx().with_session(session("s-1"))).is_some());
        assert_eq!(book.find(&ctx()).unwrap().persona, Persona::Operator);
    }
}
