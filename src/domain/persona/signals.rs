//! Ambient signals feeding persona classification.

use crate::domain::foundation::{
    DeviceClass, Mode, Persona, SessionId, Timestamp, UserId, ValidationError,
};

/// One past classification, used for sticky recency.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaObservation {
    pub persona: Persona,
    pub observed_at: Timestamp,
}

/// Everything the classifier may look at for one call. Not persisted.
#[derive(Debug, Clone)]
pub struct ClassificationContext {
    pub user_id: UserId,
    pub session_id: Option<SessionId>,
    /// Persona explicitly stated on the request; wins outright.
    pub explicit_persona: Option<Persona>,
    pub device: Option<DeviceClass>,
    pub mode: Option<Mode>,
    /// Name of the feature currently in the foreground, e.g. "unified-inbox".
    pub active_feature: Option<String>,
    /// Coarse location hint from the shell, e.g. "home" or "office".
    pub location_hint: Option<String>,
    /// Local hour of day, 0-23.
    pub local_hour: Option<u8>,
    /// Recent persona history, any order.
    pub recent_personas: Vec<PersonaObservation>,
    /// When the classification is happening; drives recency math.
    pub observed_at: Timestamp,
}

impl ClassificationContext {
    /// Creates a context observed now, with no signals.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            session_id: None,
            explicit_persona: None,
            device: None,
            mode: None,
            active_feature: None,
            location_hint: None,
            local_hour: None,
            recent_personas: Vec::new(),
            observed_at: Timestamp::now(),
        }
    }

    /// Sets the originating session.
    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// States the persona explicitly.
    pub fn with_explicit_persona(mut self, persona: Persona) -> Self {
        self.explicit_persona = Some(persona);
        self
    }

    /// Sets the device signal.
    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = Some(device);
        self
    }

    /// Sets the current mode signal.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the active feature signal.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.active_feature = Some(feature.into());
        self
    }

    /// Sets the location hint signal.
    pub fn with_location(mut self, hint: impl Into<String>) -> Self {
        self.location_hint = Some(hint.into());
        self
    }

    /// Sets the local hour of day (0-23).
    pub fn with_local_hour(mut self, hour: u8) -> Self {
        self.local_hour = Some(hour);
        self
    }

    /// Appends one recent persona observation.
    pub fn with_recent(mut self, persona: Persona, observed_at: Timestamp) -> Self {
        self.recent_personas.push(PersonaObservation {
            persona,
            observed_at,
        });
        self
    }

    /// Pins the classification to a specific point in time.
    pub fn at(mut self, observed_at: Timestamp) -> Self {
        self.observed_at = observed_at;
        self
    }

    /// Fails fast on an ill-formed context.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(hour) = self.local_hour {
            if hour > 23 {
                return Err(ValidationError::out_of_range("local_hour", 0, 23, hour as i32));
            }
        }
        Ok(())
    }

    /// Returns the most recent persona observation, if any.
    pub fn newest_observation(&self) -> Option<&PersonaObservation> {
        self.recent_personas.iter().max_by_key(|o| o.observed_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn validate_rejects_hour_out_of_range() {
        let ctx = ClassificationContext::new(user()).with_local_hour(24);
        assert!(ctx.validate().is_err());
        assert!(ClassificationContext::new(user())
            .with_local_hour(23)
            .validate()
            .is_ok());
    }

    #[test]
    fn newest_observation_picks_latest() {
        let ctx = ClassificationContext::new(user())
            .with_recent(Persona::Operator, Timestamp::from_unix_secs(100))
            .with_recent(Persona::Planner, Timestamp::from_unix_secs(300))
            .with_recent(Persona::Caretaker, Timestamp::from_unix_secs(200));

        assert_eq!(
            ctx.newest_observation().unwrap().persona,
            Persona::Planner
        );
    }

    #[test]
    fn newest_observation_is_none_without_history() {
        assert!(ClassificationContext::new(user()).newest_observation().is_none());
    }
}
