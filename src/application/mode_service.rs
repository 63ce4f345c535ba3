//! ModeService - owns the current mode and validated transitions.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{DeviceClass, DomainError, Mode, Persona, UserId};
use crate::domain::modes::ModeDescriptor;
use crate::domain::policy::{
    validate_transition, ModeTransitionContext, ModeTransitionResult, TransitionTrigger,
};
use crate::ports::ConstraintStore;

/// One requested mode change.
#[derive(Debug, Clone)]
pub struct ModeChangeRequest {
    /// Whose constraint sets apply; `None` scopes to system defaults.
    pub owner: Option<UserId>,
    pub to_mode: Mode,
    /// Explicit persona to transition under, if any.
    pub persona: Option<Persona>,
    pub device: Option<DeviceClass>,
    pub triggered_by: TransitionTrigger,
}

impl ModeChangeRequest {
    /// Creates a user-triggered request.
    pub fn new(to_mode: Mode) -> Self {
        Self {
            owner: None,
            to_mode,
            persona: None,
            device: None,
            triggered_by: TransitionTrigger::User,
        }
    }

    /// Scopes the request to a user's constraint sets.
    pub fn for_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Requests the transition under an explicit persona.
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    /// Sets the device the transition happens on.
    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = Some(device);
        self
    }

    /// Records what initiated the transition.
    pub fn triggered_by(mut self, trigger: TransitionTrigger) -> Self {
        self.triggered_by = trigger;
        self
    }
}

/// Options controlling one `set_mode` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetModeOptions {
    /// Bypass validation entirely.
    pub skip_validation: bool,
    /// Caller-supplied confirmation for soft confirmation nudges.
    pub confirmed: bool,
}

/// What `set_mode` did.
#[derive(Debug, Clone, PartialEq)]
pub enum SetModeOutcome {
    /// The mode changed.
    Changed {
        previous: Mode,
        current: Mode,
        descriptor: &'static ModeDescriptor,
    },
    /// Validation asked for confirmation and none was supplied; the
    /// mode is unchanged. Re-invoke with `confirmed: true` to proceed.
    ConfirmationRequired { validation: ModeTransitionResult },
}

/// Owns the process-wide current mode.
///
/// A single injected instance guards the mode behind a mutex; there is
/// no static singleton. The initial mode is `Mode::Default`; transitions
/// are unrestricted in count and may cycle.
pub struct ModeService {
    constraints: Arc<dyn ConstraintStore>,
    current: Mutex<Mode>,
}

impl ModeService {
    /// Creates a service starting in the default mode.
    pub fn new(constraints: Arc<dyn ConstraintStore>) -> Self {
        Self {
            constraints,
            current: Mutex::new(Mode::Default),
        }
    }

    /// Returns the current mode.
    pub async fn current_mode(&self) -> Mode {
        *self.current.lock().await
    }

    /// Returns the current mode's static descriptor.
    pub async fn descriptor(&self) -> &'static ModeDescriptor {
        ModeDescriptor::for_mode(self.current_mode().await)
    }

    /// Validates a transition without committing anything.
    pub async fn validate(
        &self,
        ctx: &ModeTransitionContext,
    ) -> Result<ModeTransitionResult, DomainError> {
        let sets = self
            .constraints
            .constraint_sets_for(ctx.owner.as_ref(), ctx.from_mode, ctx.persona)
            .await?;
        Ok(validate_transition(ctx, &sets))
    }

    /// Attempts a mode change.
    ///
    /// Unless `skip_validation` is set, the transition is validated
    /// first: a blocked transition returns a `TransitionDenied` error
    /// carrying the first blocking reason and leaves the mode
    /// unchanged; a confirmation nudge without `confirmed` suspends as
    /// `ConfirmationRequired`. On success the mode is updated in a
    /// single assignment under the mutex.
    pub async fn set_mode(
        &self,
        request: ModeChangeRequest,
        options: SetModeOptions,
    ) -> Result<SetModeOutcome, DomainError> {
        let mut current = self.current.lock().await;
        let from_mode = *current;

        if !options.skip_validation {
            let mut ctx = ModeTransitionContext::new(from_mode, request.to_mode)
                .triggered_by(request.triggered_by);
            if let Some(owner) = request.owner.clone() {
                ctx = ctx.for_owner(owner);
            }
            if let Some(persona) = request.persona {
                ctx = ctx.with_persona(persona);
            }
            if let Some(device) = request.device {
                ctx = ctx.with_device(device);
            }

            let sets = self
                .constraints
                .constraint_sets_for(ctx.owner.as_ref(), ctx.from_mode, ctx.persona)
                .await?;
            let validation = validate_transition(&ctx, &sets);

            if !validation.success {
                let reason = validation
                    .first_blocking_reason()
                    .unwrap_or("Transition blocked")
                    .to_string();
                return Err(DomainError::transition_denied(reason)
                    .with_detail("from_mode", from_mode.as_str())
                    .with_detail("to_mode", request.to_mode.as_str()));
            }

            if validation.requires_confirmation && !options.confirmed {
                tracing::warn!(
                    from = %from_mode,
                    to = %request.to_mode,
                    "Mode transition awaiting confirmation"
                );
                return Ok(SetModeOutcome::ConfirmationRequired { validation });
            }
        }

        *current = request.to_mode;
        tracing::debug!(from = %from_mode, to = %request.to_mode, "Mode changed");

        Ok(SetModeOutcome::Changed {
            previous: from_mode,
            current: request.to_mode,
            descriptor: ModeDescriptor::for_mode(request.to_mode),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryConstraintStore;
    use crate::domain::foundation::{ConstraintId, ErrorCode};
    use crate::domain::policy::{Constraint, ConstraintKind, ConstraintSet, Severity};

    fn service() -> (ModeService, Arc<InMemoryConstraintStore>) {
        let store = Arc::new(InMemoryConstraintStore::new());
        (ModeService::new(store.clone()), store)
    }

    fn no_finance_set() -> ConstraintSet {
        ConstraintSet::system("blockers", 10).with_constraint(Constraint::new(
            ConstraintId::new("no-finance").unwrap(),
            Severity::Hard,
            ConstraintKind::BlockMode {
                blocked_modes: vec![Mode::Finance],
            },
            "Finance is off limits from here",
        ))
    }

    fn confirm_set() -> ConstraintSet {
        ConstraintSet::system("nudges", 0).with_constraint(Constraint::new(
            ConstraintId::new("confirm-switch").unwrap(),
            Severity::Soft,
            ConstraintKind::RequireConfirmation {
                applies_to_roles: vec![],
            },
            "Double-check mode switches",
        ))
    }

    #[tokio::test]
    async fn starts_in_default_mode() {
        let (service, _) = service();

        assert_eq!(service.current_mode().await, Mode::Default);
        assert_eq!(service.descriptor().await.mode, Mode::Default);
    }

    #[tokio::test]
    async fn successful_transition_updates_current_mode() {
        let (service, _) = service();

        let outcome = service
            .set_mode(ModeChangeRequest::new(Mode::Work), SetModeOptions::default())
            .await
            .unwrap();

        match outcome {
            SetModeOutcome::Changed {
                previous,
                current,
                descriptor,
            } => {
                assert_eq!(previous, Mode::Default);
                assert_eq!(current, Mode::Work);
                assert_eq!(descriptor.intent, "Clear the decks");
            }
            other => panic!("expected Changed, got {:?}", other),
        }
        assert_eq!(service.current_mode().await, Mode::Work);
    }

    #[tokio::test]
    async fn blocked_transition_errors_and_leaves_mode_unchanged() {
        let (service, store) = service();
        store.save_set(&no_finance_set()).await.unwrap();

        let err = service
            .set_mode(
                ModeChangeRequest::new(Mode::Finance),
                SetModeOptions::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::TransitionDenied);
        assert!(err.message.contains("finance"));
        assert_eq!(service.current_mode().await, Mode::Default);
    }

    #[tokio::test]
    async fn skip_validation_bypasses_blocking_constraints() {
        let (service, store) = service();
        store.save_set(&no_finance_set()).await.unwrap();

        let outcome = service
            .set_mode(
                ModeChangeRequest::new(Mode::Finance),
                SetModeOptions {
                    skip_validation: true,
                    confirmed: false,
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, SetModeOutcome::Changed { .. }));
        assert_eq!(service.current_mode().await, Mode::Finance);
    }

    #[tokio::test]
    async fn confirmation_nudge_suspends_until_confirmed() {
        let (service, store) = service();
        store.save_set(&confirm_set()).await.unwrap();

        let outcome = service
            .set_mode(ModeChangeRequest::new(Mode::Home), SetModeOptions::default())
            .await
            .unwrap();

        match &outcome {
            SetModeOutcome::ConfirmationRequired { validation } => {
                assert!(validation.requires_confirmation);
                assert!(validation.success);
            }
            other => panic!("expected ConfirmationRequired, got {:?}", other),
        }
        assert_eq!(service.current_mode().await, Mode::Default);

        let confirmed = service
            .set_mode(
                ModeChangeRequest::new(Mode::Home),
                SetModeOptions {
                    skip_validation: false,
                    confirmed: true,
                },
            )
            .await
            .unwrap();

        assert!(matches!(confirmed, SetModeOutcome::Changed { .. }));
        assert_eq!(service.current_mode().await, Mode::Home);
    }

    #[tokio::test]
    async fn transitions_can_cycle() {
        let (service, _) = service();

        for target in [Mode::Work, Mode::Home, Mode::Work, Mode::Default] {
            service
                .set_mode(ModeChangeRequest::new(target), SetModeOptions::default())
                .await
                .unwrap();
        }

        assert_eq!(service.current_mode().await, Mode::Default);
    }

    #[tokio::test]
    async fn validate_does_not_commit_anything() {
        let (service, _) = service();

        let result = service
            .validate(&ModeTransitionContext::new(Mode::Default, Mode::Work))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(service.current_mode().await, Mode::Default);
    }

    #[tokio::test]
    async fn persona_mismatch_is_refused_with_system_reason() {
        let (service, _) = service();

        let err = service
            .set_mode(
                ModeChangeRequest::new(Mode::Work).with_persona(Persona::Planner),
                SetModeOptions::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::TransitionDenied);
        assert!(err.message.contains("planner"));
    }
}
