//! Mode transition validation.
//!
//! A transition is checked against the constraint sets applicable to the
//! mode being left, then against two unconditional system compatibility
//! rules (persona↔mode and device↔mode).

use serde::{Deserialize, Serialize};

use super::constraint::{ConstraintKind, Severity};
use super::constraint_set::ConstraintSet;
use crate::domain::foundation::{ConstraintId, DeviceClass, Mode, Persona, UserId};
use crate::domain::modes::ModeDescriptor;

/// Synthetic blocking id for an explicit persona incompatible with the
/// target mode's home persona.
pub const SYSTEM_PERSONA_MODE_MISMATCH: &str = "system:persona-mode-mismatch";

/// Synthetic blocking id for a device incompatible with the target mode's
/// home device.
pub const SYSTEM_DEVICE_MODE_MISMATCH: &str = "system:device-mode-mismatch";

/// What initiated a mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    /// The user switched modes in the shell.
    User,
    /// The product switched modes on the user's behalf.
    System,
    /// The learning loop recommended and committed the switch.
    Learning,
}

/// Ephemeral description of one requested mode transition. Not persisted.
#[derive(Debug, Clone)]
pub struct ModeTransitionContext {
    pub from_mode: Mode,
    pub to_mode: Mode,
    /// Whose constraint sets apply; `None` scopes to system defaults only.
    pub owner: Option<UserId>,
    /// Explicit persona the transition is requested under, if any.
    pub persona: Option<Persona>,
    pub device: Option<DeviceClass>,
    pub reason: Option<String>,
    pub triggered_by: TransitionTrigger,
}

impl ModeTransitionContext {
    /// Creates a user-triggered transition context.
    pub fn new(from_mode: Mode, to_mode: Mode) -> Self {
        Self {
            from_mode,
            to_mode,
            owner: None,
            persona: None,
            device: None,
            reason: None,
            triggered_by: TransitionTrigger::User,
        }
    }

    /// Scopes the transition to a user's constraint sets.
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

    /// Attaches a free-form reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Records what initiated the transition.
    pub fn triggered_by(mut self, trigger: TransitionTrigger) -> Self {
        self.triggered_by = trigger;
        self
    }
}

/// One entry that blocked a transition, traceable to a constraint id or
/// one of the synthetic `system:` ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedTransition {
    pub constraint_id: ConstraintId,
    pub reason: String,
}

/// Outcome of validating a mode transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeTransitionResult {
    pub success: bool,
    pub from_mode: Mode,
    pub to_mode: Mode,
    pub blocked_by: Vec<BlockedTransition>,
    /// True when a triggered soft constraint asks for confirmation; the
    /// transition is not blocked but should suspend until confirmed.
    pub requires_confirmation: bool,
}

impl ModeTransitionResult {
    /// Returns the first blocking reason, if any.
    pub fn first_blocking_reason(&self) -> Option<&str> {
        self.blocked_by.first().map(|b| b.reason.as_str())
    }
}

/// Validates a transition against the supplied constraint sets.
///
/// The sets are filtered by applicability for the mode being LEFT (and
/// the transition persona); the two system compatibility checks run
/// unconditionally afterwards, even with zero user constraints.
pub fn validate_transition(
    ctx: &ModeTransitionContext,
    sets: &[ConstraintSet],
) -> ModeTransitionResult {
    let mut ordered: Vec<&ConstraintSet> = sets
        .iter()
        .filter(|set| set.applies_to(ctx.from_mode, ctx.persona))
        .collect();
    ordered.sort_by(|a, b| ConstraintSet::priority_desc(a, b));

    let mut blocked_by = Vec::new();
    let mut requires_confirmation = false;

    for set in ordered {
        for constraint in set.active_constraints() {
            match &constraint.kind {
                ConstraintKind::BlockMode { blocked_modes } => {
                    if blocked_modes.contains(&ctx.to_mode) {
                        blocked_by.push(BlockedTransition {
                            constraint_id: constraint.id.clone(),
                            reason: format!(
                                "Transition to mode '{}' is blocked: {}",
                                ctx.to_mode, constraint.description
                            ),
                        });
                    }
                }
                ConstraintKind::RequireConfirmation { .. } => {
                    if constraint.severity != Severity::Hard {
                        requires_confirmation = true;
                    }
                }
                _ => {}
            }
        }
    }

    let descriptor = ModeDescriptor::for_mode(ctx.to_mode);

    if let Some(persona) = ctx.persona {
        if persona != descriptor.home_persona {
            blocked_by.push(BlockedTransition {
                constraint_id: ConstraintId::new(SYSTEM_PERSONA_MODE_MISMATCH)
                    .expect("synthetic id is non-empty"),
                reason: format!(
                    "Persona '{}' is not at home in mode '{}' (expects '{}')",
                    persona, ctx.to_mode, descriptor.home_persona
                ),
            });
        }
    }

    if let (Some(device), Some(home_device)) = (ctx.device, descriptor.home_device) {
        if device != home_device {
            blocked_by.push(BlockedTransition {
                constraint_id: ConstraintId::new(SYSTEM_DEVICE_MODE_MISMATCH)
                    .expect("synthetic id is non-empty"),
                reason: format!(
                    "Device '{}' is not compatible with mode '{}' (expects '{}')",
                    device, ctx.to_mode, home_device
                ),
            });
        }
    }

    ModeTransitionResult {
        success: blocked_by.is_empty(),
        from_mode: ctx.from_mode,
        to_mode: ctx.to_mode,
        blocked_by,
        requires_confirmation,
    }
}
