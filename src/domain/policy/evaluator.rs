//! Pure constraint evaluation over a proposed action.
//!
//! The evaluator is a function table keyed by constraint variant: each
//! variant has one deterministic predicate against the action context.
//! Orchestration (fetching sets from a store) lives in the application
//! layer; everything here is side-effect free.

use serde::{Deserialize, Serialize};

use super::constraint::{Constraint, ConstraintKind, Severity};
use super::constraint_set::ConstraintSet;
use crate::domain::foundation::{
    ConstraintId, DeviceClass, DomainError, Mode, Persona, RiskLevel, Role, SessionId, Timestamp,
    UserId, ValidationError,
};

/// Reason attached to an allowed result when nothing triggered.
pub const NO_CONSTRAINTS_TRIGGERED: &str = "No constraints triggered";

/// Ephemeral description of one proposed action. Not persisted.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub user_id: UserId,
    pub role: Role,
    /// What the action does, e.g. "send-email" or "archive-thread".
    pub action: String,
    pub tool_id: Option<String>,
    pub estimated_risk: RiskLevel,
    pub description: Option<String>,
    pub session_id: Option<SessionId>,
    pub device: Option<DeviceClass>,
    pub mode: Mode,
    pub persona: Option<Persona>,
    /// When the action is happening; drives time-window predicates.
    pub occurred_at: Timestamp,
}

impl ActionContext {
    /// Creates a context for an action happening now.
    pub fn new(
        user_id: UserId,
        role: Role,
        action: impl Into<String>,
        estimated_risk: RiskLevel,
        mode: Mode,
    ) -> Self {
        Self {
            user_id,
            role,
            action: action.into(),
            tool_id: None,
            estimated_risk,
            description: None,
            session_id: None,
            device: None,
            mode,
            persona: None,
            occurred_at: Timestamp::now(),
        }
    }

    /// Sets the tool the action invokes.
    pub fn with_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = Some(tool_id.into());
        self
    }

    /// Sets a human description of the action.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the originating session.
    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Sets the device class the action originates from.
    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = Some(device);
        self
    }

    /// Sets the persona the user is currently classified as.
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    /// Pins the action to a specific point in time.
    pub fn at(mut self, occurred_at: Timestamp) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    /// Fails fast on an ill-formed context, before any store access.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.action.is_empty() {
            return Err(ValidationError::empty_field("action"));
        }
        if matches!(&self.tool_id, Some(id) if id.is_empty()) {
            return Err(ValidationError::empty_field("tool_id"));
        }
        Ok(())
    }
}

/// Machine-checkable outcome of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
}

/// One constraint that fired, traceable back to its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredConstraint {
    pub constraint_id: ConstraintId,
    pub severity: Severity,
    pub reason: String,
}

/// Result of evaluating an action against the applicable constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub allowed: bool,
    pub decision: Decision,
    /// Triggered constraints in evaluation order.
    pub triggered: Vec<TriggeredConstraint>,
    /// Human-readable reasons in trigger order; the first is primary.
    pub reasons: Vec<String>,
}

impl EvaluationResult {
    fn from_triggered(decision: Decision, triggered: Vec<TriggeredConstraint>) -> Self {
        let reasons = if triggered.is_empty() {
            vec![NO_CONSTRAINTS_TRIGGERED.to_string()]
        } else {
            triggered.iter().map(|t| t.reason.clone()).collect()
        };
        Self {
            allowed: decision == Decision::Allow,
            decision,
            triggered,
            reasons,
        }
    }

    /// Returns the primary (first) explanation for the decision.
    pub fn primary_reason(&self) -> &str {
        self.reasons
            .first()
            .map(String::as_str)
            .unwrap_or(NO_CONSTRAINTS_TRIGGERED)
    }
}

/// Named switch for how triggered constraints map to the final decision.
///
/// The product default is the conservative fail-closed policy: any
/// triggered constraint denies, whatever its severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Any triggered constraint denies the action.
    #[default]
    DenyOnAnyTrigger,
    /// Only hard triggers deny; soft/warning triggers annotate the result.
    HardTriggersOnly,
}

/// Evaluates an action against caller-supplied constraint sets.
///
/// Sets are filtered by applicability before their constraints are seen,
/// ordered by priority descending (stable), and flattened in declaration
/// order. Inactive constraints never trigger.
pub fn evaluate_with_sets(
    ctx: &ActionContext,
    sets: &[ConstraintSet],
    policy: TriggerPolicy,
) -> Result<EvaluationResult, DomainError> {
    ctx.validate()?;

    let mut ordered: Vec<&ConstraintSet> = sets
        .iter()
        .filter(|set| set.applies_to(ctx.mode, ctx.persona))
        .collect();
    ordered.sort_by(|a, b| ConstraintSet::priority_desc(a, b));

    let mut triggered = Vec::new();
    for set in ordered {
        for constraint in set.active_constraints() {
            if let Some(reason) = trigger_reason(constraint, ctx) {
                triggered.push(TriggeredConstraint {
                    constraint_id: constraint.id.clone(),
                    severity: constraint.severity,
                    reason,
                });
            }
        }
    }

    let denied = match policy {
        TriggerPolicy::DenyOnAnyTrigger => !triggered.is_empty(),
        TriggerPolicy::HardTriggersOnly => {
            triggered.iter().any(|t| t.severity == Severity::Hard)
        }
    };
    let decision = if denied { Decision::Deny } else { Decision::Allow };

    Ok(EvaluationResult::from_triggered(decision, triggered))
}

/// Predicate table: returns the trigger reason if the constraint fires.
///
/// `BlockMode` never fires for actions; it only participates in mode
/// transition validation.
pub fn trigger_reason(constraint: &Constraint, ctx: &ActionContext) -> Option<String> {
    match &constraint.kind {
        ConstraintKind::BlockTool { tool_id } => match &ctx.tool_id {
            Some(id) if id == tool_id => Some(format!("Tool '{}' is blocked", tool_id)),
            _ => None,
        },
        ConstraintKind::MaxRisk { max_risk } => {
            if ctx.estimated_risk.exceeds(*max_risk) {
                Some(format!(
                    "Estimated risk {} exceeds the {} ceiling",
                    ctx.estimated_risk, max_risk
                ))
            } else {
                None
            }
        }
        ConstraintKind::RequireConfirmation { applies_to_roles } => {
            if applies_to_roles.is_empty() || applies_to_roles.contains(&ctx.role) {
                Some("Action requires confirmation".to_string())
            } else {
                None
            }
        }
        ConstraintKind::BlockMode { .. } => None,
        ConstraintKind::DeviceRestriction { allowed_devices } => match ctx.device {
            Some(device) if !allowed_devices.contains(&device) => Some(format!(
                "Device '{}' is not in the allowed device list",
                device
            )),
            _ => None,
        },
        ConstraintKind::TimeWindow { window } => {
            let hour = ctx.occurred_at.hour();
            if window.contains(hour) {
                None
            } else {
                Some(format!(
                    "Current time {:02}:00 is outside the allowed window {}",
                    hour, window
                ))
            }
        }
        ConstraintKind::Other { note } => Some(note.clone()),
    }
}
