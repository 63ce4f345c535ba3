//! Candidate mutations derived from detected patterns.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::foundation::{
    DomainError, ErrorCode, LearningActionId, StateMachine, Timestamp,
};

/// What a learning action would change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningActionKind {
    /// Rewrite a single preference key.
    UpdatePreference,
    /// Append a new soft guard constraint to the profile.
    AdjustConstraint,
    /// Rewrite the risk ceiling preference.
    AdjustRiskThreshold,
    /// Advisory: propose automating a repeated action.
    SuggestAutomation,
    /// Advisory: propose switching to a mode.
    RecommendMode,
    /// Advisory: propose a shortcut.
    CreateShortcut,
}

impl LearningActionKind {
    /// Returns true for the kinds this engine cannot apply itself.
    ///
    /// Advisory actions require external handling and never mutate the
    /// profile.
    pub fn is_advisory(&self) -> bool {
        matches!(
            self,
            LearningActionKind::SuggestAutomation
                | LearningActionKind::RecommendMode
                | LearningActionKind::CreateShortcut
        )
    }

    /// Returns the stable storage key for this action kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningActionKind::UpdatePreference => "update_preference",
            LearningActionKind::AdjustConstraint => "adjust_constraint",
            LearningActionKind::AdjustRiskThreshold => "adjust_risk_threshold",
            LearningActionKind::SuggestAutomation => "suggest_automation",
            LearningActionKind::RecommendMode => "recommend_mode",
            LearningActionKind::CreateShortcut => "create_shortcut",
        }
    }
}

impl fmt::Display for LearningActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a learning action.
///
/// Resolves exactly once: pending actions become applied or rejected and
/// never revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningActionStatus {
    Pending,
    Applied,
    Rejected,
}

impl StateMachine for LearningActionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use LearningActionStatus::*;
        matches!((self, target), (Pending, Applied) | (Pending, Rejected))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use LearningActionStatus::*;
        match self {
            Pending => vec![Applied, Rejected],
            Applied | Rejected => vec![],
        }
    }
}

/// A candidate preference/constraint mutation derived from a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningAction {
    pub id: LearningActionId,
    pub kind: LearningActionKind,
    /// Confidence inherited from the originating pattern.
    pub confidence: f64,
    /// What the action targets: a preference key, tool id, or mode.
    pub target: String,
    pub current_value: Option<Value>,
    pub suggested_value: Value,
    pub reason: String,
    pub status: LearningActionStatus,
    pub created_at: Timestamp,
    pub applied_at: Option<Timestamp>,
}

impl LearningAction {
    /// Creates a pending learning action.
    pub fn new(
        kind: LearningActionKind,
        confidence: f64,
        target: impl Into<String>,
        suggested_value: Value,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: LearningActionId::new(),
            kind,
            confidence,
            target: target.into(),
            current_value: None,
            suggested_value,
            reason: reason.into(),
            status: LearningActionStatus::Pending,
            created_at: Timestamp::now(),
            applied_at: None,
        }
    }

    /// Records the value being replaced.
    pub fn with_current_value(mut self, value: Value) -> Self {
        self.current_value = Some(value);
        self
    }

    /// Returns true if the action is still awaiting resolution.
    pub fn is_pending(&self) -> bool {
        self.status == LearningActionStatus::Pending
    }

    /// Marks the action applied; fails if it was already resolved.
    pub fn mark_applied(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(LearningActionStatus::Applied)
            .map_err(|_| already_resolved(self))?;
        self.applied_at = Some(now);
        Ok(())
    }

    /// Marks the action rejected; fails if it was already resolved.
    pub fn mark_rejected(&mut self) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(LearningActionStatus::Rejected)
            .map_err(|_| already_resolved(self))?;
        Ok(())
    }
}

fn already_resolved(action: &LearningAction) -> DomainError {
    DomainError::new(
        ErrorCode::ActionAlreadyResolved,
        format!("Learning action {} was already resolved", action.id),
    )
    .with_detail("status", format!("{:?}", action.status))
}
