//! Pure application of a learning action to a profile.

use serde_json::Value;

use super::action::{LearningAction, LearningActionKind};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::policy::Constraint;
use crate::domain::profile::Profile;

/// What applying an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyEffect {
    /// The profile was mutated.
    Mutated,
    /// The action is advisory; nothing was mutated.
    Advisory,
}

/// Applies a learning action to a profile in memory.
///
/// `UpdatePreference` and `AdjustRiskThreshold` rewrite a single
/// preference key; `AdjustConstraint` appends the suggested constraint.
/// Advisory kinds leave the profile untouched.
pub fn apply_to_profile(
    action: &LearningAction,
    profile: &mut Profile,
    now: Timestamp,
) -> Result<ApplyEffect, DomainError> {
    match action.kind {
        LearningActionKind::UpdatePreference | LearningActionKind::AdjustRiskThreshold => {
            let value = value_as_string(&action.suggested_value);
            profile.set_preference(action.target.clone(), value, now);
            Ok(ApplyEffect::Mutated)
        }
        LearningActionKind::AdjustConstraint => {
            let constraint: Constraint = serde_json::from_value(action.suggested_value.clone())
                .map_err(|e| {
                    DomainError::validation(
                        "suggested_value",
                        format!("Suggested constraint does not parse: {}", e),
                    )
                })?;
            profile.add_constraint(constraint, now);
            Ok(ApplyEffect::Mutated)
        }
        LearningActionKind::SuggestAutomation
        | LearningActionKind::RecommendMode
        | LearningActionKind::CreateShortcut => Ok(ApplyEffect::Advisory),
    }
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
