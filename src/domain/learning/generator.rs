//! Turns detected patterns into candidate learning actions.
//!
//! Each pattern kind has its own generator and its own minimum
//! confidence; below the cutoff a pattern produces nothing.

use serde_json::{json, Value};

use super::action::{LearningAction, LearningActionKind};
use super::pattern::{Pattern, PatternKind};
use crate::domain::foundation::{ConstraintId, DomainError, Mode, RiskLevel};
use crate::domain::policy::{Constraint, ConstraintKind, Severity};

/// Confidence at or above which a frequent action also earns a shortcut.
const SHORTCUT_CONFIDENCE: f64 = 0.90;

/// Minimum detector confidence per pattern kind.
pub fn min_confidence(kind: PatternKind) -> f64 {
    match kind {
        PatternKind::FrequentAction => 0.80,
        PatternKind::ModePreference => 0.75,
        PatternKind::RiskThreshold => 0.85,
        PatternKind::TimeBasedRoutine => 0.70,
        PatternKind::ErrorPattern => 0.90,
        PatternKind::EfficiencyGain => 0.75,
    }
}

/// Generates candidate learning actions for a pattern.
///
/// Returns an empty list when the pattern's confidence is below its
/// kind's cutoff. Malformed pattern data fails fast.
pub fn generate(pattern: &Pattern) -> Result<Vec<LearningAction>, DomainError> {
    if pattern.confidence < min_confidence(pattern.kind) {
        return Ok(Vec::new());
    }

    match pattern.kind {
        PatternKind::FrequentAction => frequent_action(pattern),
        PatternKind::ModePreference => mode_preference(pattern),
        PatternKind::RiskThreshold => risk_threshold(pattern),
        PatternKind::TimeBasedRoutine => time_based_routine(pattern),
        PatternKind::ErrorPattern => error_pattern(pattern),
        PatternKind::EfficiencyGain => efficiency_gain(pattern),
    }
}

fn frequent_action(pattern: &Pattern) -> Result<Vec<LearningAction>, DomainError> {
    let action = str_field(pattern, "action")?;
    let mut actions = vec![LearningAction::new(
        LearningActionKind::SuggestAutomation,
        pattern.confidence,
        &action,
        json!({ "automate": action }),
        format!(
            "Action '{}' repeated {} times",
            action, pattern.occurrence_count
        ),
    )];

    if pattern.confidence >= SHORTCUT_CONFIDENCE {
        actions.push(LearningAction::new(
            LearningActionKind::CreateShortcut,
            pattern.confidence,
            &action,
            json!({ "shortcut_for": action }),
            format!("Action '{}' is frequent enough for a shortcut", action),
        ));
    }

    Ok(actions)
}

fn mode_preference(pattern: &Pattern) -> Result<Vec<LearningAction>, DomainError> {
    let mode: Mode = str_field(pattern, "mode")?.parse()?;
    Ok(vec![LearningAction::new(
        LearningActionKind::RecommendMode,
        pattern.confidence,
        mode.as_str(),
        json!(mode.as_str()),
        format!("Mode '{}' is consistently chosen in this context", mode),
    )])
}

fn risk_threshold(pattern: &Pattern) -> Result<Vec<LearningAction>, DomainError> {
    let observed: RiskLevel = str_field(pattern, "observed_ceiling")?.parse()?;
    Ok(vec![LearningAction::new(
        LearningActionKind::AdjustRiskThreshold,
        pattern.confidence,
        "risk_ceiling",
        json!(observed.as_str()),
        format!("Observed risk tolerance settles at '{}'", observed),
    )])
}

fn time_based_routine(pattern: &Pattern) -> Result<Vec<LearningAction>, DomainError> {
    let key = str_field(pattern, "preference_key")?;
    let value = str_field(pattern, "preference_value")?;
    Ok(vec![LearningAction::new(
        LearningActionKind::UpdatePreference,
        pattern.confidence,
        &key,
        json!(value),
        format!(
            "Routine sets '{}' to '{}' at the same time of day",
            key, value
        ),
    )])
}

fn error_pattern(pattern: &Pattern) -> Result<Vec<LearningAction>, DomainError> {
    let tool_id = str_field(pattern, "tool_id")?;
    let guard = Constraint::new(
        ConstraintId::new(format!("learned-guard-{}", tool_id))?,
        Severity::Soft,
        ConstraintKind::BlockTool {
            tool_id: tool_id.clone(),
        },
        format!("Tool '{}' failed repeatedly; ask before retrying", tool_id),
    );
    let suggested = serde_json::to_value(&guard).map_err(|e| {
        DomainError::new(
            crate::domain::foundation::ErrorCode::InternalError,
            format!("Failed to serialize learned constraint: {}", e),
        )
    })?;

    Ok(vec![LearningAction::new(
        LearningActionKind::AdjustConstraint,
        pattern.confidence,
        &tool_id,
        suggested,
        format!(
            "Tool '{}' failed {} times recently",
            tool_id, pattern.occurrence_count
        ),
    )])
}

fn efficiency_gain(pattern: &Pattern) -> Result<Vec<LearningAction>, DomainError> {
    let feature = str_field(pattern, "feature")?;
    let shortcut = str_field(pattern, "shortcut")?;
    Ok(vec![LearningAction::new(
        LearningActionKind::CreateShortcut,
        pattern.confidence,
        &feature,
        json!(shortcut),
        format!("'{}' gets to '{}' faster", shortcut, feature),
    )])
}

/// Reads a required string field out of the pattern payload, failing
/// fast on malformed data.
fn str_field(pattern: &Pattern, name: &str) -> Result<String, DomainError> {
    match pattern.data.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(DomainError::validation(
            name,
            format!(
                "Pattern '{}' data is missing required field '{}'",
                pattern.kind, name
            ),
        )),
    }
}
