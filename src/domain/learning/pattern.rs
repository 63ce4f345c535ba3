//! Externally detected usage patterns.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{PatternId, Timestamp, ValidationError};

/// Kind of behavioral regularity the external detector reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// The same action repeated many times.
    FrequentAction,
    /// A mode consistently chosen in a given context.
    ModePreference,
    /// Observed tolerance differing from the configured risk ceiling.
    RiskThreshold,
    /// The same activity at the same time of day.
    TimeBasedRoutine,
    /// The same tool failing repeatedly.
    ErrorPattern,
    /// A shorter path to an outcome the user reaches the long way.
    EfficiencyGain,
}

impl PatternKind {
    /// Returns all pattern kinds.
    pub fn all() -> &'static [PatternKind] {
        &[
            PatternKind::FrequentAction,
            PatternKind::ModePreference,
            PatternKind::RiskThreshold,
            PatternKind::TimeBasedRoutine,
            PatternKind::ErrorPattern,
            PatternKind::EfficiencyGain,
        ]
    }

    /// Returns the stable storage key for this pattern kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::FrequentAction => "frequent_action",
            PatternKind::ModePreference => "mode_preference",
            PatternKind::RiskThreshold => "risk_threshold",
            PatternKind::TimeBasedRoutine => "time_based_routine",
            PatternKind::ErrorPattern => "error_pattern",
            PatternKind::EfficiencyGain => "efficiency_gain",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frequent_action" => Ok(PatternKind::FrequentAction),
            "mode_preference" => Ok(PatternKind::ModePreference),
            "risk_threshold" => Ok(PatternKind::RiskThreshold),
            "time_based_routine" => Ok(PatternKind::TimeBasedRoutine),
            "error_pattern" => Ok(PatternKind::ErrorPattern),
            "efficiency_gain" => Ok(PatternKind::EfficiencyGain),
            other => Err(ValidationError::invalid_format(
                "pattern_kind",
                format!("unknown pattern kind '{}'", other),
            )),
        }
    }
}

/// One usage regularity reported by the external pattern detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: PatternId,
    pub kind: PatternKind,
    /// Detector confidence, 0.0-1.0.
    pub confidence: f64,
    /// Kind-specific payload, opaque to everything but the generator.
    pub data: Value,
    /// Event ids supporting the detection.
    pub supporting_events: Vec<String>,
    pub occurrence_count: u32,
    pub detected_at: Timestamp,
}

impl Pattern {
    /// Creates a pattern, validating the confidence range.
    pub fn new(kind: PatternKind, confidence: f64, data: Value) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::invalid_format(
                "confidence",
                format!("must be within 0.0-1.0, got {}", confidence),
            ));
        }
        Ok(Self {
            id: PatternId::new(),
            kind,
            confidence,
            data,
            supporting_events: Vec::new(),
            occurrence_count: 0,
            detected_at: Timestamp::now(),
        })
    }

    /// Attaches supporting event ids.
    pub fn with_supporting_events(mut self, events: Vec<String>) -> Self {
        self.supporting_events = events;
        self
    }

    /// Sets how many times the regularity was observed.
    pub fn with_occurrences(mut self, count: u32) -> Self {
        self.occurrence_count = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pattern_rejects_out_of_range_confidence() {
        assert!(Pattern::new(PatternKind::FrequentAction, 1.2, json!({})).is_err());
        assert!(Pattern::new(PatternKind::FrequentAction, -0.1, json!({})).is_err());
        assert!(Pattern::new(PatternKind::FrequentAction, 0.95, json!({})).is_ok());
    }

    #[test]
    fn pattern_kind_round_trips_through_from_str() {
        for kind in PatternKind::all() {
            assert_eq!(kind.as_str().parse::<PatternKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn builders_attach_evidence() {
        let pattern = Pattern::new(PatternKind::ErrorPattern, 0.92, json!({"tool_id": "sync"}))
            .unwrap()
            .with_supporting_events(vec!["evt-1".to_string(), "evt-2".to_string()])
            .with_occurrences(7);

        assert_eq!(pattern.supporting_events.len(), 2);
        assert_eq!(pattern.occurrence_count, 7);
    }
}
