//! Decision engine configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::policy::TriggerPolicy;

/// Decision engine tuning knobs
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// How triggered constraints map to the final decision
    #[serde(default)]
    pub trigger_policy: TriggerPolicy,

    /// Learning actions at or above this confidence apply automatically
    #[serde(default = "default_auto_apply_threshold")]
    pub auto_apply_threshold: f64,

    /// Learning actions below this confidence are rejected outright
    #[serde(default = "default_suggest_threshold")]
    pub suggest_threshold: f64,

    /// How long a recently classified persona stays sticky, in seconds
    #[serde(default = "default_recent_persona_ttl")]
    pub recent_persona_ttl_secs: u64,
}

impl EngineConfig {
    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.auto_apply_threshold) {
            return Err(ValidationError::ThresholdOutOfRange("auto_apply_threshold"));
        }
        if !(0.0..=1.0).contains(&self.suggest_threshold) {
            return Err(ValidationError::ThresholdOutOfRange("suggest_threshold"));
        }
        if self.suggest_threshold > self.auto_apply_threshold {
            return Err(ValidationError::InvertedThresholds);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trigger_policy: TriggerPolicy::default(),
            auto_apply_threshold: default_auto_apply_threshold(),
            suggest_threshold: default_suggest_threshold(),
            recent_persona_ttl_secs: default_recent_persona_ttl(),
        }
    }
}

fn default_auto_apply_threshold() -> f64 {
    0.85
}

fn default_suggest_threshold() -> f64 {
    0.60
}

fn default_recent_persona_ttl() -> u64 {
    300
}
