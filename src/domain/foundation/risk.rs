//! Risk level of a proposed action.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Estimated risk of a proposed action on an ordinal scale.
///
/// The derived ordering is `Low < Medium < High`; "exceeds" in constraint
/// evaluation is the ordinal comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Returns all risk levels from lowest to highest.
    pub fn all() -> &'static [RiskLevel] {
        &[RiskLevel::Low, RiskLevel::Medium, RiskLevel::High]
    }

    /// Returns true if this risk level exceeds the given ceiling.
    pub fn exceeds(&self, ceiling: RiskLevel) -> bool {
        *self > ceiling
    }

    /// Returns the stable storage key for this risk level.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(ValidationError::invalid_format(
                "risk_level",
                format!("unknown risk level '{}'", other),
            )),
        }
    }
}
