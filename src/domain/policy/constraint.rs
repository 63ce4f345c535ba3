//! Constraint value objects - single rules that can block or flag actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    ConstraintId, DeviceClass, Mode, RiskLevel, Role, ValidationError,
};

/// How strongly a triggered constraint weighs on the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Always denies; cannot be overridden by confirmation.
    Hard,
    /// Denies under the default trigger policy; eligible for confirmation.
    Soft,
    /// Advisory; annotates the result.
    Warning,
}

impl Severity {
    /// Returns the stable storage key for this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hard => "hard",
            Severity::Soft => "soft",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hard" => Ok(Severity::Hard),
            "soft" => Ok(Severity::Soft),
            "warning" => Ok(Severity::Warning),
            other => Err(ValidationError::invalid_format(
                "severity",
                format!("unknown severity '{}'", other),
            )),
        }
    }
}

/// Daily hour window, UTC, end-exclusive.
///
/// A window may wrap midnight (`start_hour > end_hour`). A window whose
/// start equals its end covers the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl HourWindow {
    /// Creates a new window, validating both hours are 0-23.
    pub fn new(start_hour: u8, end_hour: u8) -> Result<Self, ValidationError> {
        for (field, value) in [("start_hour", start_hour), ("end_hour", end_hour)] {
            if value > 23 {
                return Err(ValidationError::out_of_range(field, 0, 23, value as i32));
            }
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    /// Returns true if the given hour of day falls inside the window.
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour == self.end_hour {
            true
        } else if self.start_hour < self.end_hour {
            (self.start_hour..self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl fmt::Display for HourWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }
}

/// The rule a constraint enforces, one variant per constraint type.
///
/// Each variant carries only the parameters its predicate reads, so a
/// risk ceiling cannot accidentally carry a tool id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Blocks a specific tool.
    BlockTool { tool_id: String },
    /// Blocks actions whose estimated risk exceeds the ceiling.
    MaxRisk { max_risk: RiskLevel },
    /// Soft nudge: asks for confirmation, optionally only for some roles.
    RequireConfirmation {
        #[serde(default)]
        applies_to_roles: Vec<Role>,
    },
    /// Blocks transitions into the listed modes.
    BlockMode { blocked_modes: Vec<Mode> },
    /// Restricts actions to an allow-list of device classes.
    DeviceRestriction { allowed_devices: Vec<DeviceClass> },
    /// Blocks actions occurring outside the daily window.
    TimeWindow { window: HourWindow },
    /// Free-form nudge; triggers whenever the owning set applies.
    Other { note: String },
}

impl ConstraintKind {
    /// Returns the stable storage key of this constraint type.
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintKind::BlockTool { .. } => "block_tool",
            ConstraintKind::MaxRisk { .. } => "max_risk",
            ConstraintKind::RequireConfirmation { .. } => "require_confirmation",
            ConstraintKind::BlockMode { .. } => "block_mode",
            ConstraintKind::DeviceRestriction { .. } => "device_restriction",
            ConstraintKind::TimeWindow { .. } => "time_window",
            ConstraintKind::Other { .. } => "other",
        }
    }
}

/// A single rule that can block or flag an action or mode transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Stable author-chosen id, traceable in audit logs.
    pub id: ConstraintId,
    pub severity: Severity,
    /// Inactive constraints never trigger, for any context.
    pub active: bool,
    pub description: String,
    pub kind: ConstraintKind,
}

impl Constraint {
    /// Creates a new active constraint.
    pub fn new(
        id: ConstraintId,
        severity: Severity,
        kind: ConstraintKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            severity,
            active: true,
            description: description.into(),
            kind,
        }
    }

    /// Returns a copy of this constraint with the given active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}
