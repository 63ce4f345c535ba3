//! Static descriptors for each mode.
//!
//! A descriptor carries the mode's intent line, its home persona, an
//! optional home device, and the defaults seeded into a fresh profile.

use crate::domain::foundation::{ConstraintId, DeviceClass, Mode, Persona, RiskLevel, Role};
use crate::domain::policy::{Constraint, ConstraintKind, Severity};
use crate::domain::profile::Preference;

/// Static description of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDescriptor {
    pub mode: Mode,
    /// One-line statement of what the mode is for.
    pub intent: &'static str,
    /// The persona this mode belongs to; explicit transitions under a
    /// different persona are refused by the system compatibility check.
    pub home_persona: Persona,
    /// Device the mode expects, if it cares.
    pub home_device: Option<DeviceClass>,
}

static DESCRIPTORS: [ModeDescriptor; 4] = [
    ModeDescriptor {
        mode: Mode::Default,
        intent: "Catch up and decide what is next",
        home_persona: Persona::Reflector,
        home_device: None,
    },
    ModeDescriptor {
        mode: Mode::Home,
        intent: "Run the household",
        home_persona: Persona::Caretaker,
        home_device: Some(DeviceClass::Personal),
    },
    ModeDescriptor {
        mode: Mode::Work,
        intent: "Clear the decks",
        home_persona: Persona::Operator,
        home_device: Some(DeviceClass::Workstation),
    },
    ModeDescriptor {
        mode: Mode::Finance,
        intent: "Keep the books honest",
        home_persona: Persona::Planner,
        home_device: None,
    },
];

impl ModeDescriptor {
    /// Returns the descriptor for a mode.
    pub fn for_mode(mode: Mode) -> &'static ModeDescriptor {
        match mode {
            Mode::Default => &DESCRIPTORS[0],
            Mode::Home => &DESCRIPTORS[1],
            Mode::Work => &DESCRIPTORS[2],
            Mode::Finance => &DESCRIPTORS[3],
        }
    }

    /// Preferences seeded into a fresh profile for this mode.
    pub fn default_preferences(&self) -> Vec<Preference> {
        match self.mode {
            Mode::Default => vec![
                Preference::new("theme", "system"),
                Preference::new("digest", "daily"),
            ],
            Mode::Home => vec![
                Preference::new("theme", "warm"),
                Preference::new("quiet_hours", "on"),
            ],
            Mode::Work => vec![
                Preference::new("theme", "light"),
                Preference::new("notifications", "focused"),
            ],
            Mode::Finance => vec![
                Preference::new("theme", "light"),
                Preference::new("risk_ceiling", "medium"),
            ],
        }
    }

    /// Constraints seeded into a fresh profile for this mode.
    pub fn default_constraints(&self) -> Vec<Constraint> {
        match self.mode {
            Mode::Default | Mode::Work => vec![],
            Mode::Home => vec![Constraint::new(
                ConstraintId::new("home-assistant-confirm").expect("id is non-empty"),
                Severity::Soft,
                ConstraintKind::RequireConfirmation {
                    applies_to_roles: vec![Role::Assistant],
                },
                "Assistant actions at home ask before running",
            )],
            Mode::Finance => vec![Constraint::new(
                ConstraintId::new("finance-risk-ceiling").expect("id is non-empty"),
                Severity::Hard,
                ConstraintKind::MaxRisk {
                    max_risk: RiskLevel::Medium,
                },
                "High-risk operations are blocked while the books are open",
            )],
        }
    }
}
