//! Persona enum - inferred behavioral context buckets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Behavioral context describing who the user is acting as.
///
/// Exactly four personas exist; the classifier distributes its scores
/// across all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Executing operational work: inbox triage, correspondence, tasks.
    Operator,
    /// Handling household and relationship matters.
    Caretaker,
    /// Planning ahead: budgets, finances, schedules.
    Planner,
    /// Reviewing and journaling; the quiet-hours persona.
    Reflector,
}

impl Persona {
    /// Returns all personas in canonical order.
    ///
    /// Classifier ties are broken by this order.
    pub fn all() -> &'static [Persona] {
        &[
            Persona::Operator,
            Persona::Caretaker,
            Persona::Planner,
            Persona::Reflector,
        ]
    }

    /// Returns the stable storage key for this persona.
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Operator => "operator",
            Persona::Caretaker => "caretaker",
            Persona::Planner => "planner",
            Persona::Reflector => "reflector",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Persona {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operator" => Ok(Persona::Operator),
            "caretaker" => Ok(Persona::Caretaker),
            "planner" => Ok(Persona::Planner),
            "reflector" => Ok(Persona::Reflector),
            other => Err(ValidationError::invalid_format(
                "persona",
                format!("unknown persona '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_returns_4_personas() {
        assert_eq!(Persona::all().len(), 4);
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for persona in Persona::all() {
            assert_eq!(persona.as_str().parse::<Persona>().unwrap(), *persona);
        }
    }

    #[test]
    fn from_str_rejects_unknown_persona() {
        assert!("wizard".parse::<Persona>().is_err());
    }
}
