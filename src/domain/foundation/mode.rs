//! Mode enum - the explicit operating contexts of the product.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Operating context describing what kind of work is happening.
///
/// Modes are a closed set: adding a variant forces every rule table and
/// descriptor match in the engine to be revisited at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Neutral context used before any explicit transition.
    Default,
    /// Household and personal errands.
    Home,
    /// Operations and correspondence work.
    Work,
    /// Budgets, ledgers, and financial review.
    Finance,
}

impl Mode {
    /// Returns all modes in canonical order.
    pub fn all() -> &'static [Mode] {
        &[Mode::Default, Mode::Home, Mode::Work, Mode::Finance]
    }

    /// Returns the stable storage key for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::Home => "home",
            Mode::Work => "work",
            Mode::Finance => "finance",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Mode::Default),
            "home" => Ok(Mode::Home),
            "work" => Ok(Mode::Work),
            "finance" => Ok(Mode::Finance),
            other => Err(ValidationError::invalid_format(
                "mode",
                format!("unknown mode '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_returns_4_modes() {
        assert_eq!(Mode::all().len(), 4);
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for mode in Mode::all() {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), *mode);
        }
    }

    #[test]
    fn from_str_rejects_unknown_mode() {
        assert!("vacation".parse::<Mode>().is_err());
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&Mode::Finance).unwrap();
        assert_eq!(json, "\"finance\"");
    }
}
