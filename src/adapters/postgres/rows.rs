//! JSON codecs for list-valued columns.
//!
//! The relational schema stores list/map-valued fields as JSON text
//! columns; these helpers are the single place that encoding lives, so
//! the Postgres backend cannot drift from the domain serde shapes.

use crate::domain::foundation::{DomainError, ErrorCode, Mode, Persona};
use crate::domain::policy::{Constraint, ConstraintKind};
use crate::domain::profile::Preference;

fn encode<T: serde::Serialize>(field: &str, value: &T) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Failed to encode {}: {}", field, e),
        )
    })
}

fn decode<T: serde::de::DeserializeOwned>(field: &str, text: &str) -> Result<T, DomainError> {
    serde_json::from_str(text).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to decode {} column: {}", field, e),
        )
    })
}

pub(crate) fn modes_to_json(modes: &Option<Vec<Mode>>) -> Result<Option<String>, DomainError> {
    modes.as_ref().map(|m| encode("applies_to_modes", m)).transpose()
}

pub(crate) fn modes_from_json(text: Option<String>) -> Result<Option<Vec<Mode>>, DomainError> {
    text.map(|t| decode("applies_to_modes", &t)).transpose()
}

pub(crate) fn personas_to_json(
    personas: &Option<Vec<Persona>>,
) -> Result<Option<String>, DomainError> {
    personas
        .as_ref()
        .map(|p| encode("applies_to_personas", p))
        .transpose()
}

pub(crate) fn personas_from_json(
    text: Option<String>,
) -> Result<Option<Vec<Persona>>, DomainError> {
    text.map(|t| decode("applies_to_personas", &t)).transpose()
}

pub(crate) fn kind_to_json(kind: &ConstraintKind) -> Result<String, DomainError> {
    encode("params", kind)
}

pub(crate) fn kind_from_json(text: &str) -> Result<ConstraintKind, DomainError> {
    decode("params", text)
}

pub(crate) fn preferences_to_json(preferences: &[Preference]) -> Result<String, DomainError> {
    encode("preferences", &preferences)
}

pub(crate) fn preferences_from_json(text: &str) -> Result<Vec<Preference>, DomainError> {
    decode("preferences", text)
}

pub(crate) fn constraints_to_json(constraints: &[Constraint]) -> Result<String, DomainError> {
    encode("constraints", &constraints)
}

pub(crate) fn constraints_from_json(text: &str) -> Result<Vec<Constraint>, DomainError> {
    decode("constraints", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ConstraintId, RiskLevel};
    use crate::domain::policy::Severity;

    #[test]
    fn modes_round_trip_as_snake_case_arrays() {
        let modes = Some(vec![Mode::Work, Mode::Finance]);

        let json = modes_to_json(&modes).unwrap().unwrap();
        assert_eq!(json, r#"["work","finance"]"#);
        assert_eq!(modes_from_json(Some(json)).unwrap(), modes);
    }

    #[test]
    fn unset_filters_map_to_null_columns() {
        assert_eq!(modes_to_json(&None).unwrap(), None);
        assert_eq!(modes_from_json(None).unwrap(), None);
        assert_eq!(personas_to_json(&None).unwrap(), None);
    }

    #[test]
    fn personas_round_trip() {
        let personas = Some(vec![Persona::Operator, Persona::Reflector]);

        let json = personas_to_json(&personas).unwrap().unwrap();
        assert_eq!(personas_from_json(Some(json)).unwrap(), personas);
    }

    #[test]
    fn constraint_kind_keeps_its_type_tag_in_params() {
        let kind = ConstraintKind::MaxRisk {
            max_risk: RiskLevel::High,
        };

        let json = kind_to_json(&kind).unwrap();
        assert!(json.contains("\"type\":\"max_risk\""));
        assert_eq!(kind_from_json(&json).unwrap(), kind);
    }

    #[test]
    fn malformed_params_column_is_a_database_error() {
        let err = kind_from_json("{not json").unwrap_err();
        assert_eq!(err.code, crate::domain::foundation::ErrorCode::DatabaseError);
    }

    #[test]
    fn profile_lists_round_trip() {
        let preferences = vec![Preference::new("theme", "dark")];
        let constraints = vec![Constraint::new(
            ConstraintId::new("c-1").unwrap(),
            Severity::Soft,
            ConstraintKind::Other {
                note: "nudge".to_string(),
            },
            "A nudge",
        )];

        let prefs_json = preferences_to_json(&preferences).unwrap();
        let constraints_json = constraints_to_json(&constraints).unwrap();

        assert_eq!(preferences_from_json(&prefs_json).unwrap(), preferences);
        assert_eq!(
            constraints_from_json(&constraints_json).unwrap(),
            constraints
        );
    }
}
