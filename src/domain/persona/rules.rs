//! Fixed weighted rule table for persona classification.
//!
//! Four rule families, evaluated in a fixed order: mode (dominant),
//! device, feature keyword, time of day, plus a location-hint bias.
//! Every match contributes its weight to the target persona's score and
//! a human-readable reason.

use once_cell::sync::Lazy;

use super::signals::ClassificationContext;
use crate::domain::foundation::{DeviceClass, Persona};
use crate::domain::modes::ModeDescriptor;

pub(crate) const MODE_WEIGHT: f64 = 3.0;
pub(crate) const DEVICE_WEIGHT: f64 = 2.0;
pub(crate) const FEATURE_WEIGHT: f64 = 1.5;
pub(crate) const NIGHT_WEIGHT: f64 = 1.0;
pub(crate) const BUSINESS_HOURS_WEIGHT: f64 = 0.5;
pub(crate) const LOCATION_WEIGHT: f64 = 1.0;

/// One rule match.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RuleHit {
    pub persona: Persona,
    pub weight: f64,
    pub reason: String,
}

/// Case-insensitive keywords matched against the active feature.
static FEATURE_KEYWORDS: Lazy<Vec<(&'static str, Persona)>> = Lazy::new(|| {
    vec![
        ("inbox", Persona::Operator),
        ("mail", Persona::Operator),
        ("contact", Persona::Caretaker),
        ("crm", Persona::Caretaker),
        ("finance", Persona::Planner),
        ("budget", Persona::Planner),
        ("ledger", Persona::Planner),
        ("journal", Persona::Reflector),
        ("review", Persona::Reflector),
    ]
});

fn device_bias(device: DeviceClass) -> Option<Persona> {
    match device {
        DeviceClass::Workstation => Some(Persona::Operator),
        DeviceClass::Personal => Some(Persona::Caretaker),
        DeviceClass::Shared => None,
    }
}

/// Evaluates the whole table against a context.
pub(crate) fn evaluate_rules(ctx: &ClassificationContext) -> Vec<RuleHit> {
    let mut hits = Vec::new();

    if let Some(mode) = ctx.mode {
        let persona = ModeDescriptor::for_mode(mode).home_persona;
        hits.push(RuleHit {
            persona,
            weight: MODE_WEIGHT,
            reason: format!("Mode '{}' leans {}", mode, persona),
        });
    }

    if let Some(device) = ctx.device {
        if let Some(persona) = device_bias(device) {
            hits.push(RuleHit {
                persona,
                weight: DEVICE_WEIGHT,
                reason: format!("Device '{}' leans {}", device, persona),
            });
        }
    }

    if let Some(feature) = &ctx.active_feature {
        let feature_lower = feature.to_lowercase();
        for (keyword, persona) in FEATURE_KEYWORDS.iter() {
            if feature_lower.contains(keyword) {
                hits.push(RuleHit {
                    persona: *persona,
                    weight: FEATURE_WEIGHT,
                    reason: format!("Active feature '{}' mentions '{}'", feature, keyword),
                });
            }
        }
    }

    if let Some(hour) = ctx.local_hour {
        if hour >= 22 || hour < 5 {
            hits.push(RuleHit {
                persona: Persona::Reflector,
                weight: NIGHT_WEIGHT,
                reason: "Night hours lean reflector".to_string(),
            });
        } else if (9..17).contains(&hour) {
            hits.push(RuleHit {
                persona: Persona::Operator,
                weight: BUSINESS_HOURS_WEIGHT,
                reason: "Business hours lean operator".to_string(),
            });
        }
    }

    if let Some(hint) = &ctx.location_hint {
        let hint_lower = hint.to_lowercase();
        let bias = if hint_lower.contains("home") {
            Some(Persona::Caretaker)
        } else if hint_lower.contains("office") {
            Some(Persona::Operator)
        } else {
            None
        };
        if let Some(persona) = bias {
            hits.push(RuleHit {
                persona,
                weight: LOCATION_WEIGHT,
                reason: format!("Location hint '{}' leans {}", hint, persona),
            });
        }
    }

    hits
}
