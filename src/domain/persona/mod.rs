//! Persona module - classification from ambient signals.
//!
//! Precedence: explicit persona, stored override, sticky recency,
//! weighted rule scoring, fixed default.

mod classifier;
mod overrides;
mod rules;
mod signals;

pub use classifier::{
    ClassificationSource, PersonaClassification, PersonaClassifier, DEFAULT_CONFIDENCE,
    RECENT_PERSONA_TTL_SECS,
};
pub use overrides::{OverrideScope, PersonaOverride};
pub use signals::{ClassificationContext, PersonaObservation};
