//! Weighted persona classifier with overrides and sticky recency.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use super::overrides::{OverrideBook, PersonaOverride};
use super::rules::evaluate_rules;
use super::signals::ClassificationContext;
use crate::domain::foundation::{DomainError, Persona, SessionId, UserId};

/// How long a recent persona stays sticky, in seconds.
pub const RECENT_PERSONA_TTL_SECS: u64 = 300;

/// Confidence reported when no signal fired at all.
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// Confidence reported for a sticky recent persona.
const STICKY_CONFIDENCE: f64 = 0.9;

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Explicit,
    Inferred,
    Default,
}

/// Result of one classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaClassification {
    pub persona: Persona,
    /// 0.0-1.0.
    pub confidence: f64,
    /// Ordered explanations for the outcome.
    pub reasons: Vec<String>,
    /// Normalized score distribution; present only for the scored path.
    pub distribution: Option<HashMap<Persona, f64>>,
    pub source: ClassificationSource,
    /// True when a stored override decided the outcome.
    pub overridden: bool,
}

/// Classifies the active persona from ambient signals.
///
/// Pure given fixed override and history state: the same context always
/// yields the same result, and classification never mutates anything.
#[derive(Debug)]
pub struct PersonaClassifier {
    overrides: RwLock<OverrideBook>,
    recency_ttl_secs: u64,
}

impl PersonaClassifier {
    /// Creates a classifier with the standard 300 second sticky window.
    pub fn new() -> Self {
        Self::with_recency_ttl(RECENT_PERSONA_TTL_SECS)
    }

    /// Creates a classifier with a custom sticky window.
    pub fn with_recency_ttl(recency_ttl_secs: u64) -> Self {
        Self {
            overrides: RwLock::new(OverrideBook::default()),
            recency_ttl_secs,
        }
    }

    /// Classifies the persona for a context.
    ///
    /// Precedence: explicit persona, stored override, sticky recency,
    /// weighted rules, fixed default.
    pub fn classify(
        &self,
        ctx: &ClassificationContext,
    ) -> Result<PersonaClassification, DomainError> {
        ctx.validate()?;

        if let Some(persona) = ctx.explicit_persona {
            return Ok(PersonaClassification {
                persona,
                confidence: 1.0,
                reasons: vec!["Explicit persona on request".to_string()],
                distribution: None,
                source: ClassificationSource::Explicit,
                overridden: false,
            });
        }

        let book = self.overrides.read().expect("override book lock poisoned");
        if let Some(entry) = book.find(ctx) {
            return Ok(PersonaClassification {
                persona: entry.persona,
                confidence: 1.0,
                reasons: vec!["Active persona override".to_string()],
                distribution: None,
                source: ClassificationSource::Explicit,
                overridden: true,
            });
        }
        drop(book);

        if let Some(observation) = ctx.newest_observation() {
            let age = ctx.observed_at.duration_since(&observation.observed_at);
            if age.num_seconds() < self.recency_ttl_secs as i64 {
                return Ok(PersonaClassification {
                    persona: observation.persona,
                    confidence: STICKY_CONFIDENCE,
                    reasons: vec!["Recently active persona".to_string()],
                    distribution: None,
                    source: ClassificationSource::Inferred,
                    overridden: false,
                });
            }
        }

        let hits = evaluate_rules(ctx);
        if hits.is_empty() {
            let uniform = 1.0 / Persona::all().len() as f64;
            let distribution = Persona::all().iter().map(|p| (*p, uniform)).collect();
            return Ok(PersonaClassification {
                persona: Persona::Reflector,
                confidence: DEFAULT_CONFIDENCE,
                reasons: vec!["No classification signals; using default persona".to_string()],
                distribution: Some(distribution),
                source: ClassificationSource::Default,
                overridden: false,
            });
        }

        let mut scores: HashMap<Persona, f64> =
            Persona::all().iter().map(|p| (*p, 0.0)).collect();
        for hit in &hits {
            *scores.get_mut(&hit.persona).expect("all personas scored") += hit.weight;
        }
        let total: f64 = scores.values().sum();

        // Winner by score; ties break by canonical persona order.
        let mut winner = Persona::all()[0];
        for persona in Persona::all() {
            if scores[persona] > scores[&winner] {
                winner = *persona;
            }
        }
        let top = scores[&winner];
        let runner_up = Persona::all()
            .iter()
            .filter(|p| **p != winner)
            .map(|p| scores[p])
            .fold(0.0, f64::max);

        let confidence = f64::min(1.0, (top - runner_up) / total + 0.5);
        let distribution = scores.iter().map(|(p, s)| (*p, s / total)).collect();
        let reasons = hits.into_iter().map(|h| h.reason).collect();

        Ok(PersonaClassification {
            persona: winner,
            confidence,
            reasons,
            distribution: Some(distribution),
            source: ClassificationSource::Inferred,
            overridden: false,
        })
    }

    /// Installs an override; it is checked before rule scoring on every
    /// subsequent classification call.
    pub fn set_override(&self, entry: PersonaOverride) {
        self.overrides
            .write()
            .expect("override book lock poisoned")
            .set(entry);
    }

    /// Returns the most recently installed override for (user, session).
    pub fn override_for(
        &self,
        user_id: &UserId,
        session_id: Option<&SessionId>,
    ) -> Option<PersonaOverride> {
        self.overrides
            .read()
            .expect("override book lock poisoned")
            .get(user_id, session_id)
            .cloned()
    }

    /// Clears overrides for a user (all of them, or one session's).
    pub fn clear_override(&self, user_id: &UserId, session_id: Option<&SessionId>) {
        self.overrides
            .write()
            .expect("override book lock poisoned")
            .clear(user_id, session_id);
    }
}

impl Default for PersonaClassifier {
    fn default() -> Self {
        Self::new()
    }
}
