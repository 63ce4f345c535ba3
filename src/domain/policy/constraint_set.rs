//! ConstraintSet - a named, prioritized bundle of constraints.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::constraint::Constraint;
use crate::domain::foundation::{ConstraintSetId, Mode, Persona, Timestamp, UserId};

/// Applicability filter deciding which mode/persona contexts a set covers.
///
/// An unset list means "applies to all". Filtering happens before any
/// constraint in the set is evaluated: a set that does not match the
/// current context contributes zero constraints regardless of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Applicability {
    pub modes: Option<Vec<Mode>>,
    pub personas: Option<Vec<Persona>>,
}

impl Applicability {
    /// Applies to every mode and persona.
    pub fn any() -> Self {
        Self::default()
    }

    /// Applies only to the given modes.
    pub fn for_modes(modes: impl Into<Vec<Mode>>) -> Self {
        Self {
            modes: Some(modes.into()),
            personas: None,
        }
    }

    /// Restricts the filter to the given personas.
    pub fn with_personas(mut self, personas: impl Into<Vec<Persona>>) -> Self {
        self.personas = Some(personas.into());
        self
    }

    /// Returns true if the filter matches the given context.
    ///
    /// An unset persona on the context matches any persona filter.
    pub fn matches(&self, mode: Mode, persona: Option<Persona>) -> bool {
        let mode_ok = match &self.modes {
            None => true,
            Some(modes) => modes.contains(&mode),
        };
        let persona_ok = match (&self.personas, persona) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(personas), Some(p)) => personas.contains(&p),
        };
        mode_ok && persona_ok
    }
}

/// Named, prioritized bag of constraints scoped by applicability.
///
/// Owned by a user, or by nobody for system-wide defaults. Higher
/// priority sets are evaluated first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub id: ConstraintSetId,
    /// `None` marks a system-wide default set.
    pub owner: Option<UserId>,
    pub name: String,
    pub priority: i32,
    pub applies_to: Applicability,
    /// Declaration order is evaluation order within the set.
    pub constraints: Vec<Constraint>,
    pub updated_at: Timestamp,
}

impl ConstraintSet {
    /// Creates a new set owned by a user.
    pub fn new(owner: UserId, name: impl Into<String>, priority: i32) -> Self {
        Self {
            id: ConstraintSetId::new(),
            owner: Some(owner),
            name: name.into(),
            priority,
            applies_to: Applicability::any(),
            constraints: Vec::new(),
            updated_at: Timestamp::now(),
        }
    }

    /// Creates a new system-wide default set.
    pub fn system(name: impl Into<String>, priority: i32) -> Self {
        Self {
            id: ConstraintSetId::new(),
            owner: None,
            name: name.into(),
            priority,
            applies_to: Applicability::any(),
            constraints: Vec::new(),
            updated_at: Timestamp::now(),
        }
    }

    /// Sets the applicability filter.
    pub fn with_applicability(mut self, applies_to: Applicability) -> Self {
        self.applies_to = applies_to;
        self
    }

    /// Appends a constraint, preserving declaration order.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Returns true if this set applies to the given context.
    pub fn applies_to(&self, mode: Mode, persona: Option<Persona>) -> bool {
        self.applies_to.matches(mode, persona)
    }

    /// Returns the active constraints of this set in declaration order.
    pub fn active_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.active)
    }

    /// Comparator for priority-descending ordering.
    ///
    /// Every backend must produce this ordering; a stable sort with this
    /// comparator preserves insertion order between equal priorities.
    pub fn priority_desc(a: &ConstraintSet, b: &ConstraintSet) -> Ordering {
        b.priority.cmp(&a.priority)
    }
}
