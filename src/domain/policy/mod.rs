//! Policy module - constraints, constraint sets, and evaluation.
//!
//! The data shapes live in `constraint` and `constraint_set`; the pure
//! predicate table and decision logic live in `evaluator` (actions) and
//! `transition` (mode changes).

mod constraint;
mod constraint_set;
mod evaluator;
mod transition;

pub use constraint::{Constraint, ConstraintKind, HourWindow, Severity};
pub use constraint_set::{Applicability, ConstraintSet};
pub use evaluator::{
    evaluate_with_sets, trigger_reason, ActionContext, Decision, EvaluationResult,
    TriggerPolicy, TriggeredConstraint, NO_CONSTRAINTS_TRIGGERED,
};
pub use transition::{
    validate_transition, BlockedTransition, ModeTransitionContext, ModeTransitionResult,
    TransitionTrigger, SYSTEM_DEVICE_MODE_MISMATCH, SYSTEM_PERSONA_MODE_MISMATCH,
};
