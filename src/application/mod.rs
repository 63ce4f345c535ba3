//! Application layer - services orchestrating domain logic over ports.
//!
//! - `DecisionEngine` - the facade the product's request handlers call
//! - `ModeService` - owns the current mode and validated transitions
//! - `LearningApplier` - applies learning actions to stored profiles

mod engine;
mod learning_applier;
mod mode_service;

pub use engine::DecisionEngine;
pub use learning_applier::{BatchOutcome, LearningApplier, LearningThresholds};
pub use mode_service::{ModeChangeRequest, ModeService, SetModeOptions, SetModeOutcome};
