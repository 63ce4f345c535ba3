//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the Waypoint decision domain.

mod device;
mod errors;
mod ids;
mod mode;
mod persona;
mod risk;
mod role;
mod state_machine;
mod timestamp;

pub use device::DeviceClass;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ConstraintId, ConstraintSetId, LearningActionId, PatternId, SessionId, UserId};
pub use mode::Mode;
pub use persona::Persona;
pub use risk::RiskLevel;
pub use role::Role;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
