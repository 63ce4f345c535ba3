//! Modes module - static mode descriptors.
//!
//! The mode service that owns the current mode lives in the application
//! layer; this module is pure data.

mod descriptor;

pub use descriptor::ModeDescriptor;
