//! Waypoint Engine - Policy and Persona Decision Engine
//!
//! This crate implements the decision core of the Waypoint life-OS:
//! constraint evaluation for proposed actions, validated mode transitions,
//! persona classification from ambient signals, and a confidence-gated
//! preference learning loop.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
