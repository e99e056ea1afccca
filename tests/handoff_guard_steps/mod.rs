//! Step definitions for handoff guard behaviour scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
