//! Configuration module for page-turn settings.
//!
//! The configuration is a single declarative value supplied by the host and
//! replaceable at runtime.

mod parameters;

pub use parameters::{
    AnimationMode, TurnConfiguration, DEFAULT_MESH_RESOLUTION, MAX_GRAVITY,
    MIN_AUTO_ADVANCE_INTERVAL_SEC, MIN_GRAVITY,
};
