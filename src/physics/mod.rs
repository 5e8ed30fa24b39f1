//! Physics simulation module for the turning page.
//!
//! This module implements:
//! - a scalar spring / damper / gravity / quadratic-drag force model
//! - semi-implicit Euler time integration with a lossy range boundary
//! - the page-turn simulator owning state and curl mesh
//!
//! A single degree of freedom (turn progress, 0..1) is integrated every
//! display frame; the mesh is recomputed from it after each step.

pub mod integrator;
pub mod simulator;

pub use integrator::{
    ForceBreakdown, IntegratorState, PaperMaterial, SemiImplicitEuler, StepReport,
};
pub use simulator::{
    PhysicsDiagnostics, PhysicsSimulator, ReleaseDecision, TickOutcome,
    RELEASE_VELOCITY_THRESHOLD, SEED_VELOCITY,
};
