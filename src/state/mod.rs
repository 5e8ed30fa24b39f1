//! State management for the page-turn engine.
//!
//! Contains the data structures describing the reading position and the
//! mechanical state of the turning page. Each structure has exactly one
//! owner: the coordinator owns [`TurnState`], the simulator owns
//! [`PhysicsState`].

mod physics;
mod turn;

pub use physics::{PhysicsState, TurnPhase};
pub use turn::{TurnDirection, TurnState};
