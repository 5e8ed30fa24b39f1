//! Physics state data structures.
//!
//! Represents the single degree of freedom of a turning page and the phase
//! tag of the simulator that owns it.

use super::TurnDirection;

/// Phase of the page-turn simulation
///
/// Dragging and animating are variants of one enum, so they can never be
/// active at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TurnPhase {
    /// At rest, no turn in progress
    #[default]
    Idle,
    /// Following a finger; carries the last reported progress
    Dragging {
        /// Drag progress (0-1)
        progress: f32,
    },
    /// Integrating toward the target every frame
    Animating,
    /// Settled on the target for one frame before returning to idle
    Completed,
}

impl TurnPhase {
    /// Whether a drag gesture owns the page
    pub fn is_dragging(&self) -> bool {
        matches!(self, TurnPhase::Dragging { .. })
    }

    /// Whether the frame ticker must keep running
    pub fn is_animating(&self) -> bool {
        matches!(self, TurnPhase::Animating)
    }

    /// Short label for logs and diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Dragging { .. } => "dragging",
            TurnPhase::Animating => "animating",
            TurnPhase::Completed => "completed",
        }
    }
}

/// Mechanical state of the turning page
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsState {
    /// Turn progress (0 = flat on the right, 1 = flat on the left)
    pub progress: f32,
    /// Progress velocity (progress units per second)
    pub velocity: f32,
    /// Progress the integrator is pulling toward
    pub target: f32,
    /// Direction of the turn in flight
    pub direction: TurnDirection,
    /// Progress the page rested at before the turn began
    pub rest: f32,
    /// Current phase tag
    pub phase: TurnPhase,
}

impl PhysicsState {
    /// Idle state with the page flat
    pub fn new() -> Self {
        Self {
            progress: 0.0,
            velocity: 0.0,
            target: 0.0,
            direction: TurnDirection::Forward,
            rest: 0.0,
            phase: TurnPhase::Idle,
        }
    }

    /// Whether the turn resolves away from its rest position
    pub fn commits(&self) -> bool {
        (self.target - self.rest).abs() > f32::EPSILON
    }
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self::new()
    }
}
