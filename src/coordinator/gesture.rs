//! Drag gesture adapter.
//!
//! Converts pixel coordinates from a host gesture recognizer into the
//! simulator's normalized progress. Moving left turns forward, moving right
//! turns backward; the direction is locked by the first non-zero movement.

use crate::state::TurnDirection;

/// Horizontal movement (in viewport widths) needed to resolve a direction
const DIRECTION_DEAD_ZONE: f32 = 1e-4;

/// Where a drag sits after an update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    /// No direction resolved yet
    Pending,
    /// Direction resolved by this update
    Resolved(TurnDirection),
    /// Direction points past the first or last page; the page stays at rest
    Blocked(TurnDirection),
    /// The leaf follows the finger
    Following {
        /// Leaf progress for the simulator
        progress: f32,
        /// How far the leaf has been pulled from rest (0-1)
        drag_fraction: f32,
    },
}

/// One drag gesture from touch-down to release
#[derive(Debug, Clone)]
pub struct DragGesture {
    /// Horizontal position at touch-down (points)
    pub start_x: f32,
    direction: Option<TurnDirection>,
    blocked: bool,
    /// Last positive viewport width seen, used to normalise release velocity
    viewport_width: Option<f32>,
    drag_fraction: f32,
}

impl DragGesture {
    pub fn new(start_x: f32) -> Self {
        Self {
            start_x,
            direction: None,
            blocked: false,
            viewport_width: None,
            drag_fraction: 0.0,
        }
    }

    pub fn direction(&self) -> Option<TurnDirection> {
        self.direction
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Last pull fraction reported by `update`
    pub fn drag_fraction(&self) -> f32 {
        self.drag_fraction
    }

    /// Lock the direction, marking it blocked when no page lies that way
    pub fn resolve(&mut self, direction: TurnDirection, blocked: bool) {
        self.direction = Some(direction);
        self.blocked = blocked;
    }

    /// Feed a finger position.
    ///
    /// `can_turn` answers whether a page exists in the given direction and is
    /// consulted once, when the direction is resolved.
    pub fn update(
        &mut self,
        current_x: f32,
        start_x: f32,
        viewport_width: f32,
        can_turn: impl FnOnce(TurnDirection) -> bool,
    ) -> DragUpdate {
        if !viewport_width.is_finite() || viewport_width <= 0.0 || !current_x.is_finite() {
            return match self.direction {
                Some(direction) if self.blocked => DragUpdate::Blocked(direction),
                _ => DragUpdate::Pending,
            };
        }
        self.viewport_width = Some(viewport_width);
        let delta = (start_x - current_x) / viewport_width;

        let direction = match self.direction {
            Some(direction) => direction,
            None => {
                if delta.abs() < DIRECTION_DEAD_ZONE {
                    return DragUpdate::Pending;
                }
                let direction = if delta > 0.0 {
                    TurnDirection::Forward
                } else {
                    TurnDirection::Backward
                };
                let blocked = !can_turn(direction);
                self.resolve(direction, blocked);
                return if blocked {
                    DragUpdate::Blocked(direction)
                } else {
                    self.follow(direction, delta);
                    DragUpdate::Resolved(direction)
                };
            }
        };

        if self.blocked {
            return DragUpdate::Blocked(direction);
        }
        let progress = self.follow(direction, delta);
        DragUpdate::Following {
            progress,
            drag_fraction: self.drag_fraction,
        }
    }

    /// Leaf progress for the current pull in the locked direction
    pub fn progress(&self) -> f32 {
        match self.direction {
            Some(TurnDirection::Backward) => 1.0 - self.drag_fraction,
            _ => self.drag_fraction,
        }
    }

    /// Convert a pixel release speed into progress per second.
    ///
    /// A flick toward `flick` moves the leaf the way that direction pulls it:
    /// leftward (forward) raises progress, rightward (backward) lowers it.
    pub fn release_velocity(&self, pixel_velocity: f32, flick: TurnDirection) -> f32 {
        match self.viewport_width {
            Some(width) if pixel_velocity.is_finite() => pixel_velocity.abs() / width * flick.sign(),
            _ => 0.0,
        }
    }

    fn follow(&mut self, direction: TurnDirection, delta: f32) -> f32 {
        let pulled = match direction {
            TurnDirection::Forward => delta,
            TurnDirection::Backward => -delta,
        };
        self.drag_fraction = pulled.clamp(0.0, 1.0);
        self.progress()
    }
}
