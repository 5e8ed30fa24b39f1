//! Time integration for the page-turn degree of freedom.
//!
//! Implements semi-implicit (symplectic) Euler on the scalar turn progress:
//! 1. a(t) = ΣF(p, v) / m
//! 2. v(t + dt) = v(t) + dt * a(t)
//! 3. p(t + dt) = p(t) + dt * v(t + dt)
//!
//! Four additive forces act on the progress coordinate:
//! - gravity  `g · m · sin(p·π/2)`, toward the target
//! - drag     `-c_air · v·|v|` (quadratic, opposes motion)
//! - spring   `k · (target - p)`
//! - damping  `-e · v`
//!
//! The [0,1] range is enforced with a lossy bounce so the integration always
//! terminates.

use crate::config::TurnConfiguration;
use crate::state::PhysicsState;

/// Largest timestep accepted per frame (seconds); longer frames are clamped
pub const MAX_STEP_SEC: f32 = 1.0 / 30.0;
/// Floor applied to page weight before it is used as a mass
pub const MIN_MASS: f32 = 0.1;

/// Gravity force at unit gravity, unit mass, fully lifted page
pub const GRAVITY_SCALE: f32 = 6.0;
/// Quadratic drag coefficient at unit air resistance
pub const DRAG_SCALE: f32 = 2.0;
/// Spring constant at unit stiffness
pub const SPRING_SCALE: f32 = 60.0;
/// Linear damping coefficient at unit elasticity
pub const DAMPING_SCALE: f32 = 1.5;

/// Fraction of `elasticity` kept as rebound speed at the range boundary
pub const BOUNCE_RETENTION: f32 = 0.3;
/// Velocities below this are zeroed
pub const VELOCITY_EPSILON: f32 = 1e-3;
/// Settlement speed threshold
pub const SETTLE_VELOCITY: f32 = 0.05;
/// Settlement distance threshold
pub const SETTLE_DISTANCE: f32 = 0.01;

/// Material constants of the sheet, read from a sanitized configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperMaterial {
    /// Spring stiffness and curl attenuation (0-1)
    pub stiffness: f32,
    /// Page weight (0-1), floored at [`MIN_MASS`] when used as mass
    pub weight: f32,
    /// Quadratic drag (0-1)
    pub air_resistance: f32,
    /// Gravity (positive)
    pub gravity: f32,
    /// Damping and bounce retention (0-1)
    pub elasticity: f32,
}

impl PaperMaterial {
    pub fn from_config(config: &TurnConfiguration) -> Self {
        let config = config.sanitized();
        Self {
            stiffness: config.paper_stiffness,
            weight: config.page_weight,
            air_resistance: config.air_resistance,
            gravity: config.gravity,
            elasticity: config.elasticity,
        }
    }

    /// Effective mass used to convert force into acceleration
    pub fn mass(&self) -> f32 {
        self.weight.max(MIN_MASS)
    }
}

impl Default for PaperMaterial {
    fn default() -> Self {
        Self::from_config(&TurnConfiguration::default())
    }
}

/// Individual force terms of one step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceBreakdown {
    pub gravity: f32,
    pub drag: f32,
    pub spring: f32,
    pub damping: f32,
}

impl ForceBreakdown {
    pub fn total(&self) -> f32 {
        self.gravity + self.drag + self.spring + self.damping
    }
}

/// State tracking for the integrator
#[derive(Debug, Clone, Default)]
pub struct IntegratorState {
    /// Accumulated simulated time in seconds
    pub time_sec: f64,
    /// Number of steps taken
    pub step_count: u64,
    /// Largest speed observed (for stability monitoring)
    pub peak_speed: f32,
    /// Number of boundary reflections
    pub bounce_count: u64,
}

/// Result of a single integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Timestep actually used (after clamping)
    pub dt_sec: f32,
    /// Net acceleration applied
    pub acceleration: f32,
    /// Whether the step hit the 0 or 1 boundary
    pub bounced: bool,
    /// Whether the settlement condition holds after the step
    pub settled: bool,
}

/// Semi-implicit Euler integrator for the turn progress
#[derive(Debug, Clone, Default)]
pub struct SemiImplicitEuler {
    /// State tracking
    pub state: IntegratorState,
}

impl SemiImplicitEuler {
    /// Create a new integrator
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the force terms at the given state
    pub fn forces(
        &self,
        material: &PaperMaterial,
        progress: f32,
        velocity: f32,
        target: f32,
        dt: f32,
    ) -> ForceBreakdown {
        let mass = material.mass();
        let toward_target = if target > progress {
            1.0
        } else if target < progress {
            -1.0
        } else {
            0.0
        };

        let gravity = toward_target
            * material.gravity
            * mass
            * (progress * std::f32::consts::FRAC_PI_2).sin()
            * GRAVITY_SCALE;

        // Drag on its own must not reverse the motion within one step
        let drag_limit = velocity.abs() * mass / dt.max(f32::EPSILON);
        let drag = (-material.air_resistance * velocity * velocity.abs() * DRAG_SCALE)
            .clamp(-drag_limit, drag_limit);

        let spring = material.stiffness * (target - progress) * SPRING_SCALE;
        let damping = -material.elasticity * velocity * DAMPING_SCALE;

        ForceBreakdown {
            gravity,
            drag,
            spring,
            damping,
        }
    }

    /// Advance `state` by one frame of `dt` seconds
    pub fn step(&mut self, material: &PaperMaterial, state: &mut PhysicsState, dt: f32) -> StepReport {
        let dt = dt.clamp(0.0, MAX_STEP_SEC);

        let forces = self.forces(material, state.progress, state.velocity, state.target, dt);
        let acceleration = forces.total() / material.mass();

        state.velocity += acceleration * dt;
        state.progress += state.velocity * dt;
        self.state.peak_speed = self.state.peak_speed.max(state.velocity.abs());

        // Lossy bounce at the range boundary
        let mut bounced = false;
        if state.progress > 1.0 {
            state.progress = 1.0;
            state.velocity = -state.velocity.abs() * material.elasticity * BOUNCE_RETENTION;
            bounced = true;
        } else if state.progress < 0.0 {
            state.progress = 0.0;
            state.velocity = state.velocity.abs() * material.elasticity * BOUNCE_RETENTION;
            bounced = true;
        }
        if !state.progress.is_finite() {
            state.progress = state.target;
            state.velocity = 0.0;
        }

        // A rebound smaller than one frame of acceleration is resting contact
        let epsilon = if bounced {
            VELOCITY_EPSILON.max(acceleration.abs() * dt)
        } else {
            VELOCITY_EPSILON
        };
        if state.velocity.abs() < epsilon || !state.velocity.is_finite() {
            state.velocity = 0.0;
        }

        if bounced {
            self.state.bounce_count += 1;
        }
        self.state.step_count += 1;
        self.state.time_sec += dt as f64;

        StepReport {
            dt_sec: dt,
            acceleration,
            bounced,
            settled: Self::is_settled(state),
        }
    }

    /// Low velocity and near target
    pub fn is_settled(state: &PhysicsState) -> bool {
        state.velocity.abs() < SETTLE_VELOCITY && (state.progress - state.target).abs() < SETTLE_DISTANCE
    }

    /// Clear statistics
    pub fn reset(&mut self) {
        self.state = IntegratorState::default();
    }
}
