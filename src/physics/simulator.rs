//! Page-turn physics simulator.
//!
//! Owns the [`PhysicsState`], the material constants and the curl mesh. The
//! coordinator drives it only through the public operations below; none of
//! them fail, and calls that make no sense in the current phase are ignored.

use crate::config::TurnConfiguration;
use crate::geometry::PageMesh;
use crate::state::{PhysicsState, TurnDirection, TurnPhase};

use super::integrator::{PaperMaterial, SemiImplicitEuler};

/// Release speed (progress per second) that commits regardless of position
pub const RELEASE_VELOCITY_THRESHOLD: f32 = 0.8;
/// Initial speed of a programmatic turn (progress per second)
pub const SEED_VELOCITY: f32 = 1.5;

/// Outcome of releasing a drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseDecision {
    /// Progress the page will animate to
    pub target: f32,
    /// Whether the target differs from the pre-drag rest position
    pub commits: bool,
}

/// What a single frame did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing to integrate (idle or dragging)
    Idle,
    /// Still animating
    Moving {
        progress: f32,
    },
    /// Reached the target this frame; reported exactly once per animation
    Settled {
        direction: TurnDirection,
        committed: bool,
    },
    /// Left the completed phase and returned to idle
    Finished,
}

/// Simulation diagnostics
#[derive(Debug, Clone)]
pub struct PhysicsDiagnostics {
    pub phase: &'static str,
    pub progress: f32,
    pub velocity: f32,
    pub step_count: u64,
    pub simulated_time_sec: f64,
    pub peak_speed: f32,
    pub bounce_count: u64,
    pub curl_amount: f32,
}

impl PhysicsDiagnostics {
    /// Print a summary to stdout
    pub fn print_summary(&self) {
        println!("=== Page Turn Physics ===");
        println!("Phase: {}", self.phase);
        println!("Progress: {:.4} (velocity {:.4}/s)", self.progress, self.velocity);
        println!("Steps: {} ({:.3} s simulated)", self.step_count, self.simulated_time_sec);
        println!("Peak speed: {:.3}/s, bounces: {}", self.peak_speed, self.bounce_count);
        println!("Curl amount: {:.4}", self.curl_amount);
    }
}

/// Spring/damper/gravity/drag simulator for one turning page
#[derive(Debug, Clone)]
pub struct PhysicsSimulator {
    state: PhysicsState,
    material: PaperMaterial,
    integrator: SemiImplicitEuler,
    mesh: PageMesh,
}

impl PhysicsSimulator {
    /// Create an idle simulator; the mesh is allocated here once
    pub fn new(config: &TurnConfiguration) -> Self {
        let config = config.sanitized();
        Self {
            state: PhysicsState::new(),
            material: PaperMaterial::from_config(&config),
            integrator: SemiImplicitEuler::new(),
            mesh: PageMesh::new(config.mesh_resolution),
        }
    }

    /// Replace material constants; the mesh is rebuilt only when its
    /// resolution changes
    pub fn apply_configuration(&mut self, config: &TurnConfiguration) {
        let config = config.sanitized();
        self.material = PaperMaterial::from_config(&config);
        if config.mesh_resolution != self.mesh.resolution() {
            self.mesh = PageMesh::new(config.mesh_resolution);
        }
        self.refresh_mesh();
    }

    // === Accessors ===

    pub fn state(&self) -> &PhysicsState {
        &self.state
    }

    pub fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    pub fn progress(&self) -> f32 {
        self.state.progress
    }

    pub fn velocity(&self) -> f32 {
        self.state.velocity
    }

    pub fn direction(&self) -> TurnDirection {
        self.state.direction
    }

    pub fn material(&self) -> &PaperMaterial {
        &self.material
    }

    pub fn mesh(&self) -> &PageMesh {
        &self.mesh
    }

    pub fn is_animating(&self) -> bool {
        self.state.phase.is_animating()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.phase.is_dragging()
    }

    // === Drag ===

    /// Start following a drag; any running animation stops immediately
    pub fn begin_drag(&mut self, direction: TurnDirection, initial_progress: f32) {
        let progress = initial_progress.clamp(0.0, 1.0);
        self.state = PhysicsState {
            progress,
            velocity: 0.0,
            target: progress,
            direction,
            rest: direction.rest_progress(),
            phase: TurnPhase::Dragging { progress },
        };
        self.refresh_mesh();
    }

    /// Move the dragged page; ignored unless dragging
    pub fn update_drag(&mut self, progress: f32) {
        if !self.is_dragging() {
            log::trace!("update_drag ignored while {}", self.state.phase.label());
            return;
        }
        let progress = progress.clamp(0.0, 1.0);
        self.state.progress = progress;
        self.state.target = progress;
        self.state.phase = TurnPhase::Dragging { progress };
        self.refresh_mesh();
    }

    /// Release the drag and pick a target.
    ///
    /// Position past the middle or a fast flick toward 1 commits to 1;
    /// otherwise position before the middle or a fast flick toward 0 goes to 0.
    /// Exactly at the middle with a slow release the page returns to rest.
    /// Returns `None` when not dragging.
    pub fn end_drag(&mut self, release_velocity: f32) -> Option<ReleaseDecision> {
        if !self.is_dragging() {
            log::trace!("end_drag ignored while {}", self.state.phase.label());
            return None;
        }
        let progress = self.state.progress;
        let velocity = if release_velocity.is_finite() { release_velocity } else { 0.0 };

        let target = if progress > 0.5 || velocity > RELEASE_VELOCITY_THRESHOLD {
            1.0
        } else if progress < 0.5 || velocity < -RELEASE_VELOCITY_THRESHOLD {
            0.0
        } else {
            self.state.rest
        };

        self.state.target = target;
        self.state.velocity = velocity;
        self.state.phase = TurnPhase::Animating;

        Some(ReleaseDecision {
            target,
            commits: self.state.commits(),
        })
    }

    // === Programmatic turns ===

    /// Animate a full turn without a drag; ignored while dragging or animating
    pub fn start_turn(&mut self, direction: TurnDirection) -> bool {
        if self.is_dragging() || self.is_animating() {
            log::trace!("start_turn ignored while {}", self.state.phase.label());
            return false;
        }
        let rest = direction.rest_progress();
        self.state = PhysicsState {
            progress: rest,
            velocity: direction.sign() * SEED_VELOCITY,
            target: direction.committed_progress(),
            direction,
            rest,
            phase: TurnPhase::Animating,
        };
        self.refresh_mesh();
        true
    }

    /// Send the page back to where it rested before the turn
    pub fn cancel_turn(&mut self) -> bool {
        match self.state.phase {
            TurnPhase::Dragging { .. } | TurnPhase::Animating => {
                self.state.target = self.state.rest;
                self.state.phase = TurnPhase::Animating;
                true
            }
            TurnPhase::Idle | TurnPhase::Completed => false,
        }
    }

    // === Frame ===

    /// Advance one display frame
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        match self.state.phase {
            TurnPhase::Completed => {
                self.settle_to_idle();
                TickOutcome::Finished
            }
            TurnPhase::Animating => {
                let report = self.integrator.step(&self.material, &mut self.state, dt);
                if report.settled {
                    self.state.progress = self.state.target;
                    self.state.velocity = 0.0;
                    self.state.phase = TurnPhase::Completed;
                    self.refresh_mesh();
                    TickOutcome::Settled {
                        direction: self.state.direction,
                        committed: self.state.commits(),
                    }
                } else {
                    self.refresh_mesh();
                    TickOutcome::Moving {
                        progress: self.state.progress,
                    }
                }
            }
            TurnPhase::Idle | TurnPhase::Dragging { .. } => TickOutcome::Idle,
        }
    }

    /// Back to idle with a flat page and cleared statistics
    pub fn reset(&mut self) {
        self.settle_to_idle();
        self.integrator.reset();
    }

    pub fn diagnostics(&self) -> PhysicsDiagnostics {
        PhysicsDiagnostics {
            phase: self.state.phase.label(),
            progress: self.state.progress,
            velocity: self.state.velocity,
            step_count: self.integrator.state.step_count,
            simulated_time_sec: self.integrator.state.time_sec,
            peak_speed: self.integrator.state.peak_speed,
            bounce_count: self.integrator.state.bounce_count,
            curl_amount: self.mesh.curl_amount(),
        }
    }

    fn settle_to_idle(&mut self) {
        let direction = self.state.direction;
        self.state = PhysicsState {
            direction,
            ..PhysicsState::new()
        };
        self.mesh.reset();
    }

    fn refresh_mesh(&mut self) {
        self.mesh
            .deform(self.state.progress, self.state.direction, self.material.stiffness);
    }
}
