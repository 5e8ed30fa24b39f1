//! Turn configuration with clamping and JSON persistence.
//!
//! A configuration is immutable per session and replaced as a whole. Every
//! consumer reads the [`TurnConfiguration::sanitized`] copy, so out-of-range
//! values are clamped rather than rejected.

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::Result;

/// Lower bound for gravity (unit-free)
pub const MIN_GRAVITY: f32 = 0.1;
/// Upper bound for gravity (unit-free)
pub const MAX_GRAVITY: f32 = 10.0;
/// Shortest allowed auto-advance interval (seconds)
pub const MIN_AUTO_ADVANCE_INTERVAL_SEC: f32 = 0.5;
/// Default mesh resolution (points per side)
pub const DEFAULT_MESH_RESOLUTION: usize = 20;

/// Presentation strategy used for a page turn.
///
/// The core does not render; the mode only decides whether programmatic
/// turns animate at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnimationMode {
    /// Paper-curl deformation driven by the mesh
    #[default]
    Curl,
    /// Flat horizontal slide
    Slide,
    /// Rotating cube faces
    Cube,
    /// No animation, pages swap instantly
    None,
}

impl AnimationMode {
    /// Whether turns in this mode run through the physics simulator
    pub fn is_animated(self) -> bool {
        !matches!(self, AnimationMode::None)
    }
}

/// Complete page-turn configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfiguration {
    // === Paper physics ===
    /// Resistance of the sheet to bending and strength of the return spring (0-1)
    pub paper_stiffness: f32,
    /// Mass of the sheet (0-1), floored at 0.1 inside the integrator
    pub page_weight: f32,
    /// Quadratic drag coefficient (0-1)
    pub air_resistance: f32,
    /// Gravity pulling the sheet toward its target (unit-free, positive)
    pub gravity: f32,
    /// Velocity damping and boundary bounce retention (0-1)
    pub elasticity: f32,

    // === Feedback ===
    /// Play paper sounds
    pub sound_enabled: bool,
    /// Sound volume (0-1)
    pub sound_volume: f32,
    /// Emit haptic pulses
    pub haptics_enabled: bool,
    /// Haptic intensity (0-1)
    pub haptic_intensity: f32,

    // === Presentation ===
    /// Draw the lifting shadow
    pub shadows_enabled: bool,
    /// Turn presentation strategy
    pub animation_mode: AnimationMode,
    /// Mesh points per side
    pub mesh_resolution: usize,

    // === Auto-advance ===
    /// Turn pages automatically
    pub auto_advance_enabled: bool,
    /// Seconds between automatic turns
    pub auto_advance_interval_sec: f32,
}

impl Default for TurnConfiguration {
    fn default() -> Self {
        Self {
            paper_stiffness: 0.5,
            page_weight: 0.5,
            air_resistance: 0.3,
            gravity: 1.0,
            elasticity: 0.5,

            sound_enabled: true,
            sound_volume: 0.7,
            haptics_enabled: true,
            haptic_intensity: 0.6,

            shadows_enabled: true,
            animation_mode: AnimationMode::Curl,
            mesh_resolution: DEFAULT_MESH_RESOLUTION,

            auto_advance_enabled: false,
            auto_advance_interval_sec: 10.0,
        }
    }
}

impl TurnConfiguration {
    /// Return a copy with every tunable clamped to its valid range.
    ///
    /// NaN scalars fall back to the default value.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            paper_stiffness: unit(self.paper_stiffness, defaults.paper_stiffness),
            page_weight: unit(self.page_weight, defaults.page_weight),
            air_resistance: unit(self.air_resistance, defaults.air_resistance),
            gravity: finite_or(self.gravity, defaults.gravity).clamp(MIN_GRAVITY, MAX_GRAVITY),
            elasticity: unit(self.elasticity, defaults.elasticity),
            sound_enabled: self.sound_enabled,
            sound_volume: unit(self.sound_volume, defaults.sound_volume),
            haptics_enabled: self.haptics_enabled,
            haptic_intensity: unit(self.haptic_intensity, defaults.haptic_intensity),
            shadows_enabled: self.shadows_enabled,
            animation_mode: self.animation_mode,
            mesh_resolution: self.mesh_resolution.clamp(2, 64),
            auto_advance_enabled: self.auto_advance_enabled,
            auto_advance_interval_sec: finite_or(
                self.auto_advance_interval_sec,
                defaults.auto_advance_interval_sec,
            )
            .max(MIN_AUTO_ADVANCE_INTERVAL_SEC),
        }
    }

    /// Builder: replace the animation mode
    pub fn with_animation_mode(mut self, mode: AnimationMode) -> Self {
        self.animation_mode = mode;
        self
    }

    /// Builder: enable auto-advance with the given interval
    pub fn with_auto_advance(mut self, interval_sec: f32) -> Self {
        self.auto_advance_enabled = true;
        self.auto_advance_interval_sec = interval_sec;
        self
    }

    /// Builder: paper physics in one call (stiffness, weight, elasticity)
    pub fn with_paper(mut self, stiffness: f32, weight: f32, elasticity: f32) -> Self {
        self.paper_stiffness = stiffness;
        self.page_weight = weight;
        self.elasticity = elasticity;
        self
    }

    /// Load from a JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    log::info!("Loaded turn configuration from {:?}", path.as_ref());
                    config.sanitized()
                }
                Err(e) => {
                    log::warn!("Failed to parse turn configuration: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Turn configuration file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Write the sanitized configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, &self.sanitized())?;

        log::info!("Turn configuration saved: {}", path.as_ref().display());
        Ok(())
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn unit(value: f32, fallback: f32) -> f32 {
    finite_or(value, fallback).clamp(0.0, 1.0)
}
