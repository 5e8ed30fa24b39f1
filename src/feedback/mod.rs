//! Sensory feedback for page turns.
//!
//! Sound and haptics are ports implemented by the host. The
//! [`FeedbackController`] decides *when* they fire and at what strength:
//!
//! | Milestone  | Sound                        | Haptic                     |
//! |------------|------------------------------|----------------------------|
//! | drag start | lift cue                     | lift pulse                 |
//! | drag move  | rustle, intensity = progress | continuous, 0.3 × progress |
//! | commit     | timbre by release speed      | drop pulse                 |
//! | cancel     | drop cue                     | drop pulse                 |
//!
//! Continuous effects are stopped on every drag end regardless of outcome,
//! and on reset or drop of the controller.

mod haptic;
mod sound;

pub use haptic::{HapticPulse, HapticSink};
pub use sound::{SoundCue, SoundSink};

use crate::config::TurnConfiguration;

/// Share of drag progress used as continuous haptic intensity
pub const CONTINUOUS_HAPTIC_SCALE: f32 = 0.3;

/// Sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SoundSink for NullSink {
    fn play(&mut self, _cue: SoundCue, _volume: f32) {}
    fn rustle(&mut self, _intensity: f32) {}
    fn stop_rustle(&mut self) {}
}

impl HapticSink for NullSink {
    fn pulse(&mut self, _pulse: HapticPulse, _intensity: f32) {}
    fn continuous(&mut self, _intensity: f32) {}
    fn stop_continuous(&mut self) {}
}

/// Gates and scales the feedback sinks
pub struct FeedbackController {
    sound: Box<dyn SoundSink>,
    haptics: Box<dyn HapticSink>,
    sound_enabled: bool,
    sound_volume: f32,
    haptics_enabled: bool,
    haptic_intensity: f32,
    /// Rustle currently playing
    rustle_active: bool,
    /// Continuous haptic currently running
    continuous_active: bool,
}

impl FeedbackController {
    /// Controller with silent sinks
    pub fn new(config: &TurnConfiguration) -> Self {
        Self::with_sinks(config, Box::new(NullSink), Box::new(NullSink))
    }

    pub fn with_sinks(
        config: &TurnConfiguration,
        sound: Box<dyn SoundSink>,
        haptics: Box<dyn HapticSink>,
    ) -> Self {
        let mut controller = Self {
            sound,
            haptics,
            sound_enabled: false,
            sound_volume: 0.0,
            haptics_enabled: false,
            haptic_intensity: 0.0,
            rustle_active: false,
            continuous_active: false,
        };
        controller.apply_configuration(config);
        controller
    }

    /// Re-read enable flags and strengths
    pub fn apply_configuration(&mut self, config: &TurnConfiguration) {
        let config = config.sanitized();
        self.sound_enabled = config.sound_enabled;
        self.sound_volume = config.sound_volume;
        self.haptics_enabled = config.haptics_enabled;
        self.haptic_intensity = config.haptic_intensity;

        if !self.sound_enabled {
            self.stop_rustle();
        }
        if !self.haptics_enabled {
            self.stop_continuous();
        }
    }

    /// Whether any continuous effect is running
    pub fn is_continuous_active(&self) -> bool {
        self.rustle_active || self.continuous_active
    }

    pub fn drag_started(&mut self) {
        if self.sound_enabled {
            self.sound.play(SoundCue::Lift, self.sound_volume);
        }
        if self.haptics_enabled {
            self.haptics.pulse(HapticPulse::Lift, self.haptic_intensity);
        }
    }

    /// `drag_progress` is how far the sheet has been pulled (0-1)
    pub fn drag_moved(&mut self, drag_progress: f32) {
        let drag_progress = drag_progress.clamp(0.0, 1.0);
        if self.sound_enabled {
            self.sound.rustle(drag_progress * self.sound_volume);
            self.rustle_active = true;
        }
        if self.haptics_enabled {
            self.haptics
                .continuous(drag_progress * CONTINUOUS_HAPTIC_SCALE * self.haptic_intensity);
            self.continuous_active = true;
        }
    }

    /// Drag released; `release_speed` is in progress per second
    pub fn drag_ended(&mut self, commits: bool, release_speed: f32) {
        self.stop_all();

        if self.sound_enabled {
            let cue = if commits {
                SoundCue::for_release(release_speed)
            } else {
                SoundCue::Drop
            };
            self.sound.play(cue, self.sound_volume);
        }
        if self.haptics_enabled {
            self.haptics.pulse(HapticPulse::Drop, self.haptic_intensity);
        }
    }

    /// Stop every continuous effect
    pub fn stop_all(&mut self) {
        self.stop_rustle();
        self.stop_continuous();
    }

    fn stop_rustle(&mut self) {
        if self.rustle_active {
            self.sound.stop_rustle();
            self.rustle_active = false;
        }
    }

    fn stop_continuous(&mut self) {
        if self.continuous_active {
            self.haptics.stop_continuous();
            self.continuous_active = false;
        }
    }
}

impl Drop for FeedbackController {
    fn drop(&mut self) {
        self.stop_all();
    }
}

impl std::fmt::Debug for FeedbackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackController")
            .field("sound_enabled", &self.sound_enabled)
            .field("haptics_enabled", &self.haptics_enabled)
            .field("rustle_active", &self.rustle_active)
            .field("continuous_active", &self.continuous_active)
            .finish()
    }
}
