//! Haptic port.

/// Discrete haptic pulses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticPulse {
    /// Page lifted at drag start
    Lift,
    /// Page landed, either turned or dropped back
    Drop,
}

/// Host-implemented haptic output
pub trait HapticSink {
    /// Fire a one-shot pulse at `intensity` (0-1)
    fn pulse(&mut self, pulse: HapticPulse, intensity: f32);

    /// Start or update the continuous texture at `intensity` (0-1)
    fn continuous(&mut self, intensity: f32);

    /// Stop the continuous texture
    fn stop_continuous(&mut self);
}
