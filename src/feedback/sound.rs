//! Paper sound port.

/// Discrete paper sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Page lifted at drag start
    Lift,
    /// Fast release: crisp snap of the sheet
    TurnCrisp,
    /// Moderate release: soft landing
    TurnSoft,
    /// Very slow release: only the rustle is heard
    RustleOnly,
    /// Page dropped back after a cancelled turn
    Drop,
}

impl SoundCue {
    /// Release speed above which a committed turn sounds crisp
    pub const CRISP_SPEED: f32 = 2.0;
    /// Release speed above which a committed turn sounds soft
    pub const SOFT_SPEED: f32 = 0.5;

    /// Timbre of a committed turn from the release speed (progress per second)
    pub fn for_release(velocity: f32) -> Self {
        let speed = velocity.abs();
        if speed > Self::CRISP_SPEED {
            SoundCue::TurnCrisp
        } else if speed > Self::SOFT_SPEED {
            SoundCue::TurnSoft
        } else {
            SoundCue::RustleOnly
        }
    }
}

/// Host-implemented audio output
pub trait SoundSink {
    /// Play a one-shot cue at `volume` (0-1)
    fn play(&mut self, cue: SoundCue, volume: f32);

    /// Start or update the continuous rustle at `intensity` (0-1)
    fn rustle(&mut self, intensity: f32);

    /// Stop the continuous rustle
    fn stop_rustle(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timbre_selection() {
        assert_eq!(SoundCue::for_release(3.5), SoundCue::TurnCrisp);
        assert_eq!(SoundCue::for_release(-3.5), SoundCue::TurnCrisp);
        assert_eq!(SoundCue::for_release(1.0), SoundCue::TurnSoft);
        assert_eq!(SoundCue::for_release(0.1), SoundCue::RustleOnly);
    }
}
