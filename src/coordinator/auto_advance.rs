//! Auto-advance timer.
//!
//! A recurring countdown driven by `advance(dt)`. It is *armed* when the
//! configuration enables it and *suspended* while the reader holds a page.
//! Re-arming always restarts the countdown from zero.

use crate::config::MIN_AUTO_ADVANCE_INTERVAL_SEC;

#[derive(Debug, Clone)]
pub struct AutoAdvance {
    enabled: bool,
    interval_sec: f32,
    armed: bool,
    suspended: bool,
    elapsed_sec: f32,
}

impl AutoAdvance {
    pub fn new(enabled: bool, interval_sec: f32) -> Self {
        Self {
            enabled,
            interval_sec: interval_sec.max(MIN_AUTO_ADVANCE_INTERVAL_SEC),
            armed: false,
            suspended: false,
            elapsed_sec: 0.0,
        }
    }

    /// Apply new settings; a disabled timer is disarmed immediately
    pub fn configure(&mut self, enabled: bool, interval_sec: f32) {
        let interval_sec = interval_sec.max(MIN_AUTO_ADVANCE_INTERVAL_SEC);
        if interval_sec != self.interval_sec {
            self.elapsed_sec = 0.0;
        }
        self.enabled = enabled;
        self.interval_sec = interval_sec;
        if !enabled {
            self.disarm();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn interval_sec(&self) -> f32 {
        self.interval_sec
    }

    /// Seconds left before the next firing, `None` when not counting
    pub fn remaining_sec(&self) -> Option<f32> {
        (self.armed && !self.suspended).then(|| (self.interval_sec - self.elapsed_sec).max(0.0))
    }

    /// Start a fresh countdown if enabled
    pub fn arm(&mut self) {
        self.armed = self.enabled;
        self.suspended = false;
        self.elapsed_sec = 0.0;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.suspended = false;
        self.elapsed_sec = 0.0;
    }

    /// Pause the countdown, keeping the time already elapsed
    pub fn suspend(&mut self) {
        if self.armed {
            self.suspended = true;
        }
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Advance the countdown; returns true when the timer fires
    pub fn advance(&mut self, dt_sec: f32) -> bool {
        if !self.armed || self.suspended || !dt_sec.is_finite() || dt_sec <= 0.0 {
            return false;
        }
        self.elapsed_sec += dt_sec;
        if self.elapsed_sec >= self.interval_sec {
            self.elapsed_sec = 0.0;
            true
        } else {
            false
        }
    }
}
