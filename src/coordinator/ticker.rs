//! Display-refresh ticker port.
//!
//! The host owns the actual frame callback (display link, vsync, game loop)
//! and calls `TurnCoordinator::tick` once per frame while the ticker runs.

/// Host-implemented frame ticker
pub trait FrameTicker {
    /// Begin delivering frames
    fn start(&mut self);

    /// Stop delivering frames
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Ticker that only records its state; the host drives frames by hand
#[derive(Debug, Default, Clone)]
pub struct ManualTicker {
    running: bool,
    /// Number of idle → running transitions
    pub start_count: u64,
    /// Number of running → idle transitions
    pub stop_count: u64,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameTicker for ManualTicker {
    fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.start_count += 1;
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stop_count += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_ticker_counts_transitions() {
        let mut ticker = ManualTicker::new();
        ticker.start();
        ticker.start();
        assert!(ticker.is_running());
        ticker.stop();
        ticker.stop();
        assert!(!ticker.is_running());
        assert_eq!(ticker.start_count, 1);
        assert_eq!(ticker.stop_count, 1);
    }
}
