//! Performance tiers for speculative preloading.
//!
//! | Tier    | Preload                         | Window |
//! |---------|---------------------------------|--------|
//! | Full    | next, then previous (staggered) | 3      |
//! | Medium  | next only                       | 3      |
//! | Minimal | none                            | 1      |
//!
//! The tier is computed once from the runtime environment; re-evaluation is
//! an explicit call, never automatic.

use serde::{Deserialize, Serialize};

/// Environment variable forcing the low-power condition (`1` or `true`)
pub const LOW_POWER_ENV: &str = "PAGE_CURL_LOW_POWER";
/// Environment variable reporting available memory in MiB
pub const MEMORY_MB_ENV: &str = "PAGE_CURL_MEMORY_MB";

/// Memory below which only the current chapter is kept (MiB)
const MINIMAL_MEMORY_MB: u64 = 512;
/// Memory below which backward preloading is skipped (MiB)
const MEDIUM_MEMORY_MB: u64 = 2048;
/// Core count at or below which backward preloading is skipped
const MEDIUM_CPU_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PerformanceTier {
    /// Preload both neighbours
    #[default]
    Full,
    /// Preload the forward neighbour only
    Medium,
    /// No preloading
    Minimal,
}

impl PerformanceTier {
    /// Pick a tier for the given environment
    pub fn detect(probe: &EnvironmentProbe) -> Self {
        let memory = probe.available_memory_mb;
        if probe.low_power || memory.is_some_and(|mb| mb < MINIMAL_MEMORY_MB) {
            PerformanceTier::Minimal
        } else if probe.cpu_count <= MEDIUM_CPU_COUNT || memory.is_some_and(|mb| mb < MEDIUM_MEMORY_MB)
        {
            PerformanceTier::Medium
        } else {
            PerformanceTier::Full
        }
    }

    pub fn preloads_forward(self) -> bool {
        !matches!(self, PerformanceTier::Minimal)
    }

    pub fn preloads_backward(self) -> bool {
        matches!(self, PerformanceTier::Full)
    }
}

/// Snapshot of the runtime conditions the tier depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentProbe {
    /// Device reports a low-power condition
    pub low_power: bool,
    /// Available memory, when known (MiB)
    pub available_memory_mb: Option<u64>,
    /// Logical CPUs available to the process
    pub cpu_count: usize,
}

impl EnvironmentProbe {
    /// Read the current process environment
    pub fn current() -> Self {
        let low_power = std::env::var(LOW_POWER_ENV)
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let available_memory_mb = std::env::var(MEMORY_MB_ENV)
            .ok()
            .and_then(|value| value.trim().parse().ok());
        let cpu_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            low_power,
            available_memory_mb,
            cpu_count,
        }
    }
}
