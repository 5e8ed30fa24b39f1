//! Chapter content cache.
//!
//! Keeps up to three adjacent chapters resident so page turns never wait on
//! loading. Content arrives through a host [`ContentProvider`].

mod provider;
mod tier;
mod window;

pub use provider::{ChapterContent, ContentProvider, InMemoryProvider};
pub use tier::{EnvironmentProbe, PerformanceTier, LOW_POWER_ENV, MEMORY_MB_ENV};
pub use window::{
    CacheStats, ChapterView, ChapterWindowCache, LoadTicket, Reconciliation, ScrollAnchor, ViewId,
    BACKWARD_PRELOAD_DELAY_SEC, MAX_WINDOW_SIZE,
};
