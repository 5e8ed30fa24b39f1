//! Notifications and snapshots published to the host.

use crate::state::{TurnDirection, TurnPhase};

/// Event emitted by the coordinator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnEvent {
    /// The current page changed; fired exactly once per committed transition
    PageChanged(usize),
    /// Previous page requested on the first page
    ReachedStart,
    /// Next page requested on the last page
    ReachedEnd,
    /// Reading position as a fraction of the book, fired with each page change
    Progress(f32),
    /// A drag resolved its direction or a programmatic turn began animating
    TurnStarted(TurnDirection),
    /// A turn was released or interrupted without changing the page
    TurnCancelled,
}

/// Receiver of [`TurnEvent`]s
pub trait TurnObserver {
    fn on_event(&mut self, event: &TurnEvent);
}

impl<F> TurnObserver for F
where
    F: FnMut(&TurnEvent),
{
    fn on_event(&mut self, event: &TurnEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// A page transition that has just been committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedTurn {
    pub direction: TurnDirection,
    pub from_page: usize,
    pub to_page: usize,
}

/// Immutable view of the coordinator for polling hosts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnSnapshot {
    pub current_page: usize,
    pub total_pages: usize,
    pub is_turning: bool,
    pub direction: TurnDirection,
    /// Completion of the running turn (0 = untouched, 1 = fully turned)
    pub progress: f32,
    pub phase: TurnPhase,
    /// `current_page / (total_pages - 1)`
    pub reading_fraction: f32,
    pub auto_advance_armed: bool,
}
