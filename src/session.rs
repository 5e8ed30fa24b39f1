//! Reader session: page turns wired to the chapter window.
//!
//! Runs the coordinator in chapter-turn mode (one page per chapter view) and
//! keeps the [`ChapterWindowCache`] in step with every committed turn. When
//! the neighbour of a turn is not resident, the session falls back to an
//! on-demand load followed by an unanimated jump, so navigation never waits
//! on a speculative preload.

use crate::cache::{ChapterWindowCache, ContentProvider, EnvironmentProbe, PerformanceTier};
use crate::config::TurnConfiguration;
use crate::coordinator::{CommittedTurn, SubscriptionId, TurnCoordinator, TurnObserver};
use crate::physics::ReleaseDecision;
use crate::state::TurnDirection;

/// On-demand loading status shown by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    /// Synchronous load in progress
    Loading { index: usize },
    /// Chapter unavailable; `retry` runs the load again
    Failed { index: usize },
}

/// Session-level notifications, polled with `take_events`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// On-demand load started
    LoadStarted { index: usize },
    /// On-demand load failed
    LoadFailed { index: usize },
    /// Window rebuilt around a freshly loaded chapter
    ChapterOpened { index: usize },
    /// Window slid one chapter after a committed turn
    Transitioned { from: usize, to: usize },
}

/// Coordinator, chapter window and content provider for one open book
pub struct ReaderSession<P: ContentProvider> {
    coordinator: TurnCoordinator,
    cache: ChapterWindowCache,
    provider: P,
    load_state: LoadState,
    events: Vec<SessionEvent>,
    /// Coordinator page the window was last synchronised with
    synced_page: usize,
}

impl<P: ContentProvider> ReaderSession<P> {
    /// Open a book of `chapter_count` chapters at `start` (clamped)
    pub fn open(
        config: TurnConfiguration,
        tier: PerformanceTier,
        provider: P,
        chapter_count: usize,
        start: usize,
    ) -> Self {
        let coordinator = TurnCoordinator::new(config, chapter_count).with_start_page(start);
        let start = coordinator.current_page();
        let mut session = Self {
            coordinator,
            cache: ChapterWindowCache::new(chapter_count, tier),
            provider,
            load_state: LoadState::Idle,
            events: Vec::new(),
            synced_page: start,
        };
        session.load_on_demand(start);

        log::info!(
            "Reader session opened at chapter {} of {} ({:?} tier)",
            start,
            chapter_count,
            tier
        );
        session
    }

    /// Open with the tier detected from the current environment
    pub fn open_detected(
        config: TurnConfiguration,
        provider: P,
        chapter_count: usize,
        start: usize,
    ) -> Self {
        let tier = PerformanceTier::detect(&EnvironmentProbe::current());
        log::info!("Detected performance tier {:?}", tier);
        Self::open(config, tier, provider, chapter_count, start)
    }

    // === Accessors ===

    pub fn coordinator(&self) -> &TurnCoordinator {
        &self.coordinator
    }

    /// Direct access for configuration and presentation queries
    pub fn coordinator_mut(&mut self) -> &mut TurnCoordinator {
        &mut self.coordinator
    }

    pub fn cache(&self) -> &ChapterWindowCache {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn current_chapter(&self) -> usize {
        self.coordinator.current_page()
    }

    pub fn subscribe(&mut self, observer: impl TurnObserver + 'static) -> SubscriptionId {
        self.coordinator.subscribe(observer)
    }

    /// Drain session events in emission order
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // === Navigation ===

    pub fn go_to_next_page(&mut self, animated: bool) -> bool {
        self.navigate(TurnDirection::Forward, animated)
    }

    pub fn go_to_previous_page(&mut self, animated: bool) -> bool {
        self.navigate(TurnDirection::Backward, animated)
    }

    /// Chapter-list navigation: an external jump the window must reconcile.
    ///
    /// A chapter that is not resident is loaded before the page moves, so a
    /// failed load leaves page and window where they were.
    pub fn jump_to_chapter(&mut self, index: usize) -> bool {
        if index >= self.coordinator.total_pages() {
            return self.coordinator.go_to_page(index, false);
        }
        if self.coordinator.is_dragging() || self.coordinator.is_animating() {
            log::trace!("jump_to_chapter({}) ignored while turning", index);
            return false;
        }
        if !self.cache.is_ready(index) {
            return self.load_on_demand(index);
        }

        self.coordinator.go_to_page(index, false);
        self.synced_page = self.coordinator.current_page();
        let reconciliation = self.cache.reconcile_external_change(index);
        log::debug!("Jump to chapter {}: {:?}", index, reconciliation);
        true
    }

    /// Re-run a failed on-demand load
    pub fn retry(&mut self) -> bool {
        match self.load_state {
            LoadState::Failed { index } => self.load_on_demand(index),
            _ => false,
        }
    }

    fn navigate(&mut self, direction: TurnDirection, animated: bool) -> bool {
        let current = self.coordinator.current_page();
        let target = direction.step(current, self.coordinator.total_pages());
        let busy = self.coordinator.is_dragging() || self.coordinator.is_animating();

        match target {
            Some(index) if !busy && !self.cache.is_ready(index) => {
                log::debug!("Chapter {} not resident, loading on demand", index);
                self.load_on_demand(index)
            }
            // Boundaries and busy states are reported or ignored by the coordinator
            _ => {
                let moved = match direction {
                    TurnDirection::Forward => self.coordinator.go_to_next_page(animated),
                    TurnDirection::Backward => self.coordinator.go_to_previous_page(animated),
                };
                self.sync_window();
                moved
            }
        }
    }

    // === Gestures ===

    pub fn begin_drag(&mut self, at_x: f32) {
        self.coordinator.begin_drag(at_x);
    }

    pub fn update_drag(&mut self, current_x: f32, start_x: f32, viewport_width: f32) {
        self.coordinator.update_drag(current_x, start_x, viewport_width);
    }

    pub fn end_drag(&mut self, velocity: f32, flick: TurnDirection) -> Option<ReleaseDecision> {
        self.coordinator.end_drag(velocity, flick)
    }

    // === Frames ===

    /// One display frame: clocks, physics, window sync, then due loads
    pub fn tick(&mut self, dt: f32) -> Option<CommittedTurn> {
        self.cache.advance_clock(f64::from(dt));
        self.coordinator.advance_clock(dt);

        let committed = if self.coordinator.is_ticking() {
            self.coordinator.tick(dt)
        } else {
            None
        };
        self.sync_window();
        self.pump_loads();
        committed
    }

    /// Load every due preload through the provider
    pub fn pump_loads(&mut self) -> usize {
        self.cache.pump(&mut self.provider)
    }

    /// Slide the window after a page change the coordinator committed
    fn sync_window(&mut self) {
        let page = self.coordinator.current_page();
        if page == self.synced_page {
            return;
        }
        let from = std::mem::replace(&mut self.synced_page, page);
        if matches!(self.load_state, LoadState::Failed { .. }) {
            self.load_state = LoadState::Idle;
        }
        let direction = if page > from {
            TurnDirection::Forward
        } else {
            TurnDirection::Backward
        };

        if self.cache.current_index() == Some(from) {
            self.cache.begin_internal_transition();
            let slid = page.abs_diff(from) == 1
                && self.cache.is_ready(page)
                && self.cache.commit_transition(direction);
            self.cache.end_internal_transition();

            if slid {
                self.events.push(SessionEvent::Transitioned { from, to: page });
                return;
            }
        } else {
            // Window still centred on a chapter whose load failed earlier
            let reconciliation = self.cache.reconcile_external_change(page);
            log::debug!("Window caught up with chapter {}: {:?}", page, reconciliation);
            if self.cache.is_ready(page) {
                return;
            }
        }
        self.load_on_demand(page);
    }

    /// Synchronous load of `index`, rebuilding the window around it
    fn load_on_demand(&mut self, index: usize) -> bool {
        self.load_state = LoadState::Loading { index };
        self.events.push(SessionEvent::LoadStarted { index });

        let content = self
            .provider
            .load_chapter(index)
            .filter(|content| content.index == index);
        let Some(content) = content else {
            log::warn!("Chapter {} unavailable", index);
            self.load_state = LoadState::Failed { index };
            self.events.push(SessionEvent::LoadFailed { index });
            return false;
        };

        self.cache.begin_internal_transition();
        self.cache.initialize(index, content);
        if self.coordinator.current_page() != index {
            self.coordinator.go_to_page(index, false);
        }
        self.cache.reconcile_external_change(index);
        self.cache.end_internal_transition();

        self.synced_page = self.coordinator.current_page();
        self.cache.preload_adjacent();
        self.load_state = LoadState::Idle;
        self.events.push(SessionEvent::ChapterOpened { index });
        true
    }
}

impl<P: ContentProvider> std::fmt::Debug for ReaderSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderSession")
            .field("coordinator", &self.coordinator)
            .field("window", &self.cache.views().len())
            .field("load_state", &self.load_state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryProvider;

    #[test]
    fn test_open_loads_start_and_preloads() {
        let session = ReaderSession::open(
            TurnConfiguration::default(),
            PerformanceTier::Medium,
            InMemoryProvider::numbered(5),
            5,
            2,
        );
        assert_eq!(session.current_chapter(), 2);
        assert!(session.cache().is_ready(2));
        assert!(session.cache().is_in_flight(3));
        assert_eq!(session.load_state(), LoadState::Idle);
    }

    #[test]
    fn test_unanimated_next_slides_window() {
        let mut session = ReaderSession::open(
            TurnConfiguration::default(),
            PerformanceTier::Medium,
            InMemoryProvider::numbered(5),
            5,
            0,
        );
        session.pump_loads();
        session.take_events();

        assert!(session.go_to_next_page(false));
        assert_eq!(session.current_chapter(), 1);
        assert_eq!(session.cache().current_index(), Some(1));
        assert_eq!(
            session.take_events(),
            vec![SessionEvent::Transitioned { from: 0, to: 1 }]
        );
    }

    #[test]
    fn test_open_unavailable_start_fails() {
        let mut provider = InMemoryProvider::numbered(3);
        provider.remove(0);
        let session = ReaderSession::open(
            TurnConfiguration::default(),
            PerformanceTier::Full,
            provider,
            3,
            0,
        );
        assert_eq!(session.load_state(), LoadState::Failed { index: 0 });
        assert!(session.cache().is_empty());
    }
}
