//! Sliding window of chapter views.
//!
//! Holds at most three views (previous, current, next). Each view has a
//! stable [`ViewId`] allocated here; the chapter index is an attribute that
//! changes meaning as the window slides, never an identity.
//!
//! Loading is modelled with tickets so the window stays single-threaded:
//! 1. `preload_adjacent` inserts a loading placeholder and queues a ticket
//! 2. `poll_due` hands out tickets whose stagger delay has elapsed
//! 3. the host loads the content and calls `complete_load`
//!
//! A completion is re-validated before insertion; if its view was evicted or
//! drifted out of range in the meantime the result is discarded.

use std::cmp::Ordering;

use crate::state::TurnDirection;

use super::provider::{ChapterContent, ContentProvider};
use super::tier::{EnvironmentProbe, PerformanceTier};

/// Delay before the backward neighbour is requested (seconds)
pub const BACKWARD_PRELOAD_DELAY_SEC: f64 = 0.25;
/// Views resident at most: previous, current, next
pub const MAX_WINDOW_SIZE: usize = 3;

/// Stable identity of a chapter view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

/// Where presentation starts scrolling a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAnchor {
    /// Top of the chapter (reached by reading forward)
    #[default]
    Start,
    /// End of the chapter (reached by reading backward)
    End,
}

/// One resident chapter
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterView {
    pub id: ViewId,
    pub index: usize,
    /// `None` while loading
    pub content: Option<ChapterContent>,
    /// Horizontal offset in page widths relative to the current view
    pub offset: isize,
    pub is_ready: bool,
    pub is_loading: bool,
    pub is_current: bool,
    pub anchor: ScrollAnchor,
}

impl ChapterView {
    /// Stable content id once loaded
    pub fn content_id(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.id.as_str())
    }
}

/// A load handed to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub id: u64,
    pub view: ViewId,
    pub index: usize,
}

/// What `reconcile_external_change` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// An internal transition is in progress; nothing changed
    Internal,
    /// The index already was current
    Unchanged,
    /// A resident neighbour became current without reloading
    Promoted,
    /// Unrelated jump; the window was discarded
    Cleared,
}

/// Cache counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub loads_requested: u64,
    pub loads_completed: u64,
    pub loads_failed: u64,
    pub stale_discarded: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone, Copy)]
struct QueuedLoad {
    ticket: LoadTicket,
    due_sec: f64,
    dispatched: bool,
}

/// Chapter window with speculative preload and distance-based eviction
#[derive(Debug, Clone)]
pub struct ChapterWindowCache {
    views: Vec<ChapterView>,
    current_index: Option<usize>,
    chapter_count: usize,
    tier: PerformanceTier,
    internal_transition: bool,
    queue: Vec<QueuedLoad>,
    clock_sec: f64,
    next_view_id: u64,
    next_ticket_id: u64,
    stats: CacheStats,
}

impl ChapterWindowCache {
    pub fn new(chapter_count: usize, tier: PerformanceTier) -> Self {
        Self {
            views: Vec::with_capacity(MAX_WINDOW_SIZE),
            current_index: None,
            chapter_count,
            tier,
            internal_transition: false,
            queue: Vec::new(),
            clock_sec: 0.0,
            next_view_id: 0,
            next_ticket_id: 0,
            stats: CacheStats::default(),
        }
    }

    // === Accessors ===

    pub fn views(&self) -> &[ChapterView] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_view(&self) -> Option<&ChapterView> {
        self.views.iter().find(|v| v.is_current)
    }

    pub fn view(&self, index: usize) -> Option<&ChapterView> {
        self.views.iter().find(|v| v.index == index)
    }

    /// Whether chapter `index` is resident and loaded
    pub fn is_ready(&self, index: usize) -> bool {
        self.view(index).is_some_and(|v| v.is_ready)
    }

    /// Whether a load for chapter `index` is queued or dispatched
    pub fn is_in_flight(&self, index: usize) -> bool {
        self.queue.iter().any(|q| q.ticket.index == index)
    }

    /// Queued or dispatched loads
    pub fn pending_loads(&self) -> usize {
        self.queue.len()
    }

    pub fn tier(&self) -> PerformanceTier {
        self.tier
    }

    pub fn chapter_count(&self) -> usize {
        self.chapter_count
    }

    pub fn clock_sec(&self) -> f64 {
        self.clock_sec
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn is_internal_transition(&self) -> bool {
        self.internal_transition
    }

    // === Window lifecycle ===

    /// Replace the window with a single ready, current view
    pub fn initialize(&mut self, index: usize, content: ChapterContent) {
        self.views.clear();
        self.queue.clear();
        let id = self.allocate_view_id();
        self.views.push(ChapterView {
            id,
            index,
            content: Some(content),
            offset: 0,
            is_ready: true,
            is_loading: false,
            is_current: true,
            anchor: ScrollAnchor::Start,
        });
        self.current_index = Some(index);
        log::debug!("Chapter window initialized at {}", index);
    }

    /// Drop every view and queued load
    pub fn clear(&mut self) {
        self.views.clear();
        self.queue.clear();
        self.current_index = None;
    }

    /// Change the chapter count, dropping views past the end
    pub fn set_chapter_count(&mut self, chapter_count: usize) {
        self.chapter_count = chapter_count;
        self.views.retain(|v| v.index < chapter_count);
        self.queue.retain(|q| q.ticket.index < chapter_count);
        if self.current_index.is_some_and(|current| current >= chapter_count) {
            self.clear();
        }
    }

    pub fn begin_internal_transition(&mut self) {
        self.internal_transition = true;
    }

    pub fn end_internal_transition(&mut self) {
        self.internal_transition = false;
    }

    /// React to a chapter index change the window did not drive itself
    pub fn reconcile_external_change(&mut self, new_index: usize) -> Reconciliation {
        if self.internal_transition {
            log::trace!("Reconcile {} skipped: internal transition", new_index);
            return Reconciliation::Internal;
        }
        if self.current_index == Some(new_index) {
            return Reconciliation::Unchanged;
        }
        if self.view(new_index).is_some() {
            log::debug!("External change to resident chapter {}", new_index);
            self.promote(new_index, None);
            self.evict_distant();
            self.preload_adjacent();
            return Reconciliation::Promoted;
        }

        log::debug!("External jump to chapter {}: window cleared", new_index);
        self.clear();
        Reconciliation::Cleared
    }

    /// Slide the window one chapter after a committed turn.
    ///
    /// The neighbour is promoted first, then distant views are evicted, then
    /// the new neighbour is requested. Returns false when no neighbour view
    /// exists in that direction.
    pub fn commit_transition(&mut self, direction: TurnDirection) -> bool {
        let Some(current) = self.current_index else {
            return false;
        };
        let Some(target) = direction.step(current, self.chapter_count) else {
            return false;
        };
        if self.view(target).is_none() {
            log::debug!("No resident view for chapter {}", target);
            return false;
        }

        self.promote(target, Some(direction));
        self.evict_distant();
        self.preload_adjacent();
        true
    }

    /// Remove views more than one chapter from the current one
    pub fn evict_distant(&mut self) -> usize {
        let Some(current) = self.current_index else {
            return 0;
        };
        let evicted: Vec<ViewId> = self
            .views
            .iter()
            .filter(|v| v.index.abs_diff(current) > 1)
            .map(|v| v.id)
            .collect();
        if evicted.is_empty() {
            return 0;
        }

        self.views.retain(|v| !evicted.contains(&v.id));
        self.queue.retain(|q| !evicted.contains(&q.ticket.view));
        self.stats.evictions += evicted.len() as u64;
        log::debug!("Evicted {} chapter view(s) around {}", evicted.len(), current);
        evicted.len()
    }

    fn promote(&mut self, index: usize, direction: Option<TurnDirection>) {
        self.current_index = Some(index);
        for view in &mut self.views {
            view.is_current = view.index == index;
            view.offset = view.index as isize - index as isize;
            view.anchor = match view.offset.cmp(&0) {
                Ordering::Less => ScrollAnchor::End,
                Ordering::Greater => ScrollAnchor::Start,
                Ordering::Equal => match direction {
                    Some(TurnDirection::Backward) => ScrollAnchor::End,
                    _ => ScrollAnchor::Start,
                },
            };
        }
    }

    // === Loading ===

    /// Request the neighbours of a ready current view; returns requests issued
    pub fn preload_adjacent(&mut self) -> usize {
        let Some(current) = self.current_index else {
            return 0;
        };
        if !self.current_view().is_some_and(|v| v.is_ready) {
            log::trace!("Preload deferred: chapter {} not ready", current);
            return 0;
        }

        let mut issued = 0;
        if self.tier.preloads_forward() {
            if let Some(next) = current.checked_add(1) {
                issued += usize::from(self.request(next, 0.0));
            }
        }
        if self.tier.preloads_backward() {
            if let Some(previous) = current.checked_sub(1) {
                issued += usize::from(self.request(previous, BACKWARD_PRELOAD_DELAY_SEC));
            }
        }
        issued
    }

    fn request(&mut self, index: usize, delay_sec: f64) -> bool {
        let Some(current) = self.current_index else {
            return false;
        };
        if index >= self.chapter_count || self.view(index).is_some() {
            return false;
        }
        if self.views.len() >= MAX_WINDOW_SIZE {
            return false;
        }

        let offset = index as isize - current as isize;
        let view = self.allocate_view_id();
        self.views.push(ChapterView {
            id: view,
            index,
            content: None,
            offset,
            is_ready: false,
            is_loading: true,
            is_current: false,
            anchor: if offset < 0 {
                ScrollAnchor::End
            } else {
                ScrollAnchor::Start
            },
        });

        let ticket = LoadTicket {
            id: self.next_ticket_id,
            view,
            index,
        };
        self.next_ticket_id += 1;
        self.queue.push(QueuedLoad {
            ticket,
            due_sec: self.clock_sec + delay_sec,
            dispatched: false,
        });
        self.stats.loads_requested += 1;
        log::debug!("Preload of chapter {} queued (+{:.2}s)", index, delay_sec);
        true
    }

    /// Advance the stagger clock
    pub fn advance_clock(&mut self, dt_sec: f64) {
        if dt_sec.is_finite() && dt_sec > 0.0 {
            self.clock_sec += dt_sec;
        }
    }

    /// Hand out every queued load whose delay has elapsed
    pub fn poll_due(&mut self) -> Vec<LoadTicket> {
        let now = self.clock_sec;
        self.queue
            .iter_mut()
            .filter(|q| !q.dispatched && q.due_sec <= now)
            .map(|q| {
                q.dispatched = true;
                q.ticket
            })
            .collect()
    }

    /// Deliver the result of a load.
    ///
    /// Returns true when the content was inserted. Stale tickets, views that
    /// drifted out of range and unavailable content are dropped.
    pub fn complete_load(&mut self, ticket: LoadTicket, content: Option<ChapterContent>) -> bool {
        let Some(position) = self.queue.iter().position(|q| q.ticket.id == ticket.id) else {
            self.discard_stale(ticket);
            return false;
        };
        self.queue.remove(position);

        let Some(view_position) = self.views.iter().position(|v| v.id == ticket.view) else {
            self.discard_stale(ticket);
            return false;
        };
        if self
            .current_index
            .is_some_and(|current| ticket.index.abs_diff(current) > 1)
        {
            self.views.remove(view_position);
            self.discard_stale(ticket);
            return false;
        }

        let content = match content {
            Some(content) if content.index == ticket.index => content,
            _ => {
                self.views.remove(view_position);
                self.stats.loads_failed += 1;
                log::debug!("Chapter {} unavailable, preload dropped", ticket.index);
                return false;
            }
        };

        let view = &mut self.views[view_position];
        view.content = Some(content);
        view.is_ready = true;
        view.is_loading = false;
        let is_current = view.is_current;
        self.stats.loads_completed += 1;

        self.evict_distant();
        if is_current {
            self.preload_adjacent();
        }
        true
    }

    /// Synchronously load every due ticket through `provider`
    pub fn pump<P: ContentProvider + ?Sized>(&mut self, provider: &mut P) -> usize {
        let mut inserted = 0;
        for ticket in self.poll_due() {
            let content = provider.load_chapter(ticket.index);
            if self.complete_load(ticket, content) {
                inserted += 1;
            }
        }
        inserted
    }

    fn discard_stale(&mut self, ticket: LoadTicket) {
        self.stats.stale_discarded += 1;
        log::debug!("Stale load of chapter {} discarded", ticket.index);
    }

    // === Tiering ===

    /// Recompute the tier from `probe`; Minimal drops every non-current view
    pub fn re_evaluate_tier(&mut self, probe: &EnvironmentProbe) -> PerformanceTier {
        let tier = PerformanceTier::detect(probe);
        if tier == self.tier {
            return tier;
        }
        log::info!("Performance tier {:?} -> {:?}", self.tier, tier);
        self.tier = tier;

        if tier == PerformanceTier::Minimal {
            self.views.retain(|v| v.is_current);
            self.queue.clear();
        } else {
            self.preload_adjacent();
        }
        tier
    }

    fn allocate_view_id(&mut self) -> ViewId {
        let id = ViewId(self.next_view_id);
        self.next_view_id += 1;
        id
    }
}
