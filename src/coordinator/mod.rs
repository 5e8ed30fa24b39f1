//! Top-level page-turn state machine.
//!
//! The [`TurnCoordinator`] owns the physics simulator, the reading position,
//! the feedback controller and the auto-advance timer, and is the single
//! writer for all of them. Hosts feed it gestures, navigation requests and
//! frames, and receive [`TurnEvent`]s through subscribed observers.
//!
//! ## States
//! ```text
//! Idle ──begin_drag──▶ Dragging ──end_drag──▶ Animating ──settle──▶ Completed ──tick──▶ Idle
//!   └────────────go_to_* (animated)────────────▲
//! ```
//! `reset` returns to Idle from anywhere. While animating, programmatic turn
//! requests are ignored.

mod auto_advance;
mod events;
mod gesture;
mod ticker;

pub use auto_advance::AutoAdvance;
pub use events::{CommittedTurn, SubscriptionId, TurnEvent, TurnObserver, TurnSnapshot};
pub use gesture::{DragGesture, DragUpdate};
pub use ticker::{FrameTicker, ManualTicker};

use crate::config::TurnConfiguration;
use crate::feedback::{FeedbackController, HapticSink, SoundSink};
use crate::geometry::PageMesh;
use crate::lighting::{LightGradient, LightingModel, ShadowParams};
use crate::physics::{PhysicsSimulator, ReleaseDecision, TickOutcome};
use crate::state::{TurnDirection, TurnPhase, TurnState};

/// Page-turn coordinator
pub struct TurnCoordinator {
    config: TurnConfiguration,
    simulator: PhysicsSimulator,
    lighting: LightingModel,
    turn: TurnState,
    feedback: FeedbackController,
    auto_advance: AutoAdvance,
    ticker: Box<dyn FrameTicker>,
    observers: Vec<(SubscriptionId, Box<dyn TurnObserver>)>,
    next_subscription: u64,
    /// Gesture between `begin_drag` and `end_drag`
    gesture: Option<DragGesture>,
    /// Page change applied when the running animation settles committed
    pending: Option<CommittedTurn>,
}

impl TurnCoordinator {
    /// Coordinator on the first of `total_pages` pages, with a manual ticker
    /// and silent feedback sinks
    pub fn new(config: TurnConfiguration, total_pages: usize) -> Self {
        let config = config.sanitized();
        let mut coordinator = Self {
            simulator: PhysicsSimulator::new(&config),
            lighting: LightingModel::new(config.shadows_enabled),
            turn: TurnState::new(0, total_pages),
            feedback: FeedbackController::new(&config),
            auto_advance: AutoAdvance::new(
                config.auto_advance_enabled,
                config.auto_advance_interval_sec,
            ),
            ticker: Box::new(ManualTicker::new()),
            observers: Vec::new(),
            next_subscription: 0,
            gesture: None,
            pending: None,
            config,
        };
        coordinator.rearm_auto_advance();

        log::info!(
            "Turn coordinator ready: {} pages, mode {:?}",
            coordinator.turn.total_pages,
            coordinator.config.animation_mode
        );
        coordinator
    }

    /// Builder: inject the host frame ticker
    pub fn with_ticker(mut self, ticker: Box<dyn FrameTicker>) -> Self {
        self.ticker.stop();
        self.ticker = ticker;
        self
    }

    /// Builder: inject the host sound and haptic sinks
    pub fn with_feedback(mut self, sound: Box<dyn SoundSink>, haptics: Box<dyn HapticSink>) -> Self {
        self.feedback = FeedbackController::with_sinks(&self.config, sound, haptics);
        self
    }

    /// Builder: start on `page` (clamped) without emitting events
    pub fn with_start_page(mut self, page: usize) -> Self {
        self.turn = TurnState::new(page, self.turn.total_pages);
        self.rearm_auto_advance();
        self
    }

    // === Accessors ===

    pub fn config(&self) -> &TurnConfiguration {
        &self.config
    }

    pub fn turn_state(&self) -> &TurnState {
        &self.turn
    }

    pub fn current_page(&self) -> usize {
        self.turn.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.turn.total_pages
    }

    pub fn phase(&self) -> TurnPhase {
        self.simulator.phase()
    }

    pub fn is_dragging(&self) -> bool {
        self.simulator.is_dragging()
    }

    pub fn is_animating(&self) -> bool {
        self.simulator.is_animating()
    }

    /// Whether the host should keep delivering frames
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn simulator(&self) -> &PhysicsSimulator {
        &self.simulator
    }

    pub fn mesh(&self) -> &PageMesh {
        self.simulator.mesh()
    }

    pub fn feedback(&self) -> &FeedbackController {
        &self.feedback
    }

    pub fn auto_advance(&self) -> &AutoAdvance {
        &self.auto_advance
    }

    pub fn lighting(&self) -> &LightingModel {
        &self.lighting
    }

    /// Shadow for the leaf as it currently stands
    pub fn shadow(&self) -> ShadowParams {
        let progress = self.simulator.progress();
        self.lighting.shadow(progress, progress > 0.5)
    }

    /// Fold gradient for the leaf as it currently stands
    pub fn gradient(&self) -> LightGradient {
        let progress = self.simulator.progress();
        self.lighting.gradient(progress, progress > 0.5)
    }

    pub fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            current_page: self.turn.current_page,
            total_pages: self.turn.total_pages,
            is_turning: self.turn.is_turning,
            direction: self.turn.direction,
            progress: self.turn.progress,
            phase: self.simulator.phase(),
            reading_fraction: self.turn.reading_fraction(),
            auto_advance_armed: self.auto_advance.is_armed(),
        }
    }

    // === Observers ===

    pub fn subscribe(&mut self, observer: impl TurnObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn emit(&mut self, event: TurnEvent) {
        log::trace!("Turn event {:?}", event);
        for (_, observer) in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }

    // === Gestures ===

    /// Finger down at `at_x`; interrupts any running animation
    pub fn begin_drag(&mut self, at_x: f32) {
        if self.simulator.is_dragging() {
            log::trace!("begin_drag ignored: drag already active");
            return;
        }
        if self.simulator.is_animating() {
            log::debug!("Drag interrupted running {:?} turn", self.simulator.direction());
            if self.pending.take().is_some() {
                self.emit(TurnEvent::TurnCancelled);
            }
        }

        self.ticker.stop();
        self.auto_advance.suspend();

        // Held at rest until the first movement resolves the direction
        let direction = self.turn.direction;
        self.simulator.begin_drag(direction, direction.rest_progress());
        self.gesture = Some(DragGesture::new(at_x));
        self.turn.is_turning = true;
        self.turn.progress = 0.0;
        self.feedback.drag_started();
    }

    /// Finger moved; positions are in points, `viewport_width` > 0
    pub fn update_drag(&mut self, current_x: f32, start_x: f32, viewport_width: f32) {
        if !self.simulator.is_dragging() {
            log::trace!("update_drag ignored while {}", self.simulator.phase().label());
            return;
        }
        let Some(gesture) = self.gesture.as_mut() else {
            log::trace!("update_drag ignored: no gesture");
            return;
        };

        let was_resolved = gesture.direction().is_some();
        let turn = &self.turn;
        let update = gesture.update(current_x, start_x, viewport_width, |direction| {
            direction.step(turn.current_page, turn.total_pages).is_some()
        });
        let progress = gesture.progress();
        let drag_fraction = gesture.drag_fraction();

        match update {
            DragUpdate::Pending => {}
            DragUpdate::Resolved(direction) => {
                self.turn.direction = direction;
                self.simulator.begin_drag(direction, direction.rest_progress());
                self.emit(TurnEvent::TurnStarted(direction));
                self.follow_drag(progress, drag_fraction);
            }
            DragUpdate::Blocked(direction) => {
                if !was_resolved {
                    log::debug!("Drag {:?} blocked at page {}", direction, self.turn.current_page);
                    self.emit(boundary_event(direction));
                }
            }
            DragUpdate::Following {
                progress,
                drag_fraction,
            } => self.follow_drag(progress, drag_fraction),
        }
    }

    /// Finger up with a pixel `velocity` in the `flick` direction.
    ///
    /// Returns the release decision, or `None` when no drag was active.
    pub fn end_drag(&mut self, velocity: f32, flick: TurnDirection) -> Option<ReleaseDecision> {
        let Some(gesture) = self.gesture.take() else {
            log::trace!("end_drag ignored: no gesture");
            return None;
        };
        let engaged = gesture.direction().is_some() && !gesture.is_blocked();
        let release = if engaged {
            gesture.release_velocity(velocity, flick)
        } else {
            0.0
        };

        let decision = self.simulator.end_drag(release)?;
        self.feedback.drag_ended(decision.commits, release);

        let committed_turn = if decision.commits {
            let direction = self.simulator.direction();
            direction
                .step(self.turn.current_page, self.turn.total_pages)
                .map(|to_page| CommittedTurn {
                    direction,
                    from_page: self.turn.current_page,
                    to_page,
                })
        } else {
            None
        };

        match committed_turn {
            Some(turn) => {
                log::debug!("Drag released: committing to page {}", turn.to_page);
                self.pending = Some(turn);
            }
            None => {
                if decision.commits {
                    self.simulator.cancel_turn();
                }
                if engaged {
                    self.emit(TurnEvent::TurnCancelled);
                }
                self.resume_auto_advance();
            }
        }

        self.ticker.start();
        Some(decision)
    }

    fn follow_drag(&mut self, progress: f32, drag_fraction: f32) {
        self.simulator.update_drag(progress);
        self.turn.progress = drag_fraction;
        self.feedback.drag_moved(drag_fraction);
    }

    // === Navigation ===

    /// Turn to the following page; at the last page only `ReachedEnd` fires
    pub fn go_to_next_page(&mut self, animated: bool) -> bool {
        self.go_in_direction(TurnDirection::Forward, animated)
    }

    /// Turn to the preceding page; at the first page only `ReachedStart` fires
    pub fn go_to_previous_page(&mut self, animated: bool) -> bool {
        self.go_in_direction(TurnDirection::Backward, animated)
    }

    /// Jump to `index`. Animated jumps run a single turn and commit straight
    /// to the target page.
    pub fn go_to_page(&mut self, index: usize, animated: bool) -> bool {
        if self.is_busy() {
            log::trace!("go_to_page({}) ignored while {}", index, self.simulator.phase().label());
            return false;
        }
        if index >= self.turn.total_pages {
            self.emit(TurnEvent::ReachedEnd);
            return false;
        }
        let current = self.turn.current_page;
        if index == current {
            return false;
        }
        let direction = if index > current {
            TurnDirection::Forward
        } else {
            TurnDirection::Backward
        };
        self.turn_to(index, direction, animated)
    }

    /// Send a running turn back to where it started
    pub fn cancel_turn(&mut self) -> bool {
        if !self.simulator.is_animating() {
            return false;
        }
        self.pending = None;
        self.simulator.cancel_turn();
        self.emit(TurnEvent::TurnCancelled);
        true
    }

    fn go_in_direction(&mut self, direction: TurnDirection, animated: bool) -> bool {
        if self.is_busy() {
            log::trace!("{:?} turn ignored while {}", direction, self.simulator.phase().label());
            return false;
        }
        match direction.step(self.turn.current_page, self.turn.total_pages) {
            Some(index) => self.turn_to(index, direction, animated),
            None => {
                self.emit(boundary_event(direction));
                false
            }
        }
    }

    fn turn_to(&mut self, index: usize, direction: TurnDirection, animated: bool) -> bool {
        let turn = CommittedTurn {
            direction,
            from_page: self.turn.current_page,
            to_page: index,
        };

        if !animated || !self.config.animation_mode.is_animated() {
            self.commit(turn);
            return true;
        }
        if !self.simulator.start_turn(direction) {
            return false;
        }

        self.pending = Some(turn);
        self.turn.is_turning = true;
        self.turn.direction = direction;
        self.turn.progress = 0.0;
        self.auto_advance.suspend();
        self.emit(TurnEvent::TurnStarted(direction));
        self.ticker.start();
        true
    }

    fn is_busy(&self) -> bool {
        self.simulator.is_dragging() || self.simulator.is_animating()
    }

    fn commit(&mut self, turn: CommittedTurn) {
        self.turn.current_page = turn.to_page;
        self.turn.direction = turn.direction;
        log::debug!("Page {} -> {}", turn.from_page, turn.to_page);

        self.emit(TurnEvent::PageChanged(turn.to_page));
        self.emit(TurnEvent::Progress(self.turn.reading_fraction()));
        self.rearm_auto_advance();
    }

    // === Frames and timers ===

    /// One display frame. Returns the page transition committed by this
    /// frame, if any.
    pub fn tick(&mut self, dt: f32) -> Option<CommittedTurn> {
        match self.simulator.tick(dt) {
            TickOutcome::Idle => {
                if !self.simulator.is_dragging() {
                    self.ticker.stop();
                }
                None
            }
            TickOutcome::Moving { .. } => {
                let state = self.simulator.state();
                self.turn.progress = (state.progress - state.rest).abs();
                None
            }
            TickOutcome::Settled { committed, .. } => {
                self.turn.progress = if committed { 1.0 } else { 0.0 };
                match self.pending.take() {
                    Some(turn) if committed => {
                        self.commit(turn);
                        Some(turn)
                    }
                    _ => {
                        self.resume_auto_advance();
                        None
                    }
                }
            }
            TickOutcome::Finished => {
                self.turn.settle();
                self.ticker.stop();
                None
            }
        }
    }

    /// Advance the auto-advance clock; returns true when it started a turn
    pub fn advance_clock(&mut self, dt_sec: f32) -> bool {
        if !self.auto_advance.advance(dt_sec) {
            return false;
        }
        if self.turn.is_last_page() {
            self.auto_advance.disarm();
            return false;
        }
        log::debug!("Auto-advance from page {}", self.turn.current_page);
        self.go_to_next_page(true)
    }

    /// Continue after a turn that left the page unchanged; a timer enabled
    /// mid-turn starts its first countdown here
    fn resume_auto_advance(&mut self) {
        if self.auto_advance.is_enabled() && !self.auto_advance.is_armed() {
            self.rearm_auto_advance();
        } else {
            self.auto_advance.resume();
        }
    }

    fn rearm_auto_advance(&mut self) {
        self.auto_advance.disarm();
        if !self.turn.is_last_page() && !self.simulator.is_dragging() {
            self.auto_advance.arm();
        }
    }

    // === Configuration and lifecycle ===

    /// Replace the configuration and re-apply everything derived from it
    pub fn set_configuration(&mut self, config: TurnConfiguration) {
        let config = config.sanitized();
        self.simulator.apply_configuration(&config);
        self.feedback.apply_configuration(&config);
        self.lighting.shadows_enabled = config.shadows_enabled;

        let was_counting = self.auto_advance.is_armed();
        self.auto_advance
            .configure(config.auto_advance_enabled, config.auto_advance_interval_sec);
        if config.auto_advance_enabled && !was_counting && !self.is_busy() {
            self.rearm_auto_advance();
        }

        log::debug!(
            "Configuration applied: mode {:?}, auto-advance {}",
            config.animation_mode,
            config.auto_advance_enabled
        );
        self.config = config;
    }

    /// Change the page count; the current page is clamped into range
    pub fn set_total_pages(&mut self, total_pages: usize) {
        let previous = self.turn.current_page;
        self.turn.set_total_pages(total_pages);

        if let Some(turn) = self.pending {
            if turn.to_page >= self.turn.total_pages {
                self.cancel_turn();
            }
        }
        if self.turn.current_page != previous {
            self.emit(TurnEvent::PageChanged(self.turn.current_page));
            self.emit(TurnEvent::Progress(self.turn.reading_fraction()));
        }
        if self.turn.is_last_page() {
            self.auto_advance.disarm();
        }
    }

    /// Back to idle from any state, keeping the current page
    pub fn reset(&mut self) {
        self.simulator.reset();
        self.ticker.stop();
        self.feedback.stop_all();
        self.auto_advance.disarm();
        self.pending = None;
        self.gesture = None;
        self.turn.settle();
        log::debug!("Coordinator reset on page {}", self.turn.current_page);
    }
}

impl Drop for TurnCoordinator {
    fn drop(&mut self) {
        self.ticker.stop();
        self.auto_advance.disarm();
        self.feedback.stop_all();
    }
}

impl std::fmt::Debug for TurnCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnCoordinator")
            .field("turn", &self.turn)
            .field("phase", &self.simulator.phase())
            .field("pending", &self.pending)
            .field("ticking", &self.ticker.is_running())
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn boundary_event(direction: TurnDirection) -> TurnEvent {
    match direction {
        TurnDirection::Forward => TurnEvent::ReachedEnd,
        TurnDirection::Backward => TurnEvent::ReachedStart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn recorded(coordinator: &mut TurnCoordinator) -> Rc<RefCell<Vec<TurnEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        coordinator.subscribe(move |event: &TurnEvent| sink.borrow_mut().push(*event));
        events
    }

    fn run_frames(coordinator: &mut TurnCoordinator, max_frames: usize) -> Vec<CommittedTurn> {
        let mut commits = Vec::new();
        for _ in 0..max_frames {
            if !coordinator.is_ticking() {
                break;
            }
            commits.extend(coordinator.tick(DT));
        }
        commits
    }

    #[test]
    fn test_unanimated_next_page() {
        let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 3);
        let events = recorded(&mut coordinator);

        assert!(coordinator.go_to_next_page(false));
        assert_eq!(coordinator.current_page(), 1);
        assert!(!coordinator.is_ticking());
        assert_eq!(
            *events.borrow(),
            vec![TurnEvent::PageChanged(1), TurnEvent::Progress(0.5)]
        );
    }

    #[test]
    fn test_animated_turn_commits_once() {
        let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 3);
        let events = recorded(&mut coordinator);

        assert!(coordinator.go_to_next_page(true));
        assert!(coordinator.is_ticking());
        assert_eq!(coordinator.current_page(), 0, "Page changes only on settle");

        let commits = run_frames(&mut coordinator, 1200);
        assert_eq!(commits.len(), 1);
        assert_eq!(coordinator.current_page(), 1);
        assert_eq!(coordinator.phase(), TurnPhase::Idle);
        assert!(!coordinator.is_ticking());

        let changes = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, TurnEvent::PageChanged(_)))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_animation_mode_none_jumps() {
        let config = TurnConfiguration::default().with_animation_mode(crate::config::AnimationMode::None);
        let mut coordinator = TurnCoordinator::new(config, 5);
        assert!(coordinator.go_to_page(3, true));
        assert_eq!(coordinator.current_page(), 3);
        assert!(!coordinator.is_animating());
    }

    #[test]
    fn test_requests_ignored_while_animating() {
        let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 5);
        coordinator.go_to_next_page(true);
        coordinator.tick(DT);
        assert!(!coordinator.go_to_next_page(true));
        assert!(!coordinator.go_to_page(4, false));

        run_frames(&mut coordinator, 1200);
        assert_eq!(coordinator.current_page(), 1);
    }

    #[test]
    fn test_cancel_turn_keeps_page() {
        let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 5);
        let events = recorded(&mut coordinator);
        coordinator.go_to_next_page(true);
        coordinator.tick(DT);
        assert!(coordinator.cancel_turn());

        let commits = run_frames(&mut coordinator, 1200);
        assert!(commits.is_empty());
        assert_eq!(coordinator.current_page(), 0);
        assert!(events.borrow().contains(&TurnEvent::TurnCancelled));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 5);
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = coordinator.subscribe(move |_: &TurnEvent| *sink.borrow_mut() += 1);

        coordinator.go_to_next_page(false);
        assert!(coordinator.unsubscribe(id));
        coordinator.go_to_next_page(false);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_shrinking_book_clamps_page() {
        let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10).with_start_page(8);
        let events = recorded(&mut coordinator);
        coordinator.set_total_pages(4);
        assert_eq!(coordinator.current_page(), 3);
        assert_eq!(events.borrow().first(), Some(&TurnEvent::PageChanged(3)));
    }

    #[test]
    fn test_shadow_follows_leaf() {
        let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 5);
        assert!(coordinator.shadow().opacity < 1e-6);
        coordinator.begin_drag(300.0);
        coordinator.update_drag(100.0, 300.0, 400.0);
        assert!(coordinator.shadow().opacity > 0.0);
    }
}
