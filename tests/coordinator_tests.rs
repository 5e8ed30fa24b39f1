//! Integration tests for the turn coordinator.
//!
//! Covers the state machine, boundary notifications, gesture handling,
//! feedback lifecycle, auto-advance and the injected frame ticker.

use std::cell::RefCell;
use std::rc::Rc;

use page_curl_engine::{
    config::TurnConfiguration,
    coordinator::{FrameTicker, TurnCoordinator, TurnEvent},
    feedback::{HapticPulse, HapticSink, SoundCue, SoundSink},
    state::{TurnDirection, TurnPhase},
};

const DT: f32 = 1.0 / 60.0;
const WIDTH: f32 = 400.0;

type Log<T> = Rc<RefCell<Vec<T>>>;

fn record_events(coordinator: &mut TurnCoordinator) -> Log<TurnEvent> {
    let events: Log<TurnEvent> = Rc::default();
    let sink = Rc::clone(&events);
    coordinator.subscribe(move |event: &TurnEvent| sink.borrow_mut().push(*event));
    events
}

fn count(events: &Log<TurnEvent>, wanted: TurnEvent) -> usize {
    events.borrow().iter().filter(|e| **e == wanted).count()
}

fn page_changes(events: &Log<TurnEvent>) -> Vec<usize> {
    events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            TurnEvent::PageChanged(page) => Some(*page),
            _ => None,
        })
        .collect()
}

/// Tick while the ticker runs; returns frames ticked
fn run_until_idle(coordinator: &mut TurnCoordinator) -> usize {
    let mut frames = 0;
    while coordinator.is_ticking() {
        coordinator.tick(DT);
        frames += 1;
        assert!(frames < 2000, "Coordinator should come to rest");
    }
    frames
}

/// Drag leftward (forward) to `fraction` of the viewport
fn drag_forward(coordinator: &mut TurnCoordinator, fraction: f32) {
    let start = 350.0;
    coordinator.begin_drag(start);
    coordinator.update_drag(start - 1.0, start, WIDTH);
    coordinator.update_drag(start - fraction * WIDTH, start, WIDTH);
}

// ============================================================================
// Boundaries
// ============================================================================

#[test]
fn test_previous_at_first_page_reaches_start_once() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    let events = record_events(&mut coordinator);

    assert!(!coordinator.go_to_previous_page(true));
    assert_eq!(coordinator.current_page(), 0);
    assert!(!coordinator.is_ticking());
    assert_eq!(*events.borrow(), vec![TurnEvent::ReachedStart]);
}

#[test]
fn test_next_at_last_page_reaches_end() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 3).with_start_page(2);
    let events = record_events(&mut coordinator);

    assert!(!coordinator.go_to_next_page(true));
    assert_eq!(coordinator.current_page(), 2);
    assert_eq!(count(&events, TurnEvent::ReachedEnd), 1);
    assert!(page_changes(&events).is_empty());
}

#[test]
fn test_drag_toward_boundary_reports_once_and_holds() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    let events = record_events(&mut coordinator);

    // Rightward drag on the first page asks for a previous page
    coordinator.begin_drag(50.0);
    for x in [60.0, 120.0, 200.0, 300.0] {
        coordinator.update_drag(x, 50.0, WIDTH);
    }
    assert_eq!(count(&events, TurnEvent::ReachedStart), 1);
    assert!(coordinator.mesh().is_flat(), "Blocked page stays at rest");

    coordinator.end_drag(2000.0, TurnDirection::Backward);
    run_until_idle(&mut coordinator);
    assert_eq!(coordinator.current_page(), 0);
    assert!(page_changes(&events).is_empty());
}

// ============================================================================
// Programmatic turns
// ============================================================================

#[test]
fn test_animated_next_page_commits_exactly_once() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10).with_start_page(4);
    let events = record_events(&mut coordinator);

    assert!(coordinator.go_to_next_page(true));
    assert_eq!(coordinator.phase(), TurnPhase::Animating);

    let mut commits = Vec::new();
    while coordinator.is_ticking() {
        commits.extend(coordinator.tick(DT));
        if coordinator.phase() == TurnPhase::Completed {
            assert_eq!(coordinator.current_page(), 5, "Completed is observable after commit");
        }
    }

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].from_page, 4);
    assert_eq!(commits[0].to_page, 5);
    assert_eq!(page_changes(&events), vec![5]);
    assert_eq!(count(&events, TurnEvent::Progress(5.0 / 9.0)), 1);
    assert_eq!(coordinator.phase(), TurnPhase::Idle);

    let snapshot = coordinator.snapshot();
    assert!(!snapshot.is_turning);
    assert_eq!(snapshot.progress, 0.0);
}

#[test]
fn test_non_adjacent_animated_jump() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10).with_start_page(1);
    let events = record_events(&mut coordinator);

    assert!(coordinator.go_to_page(7, true));
    run_until_idle(&mut coordinator);
    assert_eq!(coordinator.current_page(), 7);
    assert_eq!(page_changes(&events), vec![7]);

    assert!(coordinator.go_to_page(2, true));
    run_until_idle(&mut coordinator);
    assert_eq!(page_changes(&events), vec![7, 2]);
    assert_eq!(coordinator.turn_state().direction, TurnDirection::Backward);
}

#[test]
fn test_reset_from_animation() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    let events = record_events(&mut coordinator);
    coordinator.go_to_next_page(true);
    coordinator.tick(DT);

    coordinator.reset();
    assert_eq!(coordinator.phase(), TurnPhase::Idle);
    assert!(!coordinator.is_ticking());
    assert!(coordinator.mesh().is_flat());
    assert_eq!(coordinator.tick(DT), None);
    assert!(page_changes(&events).is_empty());
}

// ============================================================================
// Drag gestures
// ============================================================================

#[test]
fn test_drag_past_middle_commits() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10).with_start_page(3);
    let events = record_events(&mut coordinator);

    drag_forward(&mut coordinator, 0.6);
    assert!(coordinator.is_dragging());
    assert!(!coordinator.is_ticking());
    assert_eq!(count(&events, TurnEvent::TurnStarted(TurnDirection::Forward)), 1);

    let decision = coordinator.end_drag(0.0, TurnDirection::Forward).unwrap();
    assert!(decision.commits);
    assert!(coordinator.is_ticking());

    run_until_idle(&mut coordinator);
    assert_eq!(coordinator.current_page(), 4);
    assert_eq!(page_changes(&events), vec![4]);
}

#[test]
fn test_short_drag_cancels() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10).with_start_page(3);
    let events = record_events(&mut coordinator);

    drag_forward(&mut coordinator, 0.4);
    let decision = coordinator.end_drag(0.0, TurnDirection::Forward).unwrap();
    assert!(!decision.commits);
    assert_eq!(count(&events, TurnEvent::TurnCancelled), 1);

    run_until_idle(&mut coordinator);
    assert_eq!(coordinator.current_page(), 3);
    assert!(page_changes(&events).is_empty());
}

#[test]
fn test_fast_flick_commits_short_drag() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    drag_forward(&mut coordinator, 0.1);

    // 800 px/s across a 400 px viewport is 2 progress/s
    let decision = coordinator.end_drag(800.0, TurnDirection::Forward).unwrap();
    assert!(decision.commits);
    run_until_idle(&mut coordinator);
    assert_eq!(coordinator.current_page(), 1);
}

#[test]
fn test_backward_drag_turns_back() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10).with_start_page(5);
    let events = record_events(&mut coordinator);

    coordinator.begin_drag(50.0);
    coordinator.update_drag(60.0, 50.0, WIDTH);
    coordinator.update_drag(330.0, 50.0, WIDTH);
    assert_eq!(coordinator.turn_state().direction, TurnDirection::Backward);
    assert!(coordinator.simulator().progress() < 0.5);

    coordinator.end_drag(0.0, TurnDirection::Backward);
    run_until_idle(&mut coordinator);
    assert_eq!(coordinator.current_page(), 4);
    assert_eq!(page_changes(&events), vec![4]);
}

#[test]
fn test_begin_drag_interrupts_animation() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    let events = record_events(&mut coordinator);

    coordinator.go_to_next_page(true);
    for _ in 0..5 {
        coordinator.tick(DT);
    }
    coordinator.begin_drag(200.0);

    assert!(coordinator.is_dragging());
    assert!(!coordinator.is_animating());
    assert!(!coordinator.is_ticking(), "Ticker stops on interruption");
    assert_eq!(count(&events, TurnEvent::TurnCancelled), 1);

    for _ in 0..120 {
        assert_eq!(coordinator.tick(DT), None);
    }
    assert_eq!(coordinator.current_page(), 0);
    assert!(page_changes(&events).is_empty());
}

#[test]
fn test_programmatic_turn_ignored_while_dragging() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    drag_forward(&mut coordinator, 0.3);
    assert!(!coordinator.go_to_next_page(true));
    assert!(!coordinator.go_to_page(5, false));
    assert_eq!(coordinator.current_page(), 0);
}

#[test]
fn test_stray_gesture_calls_are_ignored() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    coordinator.update_drag(100.0, 300.0, WIDTH);
    assert!(coordinator.end_drag(500.0, TurnDirection::Forward).is_none());
    assert_eq!(coordinator.phase(), TurnPhase::Idle);
}

// ============================================================================
// Feedback
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Feedback {
    Cue(SoundCue),
    Rustle(f32),
    StopRustle,
    Pulse(HapticPulse),
    Continuous(f32),
    StopContinuous,
}

#[derive(Clone, Default)]
struct Recorder(Log<Feedback>);

impl SoundSink for Recorder {
    fn play(&mut self, cue: SoundCue, _volume: f32) {
        self.0.borrow_mut().push(Feedback::Cue(cue));
    }
    fn rustle(&mut self, intensity: f32) {
        self.0.borrow_mut().push(Feedback::Rustle(intensity));
    }
    fn stop_rustle(&mut self) {
        self.0.borrow_mut().push(Feedback::StopRustle);
    }
}

impl HapticSink for Recorder {
    fn pulse(&mut self, pulse: HapticPulse, _intensity: f32) {
        self.0.borrow_mut().push(Feedback::Pulse(pulse));
    }
    fn continuous(&mut self, intensity: f32) {
        self.0.borrow_mut().push(Feedback::Continuous(intensity));
    }
    fn stop_continuous(&mut self) {
        self.0.borrow_mut().push(Feedback::StopContinuous);
    }
}

fn with_recorder(config: TurnConfiguration) -> (TurnCoordinator, Log<Feedback>) {
    let recorder = Recorder::default();
    let log = Rc::clone(&recorder.0);
    let coordinator = TurnCoordinator::new(config, 10)
        .with_feedback(Box::new(recorder.clone()), Box::new(recorder));
    (coordinator, log)
}

#[test]
fn test_feedback_through_commit() {
    let (mut coordinator, log) = with_recorder(TurnConfiguration::default());
    drag_forward(&mut coordinator, 0.7);
    assert!(coordinator.feedback().is_continuous_active());

    coordinator.end_drag(1200.0, TurnDirection::Forward);
    assert!(!coordinator.feedback().is_continuous_active());

    let log = log.borrow();
    assert_eq!(log.first(), Some(&Feedback::Cue(SoundCue::Lift)));
    assert!(log.contains(&Feedback::Pulse(HapticPulse::Lift)));
    assert!(log.iter().any(|f| matches!(f, Feedback::Rustle(_))));
    assert!(log.contains(&Feedback::StopRustle));
    assert!(log.contains(&Feedback::StopContinuous));
    // 1200 px/s over 400 px is 3 progress/s
    assert!(log.contains(&Feedback::Cue(SoundCue::TurnCrisp)));
    assert!(log.contains(&Feedback::Pulse(HapticPulse::Drop)));
}

#[test]
fn test_feedback_through_cancel() {
    let (mut coordinator, log) = with_recorder(TurnConfiguration::default());
    drag_forward(&mut coordinator, 0.2);
    coordinator.end_drag(0.0, TurnDirection::Forward);

    assert!(!coordinator.feedback().is_continuous_active());
    let log = log.borrow();
    assert!(log.contains(&Feedback::Cue(SoundCue::Drop)));
    assert!(log.contains(&Feedback::StopContinuous));
}

#[test]
fn test_continuous_haptic_is_thirty_percent_of_progress() {
    let config = TurnConfiguration {
        haptic_intensity: 1.0,
        ..Default::default()
    };
    let (mut coordinator, log) = with_recorder(config);
    drag_forward(&mut coordinator, 0.5);

    let last = log
        .borrow()
        .iter()
        .rev()
        .find_map(|f| match f {
            Feedback::Continuous(intensity) => Some(*intensity),
            _ => None,
        })
        .unwrap();
    assert!((last - 0.15).abs() < 1e-5, "Expected 0.15, got {}", last);
}

#[test]
fn test_reset_and_drop_stop_continuous_effects() {
    let (mut coordinator, log) = with_recorder(TurnConfiguration::default());
    drag_forward(&mut coordinator, 0.3);
    coordinator.reset();
    assert!(!coordinator.feedback().is_continuous_active());
    assert!(log.borrow().contains(&Feedback::StopRustle));

    drag_forward(&mut coordinator, 0.3);
    log.borrow_mut().clear();
    drop(coordinator);
    assert!(log.borrow().contains(&Feedback::StopContinuous));
}

#[test]
fn test_disabled_feedback_is_silent() {
    let config = TurnConfiguration {
        sound_enabled: false,
        haptics_enabled: false,
        ..Default::default()
    };
    let (mut coordinator, log) = with_recorder(config);
    drag_forward(&mut coordinator, 0.8);
    coordinator.end_drag(0.0, TurnDirection::Forward);
    run_until_idle(&mut coordinator);
    assert!(log.borrow().is_empty());
}

// ============================================================================
// Auto-advance
// ============================================================================

#[test]
fn test_auto_advance_turns_and_rearms() {
    let config = TurnConfiguration::default().with_auto_advance(2.0);
    let mut coordinator = TurnCoordinator::new(config, 3);
    let events = record_events(&mut coordinator);
    assert!(coordinator.auto_advance().is_armed());

    assert!(!coordinator.advance_clock(1.0));
    assert!(coordinator.advance_clock(1.0));
    assert!(coordinator.is_animating());
    assert!(!coordinator.advance_clock(5.0), "Timer is held during the turn");

    run_until_idle(&mut coordinator);
    assert_eq!(page_changes(&events), vec![1]);
    assert!(coordinator.auto_advance().is_armed());
    assert_eq!(coordinator.auto_advance().remaining_sec(), Some(2.0));

    assert!(coordinator.advance_clock(2.0));
    run_until_idle(&mut coordinator);
    assert_eq!(coordinator.current_page(), 2);
    assert!(!coordinator.auto_advance().is_armed(), "Disarmed on the last page");
    assert!(!coordinator.advance_clock(10.0));
}

#[test]
fn test_auto_advance_suspended_by_drag() {
    let config = TurnConfiguration::default().with_auto_advance(2.0);
    let mut coordinator = TurnCoordinator::new(config, 10);

    coordinator.advance_clock(1.5);
    drag_forward(&mut coordinator, 0.2);
    assert!(coordinator.auto_advance().is_suspended());
    assert!(!coordinator.advance_clock(10.0));

    coordinator.end_drag(0.0, TurnDirection::Forward);
    assert!(!coordinator.auto_advance().is_suspended(), "Resumed after a cancelled drag");
    run_until_idle(&mut coordinator);
    assert!(coordinator.advance_clock(0.5));
}

#[test]
fn test_auto_advance_enabled_mid_drag_starts_after_cancel() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    coordinator.begin_drag(300.0);
    coordinator.update_drag(290.0, 300.0, WIDTH);

    coordinator.set_configuration(TurnConfiguration::default().with_auto_advance(1.0));
    assert!(!coordinator.auto_advance().is_armed(), "Not armed while dragging");

    coordinator.end_drag(0.0, TurnDirection::Forward);
    assert!(coordinator.auto_advance().is_armed(), "Armed once the drag is released");
    run_until_idle(&mut coordinator);
    assert_eq!(coordinator.current_page(), 0);

    assert!(!coordinator.advance_clock(0.5));
    assert!(coordinator.advance_clock(0.5), "Fires one interval after the cancel");
}

#[test]
fn test_auto_advance_enabled_mid_animation_starts_after_cancel() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    assert!(coordinator.go_to_next_page(true));
    coordinator.tick(DT);

    coordinator.set_configuration(TurnConfiguration::default().with_auto_advance(1.0));
    assert!(!coordinator.auto_advance().is_armed());

    assert!(coordinator.cancel_turn());
    run_until_idle(&mut coordinator);
    assert_eq!(coordinator.current_page(), 0);
    assert!(coordinator.auto_advance().is_armed());
    assert!(coordinator.advance_clock(1.0));
}

#[test]
fn test_configuration_toggles_auto_advance() {
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10);
    assert!(!coordinator.auto_advance().is_armed());

    coordinator.set_configuration(TurnConfiguration::default().with_auto_advance(1.0));
    assert!(coordinator.auto_advance().is_armed());

    coordinator.set_configuration(TurnConfiguration::default());
    assert!(!coordinator.auto_advance().is_armed());
    assert!(!coordinator.advance_clock(5.0));
}

#[test]
fn test_reset_disarms_auto_advance() {
    let config = TurnConfiguration::default().with_auto_advance(1.0);
    let mut coordinator = TurnCoordinator::new(config, 10);
    coordinator.reset();
    assert!(!coordinator.auto_advance().is_armed());
    assert!(!coordinator.advance_clock(5.0));
}

// ============================================================================
// Frame ticker
// ============================================================================

#[derive(Default)]
struct TickerLog {
    running: bool,
    starts: usize,
    stops: usize,
}

struct SharedTicker(Rc<RefCell<TickerLog>>);

impl FrameTicker for SharedTicker {
    fn start(&mut self) {
        let mut log = self.0.borrow_mut();
        if !log.running {
            log.running = true;
            log.starts += 1;
        }
    }

    fn stop(&mut self) {
        let mut log = self.0.borrow_mut();
        if log.running {
            log.running = false;
            log.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.0.borrow().running
    }
}

#[test]
fn test_injected_ticker_runs_only_while_turning() {
    let log = Rc::new(RefCell::new(TickerLog::default()));
    let mut coordinator = TurnCoordinator::new(TurnConfiguration::default(), 10)
        .with_ticker(Box::new(SharedTicker(Rc::clone(&log))));

    assert!(!log.borrow().running);
    coordinator.go_to_next_page(true);
    assert!(log.borrow().running);

    let frames = run_until_idle(&mut coordinator);
    assert!(frames > 1);
    assert_eq!(coordinator.phase(), TurnPhase::Idle, "Stopped on the Completed -> Idle frame");
    assert_eq!(log.borrow().starts, 1);
    assert_eq!(log.borrow().stops, 1);

    coordinator.go_to_next_page(true);
    drop(coordinator);
    assert!(!log.borrow().running, "Dropping the coordinator stops the ticker");
}

#[test]
fn test_unanimated_mode_never_ticks() {
    let log = Rc::new(RefCell::new(TickerLog::default()));
    let config = TurnConfiguration::default()
        .with_animation_mode(page_curl_engine::config::AnimationMode::None);
    let mut coordinator =
        TurnCoordinator::new(config, 10).with_ticker(Box::new(SharedTicker(Rc::clone(&log))));
    let events = record_events(&mut coordinator);

    assert!(coordinator.go_to_next_page(true));
    assert_eq!(coordinator.current_page(), 1);
    assert_eq!(log.borrow().starts, 0);
    assert_eq!(page_changes(&events), vec![1]);
}
