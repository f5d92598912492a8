use super::*;
use crate::actions::Direction;
use crate::config::RunMode;
use crate::hotkeys::BindingRegistry;
use crate::test_support::{combo, CallLog, FakeBackend, FakeContext};
use crate::window_control::{MAX_OPACITY, OPACITY_STEP};
use std::sync::atomic::Ordering;

struct Harness {
    log: CallLog,
    backend: FakeBackend,
    registry: Arc<Mutex<BindingRegistry>>,
    dispatcher: Dispatcher<FakeContext>,
}

impl Harness {
    fn ctx(&self) -> &FakeContext {
        self.dispatcher.context()
    }
}

fn harness_with(ctx: impl FnOnce(CallLog) -> FakeContext, run_mode: RunMode) -> Harness {
    let log = CallLog::default();
    let backend = FakeBackend::with_log(log.clone());
    let registry = Arc::new(Mutex::new(BindingRegistry::new(Box::new(backend.clone()))));
    let options = DispatchOptions {
        run_mode,
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(Arc::new(ctx(log.clone())), Arc::clone(&registry), options);
    Harness {
        log,
        backend,
        registry,
        dispatcher,
    }
}

fn harness() -> Harness {
    harness_with(FakeContext::new, RunMode::Production)
}

// ============================================
// ROUTING
// ============================================

#[tokio::test]
async fn hotkey_id_routes_to_bound_action() {
    let h = harness();
    h.registry.lock().register(&combo("Ctrl+Right"), Action::Move(Direction::Right));
    let id = h.registry.lock().bindings()[0].hotkey_id.unwrap();

    assert!(h.dispatcher.dispatch_hotkey(id).is_none());
    assert!(h.log.contains("move:right"));

    // Unknown ids do nothing
    assert!(h.dispatcher.dispatch_hotkey(id + 100).is_none());
    assert_eq!(h.log.entries().iter().filter(|e| e.starts_with("move")).count(), 1);
}

#[tokio::test]
async fn every_trigger_runs_the_handler() {
    let h = harness();
    for _ in 0..3 {
        h.dispatcher.dispatch(Action::ToggleVisibility);
    }
    let toggles = h
        .log
        .entries()
        .iter()
        .filter(|e| *e == "toggle_main_window")
        .count();
    assert_eq!(toggles, 3);
    assert!(!h.ctx().is_shown());
}

#[tokio::test]
async fn window_actions_are_ignored_without_a_window() {
    let h = harness_with(FakeContext::without_window, RunMode::Production);
    for action in [
        Action::Capture,
        Action::Move(Direction::Left),
        Action::AdjustOpacity(OpacityStep::Increase),
        Action::Zoom(ZoomChange::In),
        Action::DeleteLastScreenshot,
    ] {
        assert!(h.dispatcher.dispatch(action).is_none());
    }
    assert!(h.log.entries().is_empty());
    assert_eq!(h.ctx().store.saves.load(Ordering::SeqCst), 0);
}

// ============================================
// CAPTURE / PROCESS
// ============================================

#[tokio::test]
async fn capture_sends_screenshot_with_preview() {
    let h = harness();
    let handle = h.dispatcher.dispatch(Action::Capture).expect("capture task");
    handle.await.unwrap();

    let window = h.ctx().fake_window();
    let events = window.events.lock().clone();
    assert_eq!(
        events,
        vec![WindowEvent::ScreenshotTaken {
            path: "/tmp/shots/one.png".into(),
            preview: "data:image/png;base64,AAAA".into(),
        }]
    );
}

#[tokio::test]
async fn capture_failure_is_logged_not_sent() {
    let h = harness();
    h.ctx().capture_fails.store(true, Ordering::SeqCst);
    h.dispatcher.dispatch(Action::Capture).unwrap().await.unwrap();
    assert!(h.ctx().fake_window().events.lock().is_empty());

    h.ctx().capture_fails.store(false, Ordering::SeqCst);
    h.ctx().preview_fails.store(true, Ordering::SeqCst);
    h.dispatcher.dispatch(Action::Capture).unwrap().await.unwrap();
    assert!(h.ctx().fake_window().events.lock().is_empty());
    assert!(h.log.contains("take_screenshot"));
}

#[tokio::test]
async fn overlapping_captures_all_deliver() {
    let h = harness();
    let handles: Vec<_> = (0..3)
        .map(|_| h.dispatcher.dispatch(Action::Capture).unwrap())
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(h.ctx().fake_window().events.lock().len(), 3);
}

#[tokio::test]
async fn capture_finishing_after_reset_is_still_delivered() {
    let h = harness();
    let capture = h.dispatcher.dispatch(Action::Capture).unwrap();
    h.dispatcher.dispatch(Action::Reset);
    capture.await.unwrap();

    let names = h.ctx().fake_window().event_names();
    assert_eq!(names, vec!["reset-view", "reset", "screenshot-taken"]);
}

#[tokio::test]
async fn process_runs_the_controller() {
    let h = harness();
    h.dispatcher.dispatch(Action::Process).unwrap().await.unwrap();
    assert!(h.log.contains("process_screenshots"));
}

#[tokio::test]
async fn process_without_controller_does_nothing() {
    let h = harness_with(
        |log| FakeContext {
            processing: None,
            ..FakeContext::new(log)
        },
        RunMode::Production,
    );
    assert!(h.dispatcher.dispatch(Action::Process).is_none());
    // Reset still clears queues without a controller
    h.dispatcher.dispatch(Action::Reset);
    assert_eq!(
        h.log.entries(),
        vec!["clear_queues", "set_view:queue", "send:reset-view", "send:reset"]
    );
}

// ============================================
// RESET
// ============================================

#[tokio::test]
async fn reset_cancels_before_clearing_and_returns_to_queue_view() {
    let h = harness();
    h.dispatcher.dispatch(Action::Reset);

    assert_eq!(
        h.log.entries(),
        vec![
            "cancel_ongoing_requests",
            "clear_queues",
            "set_view:queue",
            "send:reset-view",
            "send:reset",
        ]
    );
    assert_eq!(*h.ctx().view.lock(), Some(View::Queue));
}

#[tokio::test]
async fn reset_skips_notifications_for_destroyed_window() {
    let h = harness();
    h.ctx().fake_window().destroyed.store(true, Ordering::SeqCst);
    h.dispatcher.dispatch(Action::Reset);
    assert_eq!(
        h.log.entries(),
        vec!["cancel_ongoing_requests", "clear_queues", "set_view:queue"]
    );
}

// ============================================
// OPACITY / ZOOM / DELETE
// ============================================

#[tokio::test]
async fn opacity_down_applies_clamps_and_persists() {
    let h = harness();
    let window = h.ctx().fake_window();
    *window.opacity.lock() = 0.15;

    h.dispatcher.dispatch(Action::AdjustOpacity(OpacityStep::Decrease));
    assert_eq!(window.opacity(), MIN_OPACITY);
    assert_eq!(h.ctx().store.config.lock().opacity, MIN_OPACITY);

    h.dispatcher.dispatch(Action::AdjustOpacity(OpacityStep::Decrease));
    assert_eq!(window.opacity(), MIN_OPACITY);
}

#[tokio::test]
async fn opacity_up_stops_at_max() {
    let h = harness();
    let window = h.ctx().fake_window();
    *window.opacity.lock() = MAX_OPACITY - OPACITY_STEP / 2.0;

    h.dispatcher.dispatch(Action::AdjustOpacity(OpacityStep::Increase));
    assert_eq!(window.opacity(), MAX_OPACITY);
    assert_eq!(h.ctx().store.config.lock().opacity, MAX_OPACITY);
}

#[tokio::test]
async fn persistence_failure_keeps_in_memory_opacity() {
    let h = harness();
    h.ctx().store.fail_saves.store(true, Ordering::SeqCst);
    let window = h.ctx().fake_window();
    *window.opacity.lock() = 0.5;

    h.dispatcher.dispatch(Action::AdjustOpacity(OpacityStep::Decrease));
    assert!((window.opacity() - 0.4).abs() < 1e-9);
    assert_eq!(h.ctx().store.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn opacity_increase_shows_hidden_window() {
    let h = harness();
    h.ctx().visible.store(false, Ordering::SeqCst);
    *h.ctx().fake_window().opacity.lock() = MIN_OPACITY;

    h.dispatcher.dispatch(Action::AdjustOpacity(OpacityStep::Increase));
    assert!(h.ctx().is_shown());
    assert!(h.log.contains("toggle_main_window"));
}

#[tokio::test]
async fn opacity_decrease_never_toggles_visibility() {
    let h = harness();
    h.ctx().visible.store(false, Ordering::SeqCst);
    *h.ctx().fake_window().opacity.lock() = 0.5;

    h.dispatcher.dispatch(Action::AdjustOpacity(OpacityStep::Decrease));
    assert!(!h.ctx().is_shown());
    assert!(!h.log.contains("toggle_main_window"));
}

#[tokio::test]
async fn opacity_increase_on_visible_window_does_not_toggle() {
    let h = harness();
    *h.ctx().fake_window().opacity.lock() = 0.5;
    h.dispatcher.dispatch(Action::AdjustOpacity(OpacityStep::Increase));
    assert!(h.ctx().is_shown());
    assert!(!h.log.contains("toggle_main_window"));
}

#[tokio::test]
async fn zoom_steps_and_resets() {
    let h = harness();
    let window = h.ctx().fake_window();

    h.dispatcher.dispatch(Action::Zoom(ZoomChange::In));
    h.dispatcher.dispatch(Action::Zoom(ZoomChange::In));
    assert_eq!(window.zoom_level(), 1.0);
    h.dispatcher.dispatch(Action::Zoom(ZoomChange::Out));
    assert_eq!(window.zoom_level(), 0.5);
    h.dispatcher.dispatch(Action::Zoom(ZoomChange::Reset));
    assert_eq!(window.zoom_level(), 0.0);
}

#[tokio::test]
async fn delete_last_screenshot_notifies_window() {
    let h = harness();
    h.dispatcher.dispatch(Action::DeleteLastScreenshot);
    assert_eq!(
        h.ctx().fake_window().event_names(),
        vec!["delete-last-screenshot"]
    );
}

// ============================================
// QUIT
// ============================================

#[tokio::test]
async fn quit_releases_bindings_then_closes_then_quits() {
    let h = harness();
    h.registry.lock().register(&combo("Ctrl+Q"), Action::Quit);
    h.registry.lock().register(&combo("Ctrl+R"), Action::Reset);

    assert!(h.dispatcher.dispatch(Action::Quit).is_none());

    let entries = h.log.entries();
    let quit_log: Vec<&str> = entries
        .iter()
        .map(String::as_str)
        .filter(|e| !e.starts_with("register:"))
        .collect();
    // Release order between combos is unspecified
    let mut released = quit_log[..2].to_vec();
    released.sort();
    assert_eq!(released, vec!["unregister:ctrl+q", "unregister:ctrl+r"]);
    assert_eq!(quit_log[2..], ["remove_all_listeners", "close", "quit_app"]);

    let last_unregister = entries.iter().rposition(|e| e.starts_with("unregister:")).unwrap();
    assert!(last_unregister < h.log.position("remove_all_listeners").unwrap());
    assert!(h.log.position("close").unwrap() < h.log.position("quit_app").unwrap());
    assert!(!h.log.contains("force_exit"));
    assert_eq!(h.dispatcher.quit_phase(), QuitPhase::ProcessExiting);

    // Released combos are free again
    assert_eq!(h.backend.active_count(), 0);
    assert!(h.registry.lock().register(&combo("Ctrl+Q"), Action::Quit));
}

#[tokio::test]
async fn quit_runs_once() {
    let h = harness();
    h.dispatcher.dispatch(Action::Quit);
    h.dispatcher.dispatch(Action::Quit);
    let quits = h.log.entries().iter().filter(|e| *e == "quit_app").count();
    assert_eq!(quits, 1);
}

#[tokio::test]
async fn quit_skips_window_teardown_when_destroyed() {
    let h = harness();
    h.ctx().fake_window().destroyed.store(true, Ordering::SeqCst);
    h.dispatcher.dispatch(Action::Quit);
    assert_eq!(h.log.entries(), vec!["quit_app"]);
}

#[tokio::test(start_paused = true)]
async fn development_quit_force_exits_after_grace_period() {
    let h = harness_with(FakeContext::new, RunMode::Development);
    let timer = h.dispatcher.dispatch(Action::Quit).expect("force-exit timer");

    tokio::time::sleep(Duration::from_millis(DEFAULT_FORCE_EXIT_GRACE_MS / 2)).await;
    assert!(!h.log.contains("force_exit"));
    assert_eq!(h.dispatcher.quit_phase(), QuitPhase::ProcessExiting);

    timer.await.unwrap();
    assert!(h.log.contains("force_exit"));
    assert_eq!(h.dispatcher.quit_phase(), QuitPhase::ProcessKilled);
}

#[tokio::test]
async fn will_quit_releases_everything_once() {
    let h = harness();
    h.registry.lock().register(&combo("Ctrl+B"), Action::ToggleVisibility);

    assert_eq!(h.dispatcher.will_quit(), 1);
    assert_eq!(h.dispatcher.will_quit(), 0);
    assert_eq!(h.dispatcher.quit_phase(), QuitPhase::ShortcutsReleased);
    assert_eq!(h.backend.active_count(), 0);
}
