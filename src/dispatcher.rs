//! Hotkey-to-action dispatch.
//!
//! One fired hotkey runs exactly one handler. Handlers act only through the
//! injected [`ActionContext`]; synchronous steps run inline, while capture,
//! processing and the development force-exit timer are spawned onto the
//! Tokio runtime and their handles returned.
//!
//! No handler error reaches the caller. Failures are logged where they
//! happen and nothing is retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use crate::actions::{Action, OpacityStep, ZoomChange};
use crate::config::{RunMode, DEFAULT_FORCE_EXIT_GRACE_MS};
use crate::context::{ActionContext, ProcessingController, View, WindowEvent, WindowHandle};
use crate::error::ResultExt;
use crate::hotkeys::BindingRegistry;
use crate::logging;
use crate::window_control::{adjusted_opacity, persist_opacity, zoomed, MIN_OPACITY};

/// Shutdown progress. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QuitPhase {
    Running,
    ShortcutsReleased,
    WindowClosed,
    ProcessExiting,
    /// Development mode only, after the grace period
    ProcessKilled,
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub run_mode: RunMode,
    /// Delay before a development build force-exits after Quit
    pub force_exit_grace: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Production,
            force_exit_grace: Duration::from_millis(DEFAULT_FORCE_EXIT_GRACE_MS),
        }
    }
}

pub struct Dispatcher<C: ActionContext> {
    ctx: Arc<C>,
    registry: Arc<Mutex<BindingRegistry>>,
    options: DispatchOptions,
    quit_requested: AtomicBool,
    quit_phase: Arc<Mutex<QuitPhase>>,
}

impl<C: ActionContext> Dispatcher<C> {
    pub fn new(
        ctx: Arc<C>,
        registry: Arc<Mutex<BindingRegistry>>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            ctx,
            registry,
            options,
            quit_requested: AtomicBool::new(false),
            quit_phase: Arc::new(Mutex::new(QuitPhase::Running)),
        }
    }

    pub fn context(&self) -> &Arc<C> {
        &self.ctx
    }

    pub fn quit_phase(&self) -> QuitPhase {
        *self.quit_phase.lock()
    }

    fn advance(&self, phase: QuitPhase) {
        advance(&self.quit_phase, phase);
    }

    /// Route a fired OS hotkey id to its action.
    pub fn dispatch_hotkey(&self, hotkey_id: u32) -> Option<JoinHandle<()>> {
        let routed = {
            let registry = self.registry.lock();
            registry.action_for(hotkey_id).map(|action| {
                let shortcut = registry
                    .bound()
                    .find(|b| b.hotkey_id == Some(hotkey_id))
                    .map(|b| b.shortcut.display());
                (action, shortcut)
            })
        };

        match routed {
            Some((action, shortcut)) => {
                logging::log_hotkey_event(hotkey_id, action.name(), shortcut.as_deref());
                self.dispatch(action)
            }
            None => {
                debug!(hotkey_id, "Ignoring event for unbound hotkey");
                None
            }
        }
    }

    /// Run the handler for `action`.
    ///
    /// Returns the task handle for handlers that continue asynchronously.
    #[instrument(skip_all, fields(action = %action))]
    pub fn dispatch(&self, action: Action) -> Option<JoinHandle<()>> {
        let window = self.ctx.main_window();
        if action.requires_window() && window.is_none() {
            debug!("No main window, ignoring");
            return None;
        }

        match action {
            Action::Capture => Some(self.capture()),
            Action::Process => self.process(),
            Action::Reset => {
                self.reset(window.as_deref());
                None
            }
            Action::Move(direction) => {
                self.ctx.move_window(direction);
                None
            }
            Action::ToggleVisibility => {
                self.ctx.toggle_main_window();
                None
            }
            Action::Quit => self.quit(),
            Action::AdjustOpacity(step) => {
                if let Some(window) = window {
                    self.adjust_opacity(window.as_ref(), step);
                }
                None
            }
            Action::Zoom(change) => {
                if let Some(window) = window {
                    zoom(window.as_ref(), change);
                }
                None
            }
            Action::DeleteLastScreenshot => {
                if let Some(window) = window.filter(|w| !w.is_destroyed()) {
                    window.send(WindowEvent::DeleteLastScreenshot);
                }
                None
            }
        }
    }

    /// About-to-quit hook: release every binding.
    ///
    /// Safe to call after Quit already released them.
    pub fn will_quit(&self) -> usize {
        let released = self.registry.lock().unregister_all();
        self.advance(QuitPhase::ShortcutsReleased);
        released
    }

    fn capture(&self) -> JoinHandle<()> {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(
            async move {
                let Some(path) = ctx.take_screenshot().await.log_err() else {
                    return;
                };
                let Some(preview) = ctx.image_preview(&path).await.log_err() else {
                    return;
                };
                match ctx.main_window() {
                    Some(window) if !window.is_destroyed() => {
                        info!(path = %path.display(), "Screenshot taken");
                        window.send(WindowEvent::ScreenshotTaken { path, preview });
                    }
                    _ => debug!(path = %path.display(), "Window gone before screenshot was delivered"),
                }
            }
            .instrument(info_span!("capture")),
        )
    }

    fn process(&self) -> Option<JoinHandle<()>> {
        if self.ctx.processing().is_none() {
            warn!("No processing controller available");
            return None;
        }
        let ctx = Arc::clone(&self.ctx);
        Some(tokio::spawn(
            async move {
                if let Some(processing) = ctx.processing() {
                    processing.process_screenshots().await;
                }
            }
            .instrument(info_span!("process")),
        ))
    }

    /// Cancel before clearing so a late response cannot repopulate the queues.
    fn reset(&self, window: Option<&dyn WindowHandle>) {
        if let Some(processing) = self.ctx.processing() {
            processing.cancel_ongoing_requests();
        }
        self.ctx.clear_queues();
        self.ctx.set_view(View::Queue);

        if let Some(window) = window.filter(|w| !w.is_destroyed()) {
            window.send(WindowEvent::ResetView);
            window.send(WindowEvent::Reset);
        }
        info!("Queues reset");
    }

    fn quit(&self) -> Option<JoinHandle<()>> {
        if self.quit_requested.swap(true, Ordering::SeqCst) {
            info!("Quit already in progress");
            return None;
        }

        let released = self.registry.lock().unregister_all();
        self.advance(QuitPhase::ShortcutsReleased);
        info!(released, "Quitting");

        if let Some(window) = self.ctx.main_window() {
            if !window.is_destroyed() {
                window.remove_all_listeners();
                window.close();
            }
        }
        self.advance(QuitPhase::WindowClosed);

        self.ctx.quit_app();
        self.advance(QuitPhase::ProcessExiting);

        if !self.options.run_mode.is_development() {
            return None;
        }
        let ctx = Arc::clone(&self.ctx);
        let phase = Arc::clone(&self.quit_phase);
        let grace = self.options.force_exit_grace;
        Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            warn!(grace_ms = grace.as_millis() as u64, "Forcing exit");
            advance(&phase, QuitPhase::ProcessKilled);
            ctx.force_exit();
        }))
    }

    fn adjust_opacity(&self, window: &dyn WindowHandle, step: OpacityStep) {
        let delta = step.delta();
        let opacity = adjusted_opacity(window.opacity(), delta);
        window.set_opacity(opacity);
        debug!(opacity, "Opacity adjusted");

        // The window keeps the new value even if it cannot be saved
        persist_opacity(self.ctx.config_store(), opacity).warn_on_err();

        if delta > 0.0 && opacity > MIN_OPACITY && !self.ctx.is_visible() {
            self.ctx.toggle_main_window();
        }
    }
}

fn advance(phase: &Mutex<QuitPhase>, next: QuitPhase) {
    let mut current = phase.lock();
    if next > *current {
        *current = next;
    }
}

fn zoom(window: &dyn WindowHandle, change: ZoomChange) {
    let level = zoomed(window.zoom_level(), change);
    window.set_zoom_level(level);
    debug!(level, "Zoom level changed");
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
