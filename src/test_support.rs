//! In-memory collaborators for dispatcher and registry tests.
//!
//! Every fake appends to a shared [`CallLog`] so tests can assert the order
//! of side effects across collaborators (e.g. cancel before clear).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::actions::Direction;
use crate::config::{AppConfig, ConfigError};
use crate::context::{
    ActionContext, CaptureError, ConfigStore, ProcessingController, View, WindowEvent,
    WindowHandle,
};
use crate::hotkeys::{HotkeyBackend, HotkeyError};
use crate::shortcuts::{Platform, Shortcut};

/// Parse a combo with Linux semantics (`CommandOrControl` = Ctrl).
pub fn combo(s: &str) -> Shortcut {
    Shortcut::parse_for_platform(s, Platform::Linux).unwrap()
}

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.lock().iter().any(|e| e == entry)
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == entry)
    }
}

// ============================================
// HOTKEY BACKEND
// ============================================

#[derive(Default)]
struct BackendState {
    next_id: u32,
    active: HashMap<u32, Shortcut>,
    /// Combos held by "another process"
    taken: HashSet<Shortcut>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
    log: CallLog,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Simulate another process owning `combo`.
    pub fn take(&self, combo: &Shortcut) {
        self.state.lock().taken.insert(combo.clone());
    }

    pub fn release(&self, combo: &Shortcut) {
        self.state.lock().taken.remove(combo);
    }

    pub fn is_active(&self, combo: &Shortcut) -> bool {
        self.state.lock().active.values().any(|s| s == combo)
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().active.len()
    }
}

impl HotkeyBackend for FakeBackend {
    fn register(&mut self, shortcut: &Shortcut) -> Result<u32, HotkeyError> {
        let mut state = self.state.lock();
        if state.taken.contains(shortcut) || state.active.values().any(|s| s == shortcut) {
            return Err(HotkeyError::AlreadyRegistered(shortcut.display()));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.active.insert(id, shortcut.clone());
        self.log.push(format!("register:{}", shortcut.to_canonical_string()));
        Ok(id)
    }

    fn unregister(&mut self, hotkey_id: u32) -> Result<(), HotkeyError> {
        if let Some(shortcut) = self.state.lock().active.remove(&hotkey_id) {
            self.log.push(format!("unregister:{}", shortcut.to_canonical_string()));
        }
        Ok(())
    }
}

// ============================================
// WINDOW
// ============================================

pub struct FakeWindow {
    pub opacity: Mutex<f64>,
    pub zoom: Mutex<f64>,
    pub events: Mutex<Vec<WindowEvent>>,
    pub destroyed: AtomicBool,
    log: CallLog,
}

impl FakeWindow {
    pub fn new(log: CallLog) -> Self {
        Self {
            opacity: Mutex::new(1.0),
            zoom: Mutex::new(0.0),
            events: Mutex::new(Vec::new()),
            destroyed: AtomicBool::new(false),
            log,
        }
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(WindowEvent::name).collect()
    }
}

impl WindowHandle for FakeWindow {
    fn opacity(&self) -> f64 {
        *self.opacity.lock()
    }

    fn set_opacity(&self, opacity: f64) {
        *self.opacity.lock() = opacity;
    }

    fn zoom_level(&self) -> f64 {
        *self.zoom.lock()
    }

    fn set_zoom_level(&self, level: f64) {
        *self.zoom.lock() = level;
    }

    fn send(&self, event: WindowEvent) {
        self.log.push(format!("send:{}", event.name()));
        self.events.lock().push(event);
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn remove_all_listeners(&self) {
        self.log.push("remove_all_listeners");
    }

    fn close(&self) {
        self.log.push("close");
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

// ============================================
// CONFIG STORE
// ============================================

#[derive(Default)]
pub struct FakeStore {
    pub config: Mutex<AppConfig>,
    pub fail_saves: AtomicBool,
    pub saves: AtomicUsize,
}

impl ConfigStore for FakeStore {
    fn load_config(&self) -> Result<AppConfig, ConfigError> {
        Ok(self.config.lock().clone())
    }

    fn save_config(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ConfigError::Io {
                path: PathBuf::from("/read-only/config.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.config.lock() = config.clone();
        Ok(())
    }
}

// ============================================
// PROCESSING + CONTEXT
// ============================================

pub struct FakeProcessing {
    log: CallLog,
}

impl ProcessingController for FakeProcessing {
    fn process_screenshots(&self) -> impl std::future::Future<Output = ()> + Send {
        let log = self.log.clone();
        async move {
            tokio::task::yield_now().await;
            log.push("process_screenshots");
        }
    }

    fn cancel_ongoing_requests(&self) {
        self.log.push("cancel_ongoing_requests");
    }
}

pub struct FakeContext {
    pub log: CallLog,
    pub window: Mutex<Option<Arc<FakeWindow>>>,
    pub visible: AtomicBool,
    pub store: FakeStore,
    pub processing: Option<FakeProcessing>,
    pub capture_fails: AtomicBool,
    pub preview_fails: AtomicBool,
    pub view: Mutex<Option<View>>,
}

impl FakeContext {
    /// Context with a visible window and a processing controller.
    pub fn new(log: CallLog) -> Self {
        Self {
            window: Mutex::new(Some(Arc::new(FakeWindow::new(log.clone())))),
            visible: AtomicBool::new(true),
            store: FakeStore::default(),
            processing: Some(FakeProcessing { log: log.clone() }),
            capture_fails: AtomicBool::new(false),
            preview_fails: AtomicBool::new(false),
            view: Mutex::new(None),
            log,
        }
    }

    pub fn without_window(log: CallLog) -> Self {
        let ctx = Self::new(log);
        *ctx.window.lock() = None;
        ctx
    }

    pub fn fake_window(&self) -> Arc<FakeWindow> {
        self.window.lock().clone().expect("context has no window")
    }

    pub fn is_shown(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl ActionContext for FakeContext {
    type Processing = FakeProcessing;

    fn main_window(&self) -> Option<Arc<dyn WindowHandle>> {
        self.window
            .lock()
            .clone()
            .map(|w| w as Arc<dyn WindowHandle>)
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn toggle_main_window(&self) {
        self.log.push("toggle_main_window");
        self.visible.fetch_xor(true, Ordering::SeqCst);
    }

    fn move_window(&self, direction: Direction) {
        self.log.push(format!("move:{}", direction.as_str()));
    }

    fn take_screenshot(
        &self,
    ) -> impl std::future::Future<Output = Result<PathBuf, CaptureError>> + Send {
        let fails = self.capture_fails.load(Ordering::SeqCst);
        let log = self.log.clone();
        async move {
            tokio::task::yield_now().await;
            log.push("take_screenshot");
            if fails {
                Err(CaptureError::NoCommand)
            } else {
                Ok(PathBuf::from("/tmp/shots/one.png"))
            }
        }
    }

    fn image_preview(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<String, CaptureError>> + Send {
        let fails = self.preview_fails.load(Ordering::SeqCst);
        let path = path.to_path_buf();
        async move {
            if fails {
                Err(CaptureError::Image {
                    path,
                    reason: "corrupt".into(),
                })
            } else {
                Ok("data:image/png;base64,AAAA".to_string())
            }
        }
    }

    fn clear_queues(&self) {
        self.log.push("clear_queues");
    }

    fn set_view(&self, view: View) {
        self.log.push(format!("set_view:{}", view.as_str()));
        *self.view.lock() = Some(view);
    }

    fn processing(&self) -> Option<&FakeProcessing> {
        self.processing.as_ref()
    }

    fn config_store(&self) -> &dyn ConfigStore {
        &self.store
    }

    fn quit_app(&self) {
        self.log.push("quit_app");
    }

    fn force_exit(&self) {
        self.log.push("force_exit");
    }
}
