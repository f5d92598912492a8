//! Headless main window.
//!
//! Holds the state a real window would (opacity, zoom, position, visibility)
//! and forwards every event to a writer as one JSON object per line:
//!
//! ```json
//! {"event":"screenshot-taken","payload":{"path":"/…/a.png","preview":"data:image/png;base64,…"}}
//! {"event":"reset-view","payload":{}}
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::context::{WindowEvent, WindowHandle};
use crate::window_control::{clamp_opacity, DEFAULT_ZOOM_LEVEL};

type CloseListener = Box<dyn Fn() + Send + Sync>;

pub struct HeadlessWindow {
    opacity: Mutex<f64>,
    zoom_level: Mutex<f64>,
    position: Mutex<(i32, i32)>,
    visible: AtomicBool,
    destroyed: AtomicBool,
    close_listeners: Mutex<Vec<CloseListener>>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl HeadlessWindow {
    pub fn new(opacity: f64, out: Box<dyn Write + Send>) -> Self {
        Self {
            opacity: Mutex::new(clamp_opacity(opacity)),
            zoom_level: Mutex::new(DEFAULT_ZOOM_LEVEL),
            position: Mutex::new((0, 0)),
            visible: AtomicBool::new(true),
            destroyed: AtomicBool::new(false),
            close_listeners: Mutex::new(Vec::new()),
            out: Mutex::new(out),
        }
    }

    /// Write one event line. Dropped once the window is destroyed.
    pub fn emit(&self, event: &str, payload: Value) {
        if self.is_destroyed() {
            debug!(event, "Window destroyed, dropping event");
            return;
        }
        let line = json!({ "event": event, "payload": payload });
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!(event, error = %e, "Failed to write window event");
        }
    }

    pub fn position(&self) -> (i32, i32) {
        *self.position.lock()
    }

    pub fn set_position(&self, position: (i32, i32)) {
        *self.position.lock() = position;
        self.emit("window-moved", json!({ "x": position.0, "y": position.1 }));
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
        self.emit(if visible { "window-shown" } else { "window-hidden" }, json!({}));
    }

    /// Run `listener` when the window closes, unless listeners are removed first.
    pub fn on_close(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.close_listeners.lock().push(Box::new(listener));
    }
}

impl WindowHandle for HeadlessWindow {
    fn opacity(&self) -> f64 {
        *self.opacity.lock()
    }

    fn set_opacity(&self, opacity: f64) {
        let opacity = clamp_opacity(opacity);
        *self.opacity.lock() = opacity;
        self.emit("opacity-changed", json!({ "opacity": opacity }));
    }

    fn zoom_level(&self) -> f64 {
        *self.zoom_level.lock()
    }

    fn set_zoom_level(&self, level: f64) {
        *self.zoom_level.lock() = level;
        self.emit("zoom-changed", json!({ "zoomLevel": level }));
    }

    fn send(&self, event: WindowEvent) {
        self.emit(event.name(), event.payload());
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn remove_all_listeners(&self) {
        self.close_listeners.lock().clear();
    }

    fn close(&self) {
        if self.is_destroyed() {
            return;
        }
        self.emit("window-closed", json!({}));
        self.destroyed.store(true, Ordering::SeqCst);
        let listeners = std::mem::take(&mut *self.close_listeners.lock());
        for listener in listeners {
            listener();
        }
    }
}
