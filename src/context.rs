//! Capabilities the dispatcher acts through.
//!
//! Handlers never reach for globals. Everything they touch (the main window,
//! the screenshot queues, processing, the config file, process exit) comes in
//! through an [`ActionContext`] so the dispatch table can run against the
//! desktop host or an in-memory fake.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use crate::actions::Direction;
use crate::config::{AppConfig, ConfigError};

/// Messages pushed from the dispatcher to the main window.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    ScreenshotTaken { path: PathBuf, preview: String },
    ResetView,
    Reset,
    DeleteLastScreenshot,
}

impl WindowEvent {
    /// Channel name the renderer listens on.
    pub fn name(&self) -> &'static str {
        match self {
            WindowEvent::ScreenshotTaken { .. } => "screenshot-taken",
            WindowEvent::ResetView => "reset-view",
            WindowEvent::Reset => "reset",
            WindowEvent::DeleteLastScreenshot => "delete-last-screenshot",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            WindowEvent::ScreenshotTaken { path, preview } => json!({
                "path": path.display().to_string(),
                "preview": preview,
            }),
            _ => json!({}),
        }
    }
}

/// Top-level view the window shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Queue,
    Solutions,
    Debug,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Queue => "queue",
            View::Solutions => "solutions",
            View::Debug => "debug",
        }
    }
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no screenshot command available on this platform")]
    NoCommand,

    #[error("screenshot command '{command}' failed: {reason}")]
    Command { command: String, reason: String },

    #[error("screenshot file '{path}' was not produced")]
    MissingOutput { path: PathBuf },

    #[error("failed to read image '{path}': {reason}")]
    Image { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The main application window.
pub trait WindowHandle: Send + Sync {
    fn opacity(&self) -> f64;
    fn set_opacity(&self, opacity: f64);
    fn zoom_level(&self) -> f64;
    fn set_zoom_level(&self, level: f64);
    fn send(&self, event: WindowEvent);
    fn is_destroyed(&self) -> bool;
    fn remove_all_listeners(&self);
    fn close(&self);
}

/// Read/write access to the persisted config file.
pub trait ConfigStore: Send + Sync {
    fn load_config(&self) -> Result<AppConfig, ConfigError>;
    fn save_config(&self, config: &AppConfig) -> Result<(), ConfigError>;
}

/// Drives processing of queued screenshots. Owns its own error reporting.
pub trait ProcessingController: Send + Sync + 'static {
    fn process_screenshots(&self) -> impl Future<Output = ()> + Send;
    fn cancel_ongoing_requests(&self);
}

pub trait ActionContext: Send + Sync + 'static {
    type Processing: ProcessingController;

    /// The main window, if it has been created.
    fn main_window(&self) -> Option<Arc<dyn WindowHandle>>;
    fn is_visible(&self) -> bool;
    fn toggle_main_window(&self);
    fn move_window(&self, direction: Direction);

    /// Capture the screen to a file and return its path.
    fn take_screenshot(&self) -> impl Future<Output = Result<PathBuf, CaptureError>> + Send;
    /// Build a data-URL preview for a captured image.
    fn image_preview(&self, path: &Path)
        -> impl Future<Output = Result<String, CaptureError>> + Send;

    /// Empty both screenshot queues.
    fn clear_queues(&self);
    fn set_view(&self, view: View);
    fn processing(&self) -> Option<&Self::Processing>;
    fn config_store(&self) -> &dyn ConfigStore;

    /// Ask the application to quit through its normal shutdown path.
    fn quit_app(&self);
    /// Terminate the process immediately.
    fn force_exit(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_event_wire_names() {
        assert_eq!(WindowEvent::ResetView.name(), "reset-view");
        assert_eq!(WindowEvent::Reset.name(), "reset");
        assert_eq!(
            WindowEvent::DeleteLastScreenshot.name(),
            "delete-last-screenshot"
        );
        assert_eq!(WindowEvent::Reset.payload(), json!({}));
    }

    #[test]
    fn screenshot_taken_payload_carries_path_and_preview() {
        let event = WindowEvent::ScreenshotTaken {
            path: PathBuf::from("/tmp/shot.png"),
            preview: "data:image/png;base64,AAAA".into(),
        };
        assert_eq!(event.name(), "screenshot-taken");
        assert_eq!(
            event.payload(),
            json!({"path": "/tmp/shot.png", "preview": "data:image/png;base64,AAAA"})
        );
    }
}
