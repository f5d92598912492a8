//! Headless desktop host.
//!
//! The production [`ActionContext`]: a window that reports to stdout, the two
//! screenshot queues, command-driven capture, PNG previews, the JSON config
//! store and a shutdown signal the event loop waits on.

mod capture;
mod processing;
mod queues;
mod window;

pub use capture::{preview_data_url, preview_data_url_async, CommandCapture, PATH_PLACEHOLDER};
pub use processing::ProcessingBridge;
pub use queues::{QueueKind, ScreenshotQueues};
pub use window::HeadlessWindow;

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::actions::Direction;
use crate::config::{AppConfig, JsonConfigStore};
use crate::context::{ActionContext, CaptureError, ConfigStore, View, WindowHandle};
use crate::error::ResultExt;
use crate::shortcuts::Platform;
use crate::window_control::translate;

/// Shared, replaceable handle to the main window.
pub type WindowSlot = Arc<Mutex<Option<Arc<HeadlessWindow>>>>;

pub struct DesktopHost {
    window: WindowSlot,
    queues: Arc<ScreenshotQueues>,
    view: Mutex<View>,
    processing: ProcessingBridge,
    store: JsonConfigStore,
    capture: CommandCapture,
    move_step: i32,
    preview_max_size: u32,
    shutdown: Arc<Notify>,
}

impl DesktopHost {
    /// Build the host and open its main window, writing events to `out`.
    pub fn new(config: &AppConfig, store: JsonConfigStore, out: Box<dyn Write + Send>) -> Self {
        let queues = Arc::new(ScreenshotQueues::new(config.max_queue_length));
        let window: WindowSlot = Arc::new(Mutex::new(None));
        let shutdown = Arc::new(Notify::new());

        let host = Self {
            processing: ProcessingBridge::new(Arc::clone(&queues), Arc::clone(&window)),
            capture: CommandCapture::new(
                config.screenshot_command_for(Platform::current()),
                config.screenshot_dir_path(),
            ),
            window,
            queues,
            view: Mutex::new(View::Queue),
            store,
            move_step: config.move_step,
            preview_max_size: config.preview_max_size,
            shutdown,
        };
        host.open_window(config.opacity, out);
        host
    }

    fn open_window(&self, opacity: f64, out: Box<dyn Write + Send>) {
        let window = Arc::new(HeadlessWindow::new(opacity, out));
        // Closing the window by any other route ends the app
        let shutdown = Arc::clone(&self.shutdown);
        window.on_close(move || shutdown.notify_one());
        *self.window.lock() = Some(window);
    }

    fn current_window(&self) -> Option<Arc<HeadlessWindow>> {
        self.window.lock().clone().filter(|w| !w.is_destroyed())
    }

    /// Resolves once the app has been asked to quit.
    pub fn shutdown_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    pub fn queues(&self) -> &ScreenshotQueues {
        &self.queues
    }

    pub fn view(&self) -> View {
        *self.view.lock()
    }

    /// Queue a finished capture, removing the file of any evicted screenshot.
    fn enqueue(&self, path: PathBuf) {
        let kind = QueueKind::for_view(self.view());
        if let Some(evicted) = self.queues.push(kind, path) {
            debug!(path = %evicted.display(), "Queue full, dropping oldest screenshot");
            std::fs::remove_file(&evicted).warn_on_err();
        }
    }
}

impl ActionContext for DesktopHost {
    type Processing = ProcessingBridge;

    fn main_window(&self) -> Option<Arc<dyn WindowHandle>> {
        self.window
            .lock()
            .clone()
            .map(|w| w as Arc<dyn WindowHandle>)
    }

    fn is_visible(&self) -> bool {
        self.current_window().is_some_and(|w| w.is_visible())
    }

    fn toggle_main_window(&self) {
        if let Some(window) = self.current_window() {
            window.set_visible(!window.is_visible());
        }
    }

    fn move_window(&self, direction: Direction) {
        if let Some(window) = self.current_window() {
            window.set_position(translate(window.position(), direction, self.move_step));
        }
    }

    fn take_screenshot(&self) -> impl Future<Output = Result<PathBuf, CaptureError>> + Send {
        async move {
            let path = self.capture.capture().await?;
            self.enqueue(path.clone());
            Ok(path)
        }
    }

    fn image_preview(&self, path: &Path) -> impl Future<Output = Result<String, CaptureError>> + Send {
        preview_data_url_async(path, self.preview_max_size)
    }

    fn clear_queues(&self) {
        let removed = self.queues.clear();
        info!(count = removed.len(), "Screenshot queues cleared");
        for path in removed {
            std::fs::remove_file(&path).warn_on_err();
        }
    }

    fn set_view(&self, view: View) {
        *self.view.lock() = view;
        if let Some(window) = self.current_window() {
            window.emit("view-changed", json!({ "view": view.as_str() }));
        }
    }

    fn processing(&self) -> Option<&ProcessingBridge> {
        Some(&self.processing)
    }

    fn config_store(&self) -> &dyn ConfigStore {
        &self.store
    }

    fn quit_app(&self) {
        info!("Application quit requested");
        self.shutdown.notify_one();
    }

    fn force_exit(&self) {
        warn!("Shutdown did not finish in time, exiting");
        std::process::exit(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn host(dir: &Path) -> DesktopHost {
        let config = AppConfig {
            screenshot_dir: Some(dir.join("shots").to_string_lossy().into_owned()),
            screenshot_command: Some(vec!["touch".into(), PATH_PLACEHOLDER.into()]),
            max_queue_length: 2,
            ..Default::default()
        };
        DesktopHost::new(
            &config,
            JsonConfigStore::new(dir.join("config.json")),
            Box::new(std::io::sink()),
        )
    }

    #[test]
    fn toggle_and_move_act_on_the_window() {
        let dir = tempdir().unwrap();
        let host = host(dir.path());
        assert!(host.is_visible());
        host.toggle_main_window();
        assert!(!host.is_visible());

        host.move_window(Direction::Right);
        host.move_window(Direction::Down);
        let window = host.current_window().unwrap();
        assert_eq!(window.position(), (60, 60));
    }

    #[tokio::test]
    async fn closing_the_window_signals_shutdown() {
        let dir = tempdir().unwrap();
        let host = host(dir.path());
        let signal = host.shutdown_signal();
        host.main_window().unwrap().close();
        assert!(!host.is_visible());
        assert!(host.current_window().is_none());
        // notify_one stores a permit, so this resolves immediately
        signal.notified().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn screenshots_land_in_queue_for_current_view() {
        let dir = tempdir().unwrap();
        let host = host(dir.path());

        let first = host.take_screenshot().await.unwrap();
        assert_eq!(host.queues().snapshot(QueueKind::Main), vec![first.clone()]);

        host.set_view(View::Solutions);
        host.take_screenshot().await.unwrap();
        assert_eq!(host.queues().len(QueueKind::Extra), 1);

        host.clear_queues();
        assert_eq!(host.queues().len(QueueKind::Main), 0);
        assert!(!first.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn full_queue_deletes_evicted_file() {
        let dir = tempdir().unwrap();
        let host = host(dir.path());

        let oldest = host.take_screenshot().await.unwrap();
        host.take_screenshot().await.unwrap();
        host.take_screenshot().await.unwrap();

        assert_eq!(host.queues().len(QueueKind::Main), 2);
        assert!(!oldest.exists());
    }

    #[test]
    fn config_store_persists_to_configured_path() {
        let dir = tempdir().unwrap();
        let host = host(dir.path());
        crate::window_control::persist_opacity(host.config_store(), 0.3).unwrap();
        let saved = host.config_store().load_config().unwrap();
        assert!((saved.opacity - 0.3).abs() < 1e-9);
    }
}
