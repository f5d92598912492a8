//! Configuration type definitions
//!
//! This module contains all the struct and enum definitions for configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;
use crate::shortcuts::Platform;

// ============================================
// APP CONFIG
// ============================================

/// Persisted application settings.
///
/// Fields this crate does not know about are kept in `extra` and written
/// back unchanged, so saving the opacity never drops settings owned by
/// other parts of the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Main window opacity in [0.1, 1.0] (default: 1.0)
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Pixels moved per window-move hotkey (default: 60)
    #[serde(default = "default_move_step")]
    pub move_step: i32,
    /// Where captured screenshots are written (default: ~/.hotkey-dispatch/screenshots)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_dir: Option<String>,
    /// Screenshot command as argv; `{path}` is replaced by the output file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_command: Option<Vec<String>>,
    /// Capacity of each screenshot queue (default: 5)
    #[serde(default = "default_max_queue_length")]
    pub max_queue_length: usize,
    /// Longest edge of preview thumbnails in pixels (default: 320)
    #[serde(default = "default_preview_max_size")]
    pub preview_max_size: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_opacity() -> f64 {
    DEFAULT_OPACITY
}
fn default_move_step() -> i32 {
    DEFAULT_MOVE_STEP
}
fn default_max_queue_length() -> usize {
    DEFAULT_MAX_QUEUE_LENGTH
}
fn default_preview_max_size() -> u32 {
    DEFAULT_PREVIEW_MAX_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            opacity: DEFAULT_OPACITY,
            move_step: DEFAULT_MOVE_STEP,
            screenshot_dir: None,
            screenshot_command: None,
            max_queue_length: DEFAULT_MAX_QUEUE_LENGTH,
            preview_max_size: DEFAULT_PREVIEW_MAX_SIZE,
            extra: serde_json::Map::new(),
        }
    }
}

impl AppConfig {
    /// Resolved screenshot directory with `~` expanded.
    pub fn screenshot_dir_path(&self) -> PathBuf {
        match &self.screenshot_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).as_ref()),
            None => super::app_dir().join("screenshots"),
        }
    }

    /// Screenshot command for this platform, falling back to the system tool.
    ///
    /// Returns `None` when nothing is configured and the platform has no
    /// known command-line capture tool.
    pub fn screenshot_command_for(&self, platform: Platform) -> Option<Vec<String>> {
        if let Some(cmd) = &self.screenshot_command {
            return (!cmd.is_empty()).then(|| cmd.clone());
        }
        let default: &[&str] = match platform {
            Platform::MacOS => &["screencapture", "-x", "{path}"],
            Platform::Linux => &["gnome-screenshot", "-f", "{path}"],
            Platform::Windows => return None,
        };
        Some(default.iter().map(|s| s.to_string()).collect())
    }
}

// ============================================
// RUN MODE
// ============================================

/// Development builds force-exit shortly after Quit if shutdown stalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Production,
    Development,
}

impl RunMode {
    /// Read the run mode from `APP_ENV` (`development` / `dev`).
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(RUN_MODE_ENV).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "development" || v == "dev" => RunMode::Development,
            _ => RunMode::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        *self == RunMode::Development
    }
}
