//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Default window opacity (fully opaque)
pub const DEFAULT_OPACITY: f64 = 1.0;

/// Pixels the window travels per move hotkey
pub const DEFAULT_MOVE_STEP: i32 = 60;

/// Maximum screenshots kept in each queue before the oldest is dropped
pub const DEFAULT_MAX_QUEUE_LENGTH: usize = 5;

/// Longest edge of the generated preview thumbnail, in pixels
pub const DEFAULT_PREVIEW_MAX_SIZE: u32 = 320;

/// Grace period before a development build force-exits after Quit
pub const DEFAULT_FORCE_EXIT_GRACE_MS: u64 = 1000;

/// Directory under the home folder holding config, overrides, logs and screenshots
pub const APP_DIR_NAME: &str = ".hotkey-dispatch";

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const SHORTCUTS_FILE_NAME: &str = "shortcuts.json";

/// Environment variable selecting the run mode (`development` enables the forced exit)
pub const RUN_MODE_ENV: &str = "APP_ENV";
