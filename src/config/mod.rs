//! Configuration module - Application settings persisted on disk
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.hotkey-dispatch/config.json
//! - Default values for all settings
//! - A `ConfigStore` implementation that saves atomically
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (AppConfig, RunMode)
//! - `loader` - File system loading, saving and paths

mod defaults;
mod loader;
mod types;

pub use defaults::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_FORCE_EXIT_GRACE_MS, DEFAULT_MAX_QUEUE_LENGTH,
    DEFAULT_MOVE_STEP, DEFAULT_OPACITY, DEFAULT_PREVIEW_MAX_SIZE, RUN_MODE_ENV,
    SHORTCUTS_FILE_NAME,
};

pub use types::{AppConfig, RunMode};

pub use loader::{
    app_dir, default_config_path, default_shortcuts_path, load_config, ConfigError,
    JsonConfigStore,
};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
