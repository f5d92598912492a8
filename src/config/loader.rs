//! Configuration loading and saving on the file system
//!
//! The config file is plain JSON. Saves go through a temp file and a rename
//! so a crash mid-write never leaves a truncated config behind.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::defaults::{APP_DIR_NAME, CONFIG_FILE_NAME, SHORTCUTS_FILE_NAME};
use super::types::AppConfig;
use crate::context::ConfigStore;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Application directory: ~/.hotkey-dispatch
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

/// Get the default config path: ~/.hotkey-dispatch/config.json
pub fn default_config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE_NAME)
}

/// Get the default shortcut overrides path: ~/.hotkey-dispatch/shortcuts.json
pub fn default_shortcuts_path() -> PathBuf {
    app_dir().join(SHORTCUTS_FILE_NAME)
}

/// Load configuration for startup.
///
/// Returns `AppConfig::default()` if the file is missing or unreadable.
#[instrument(name = "load_config")]
pub fn load_config(path: &Path) -> AppConfig {
    match JsonConfigStore::new(path).read() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Failed to load config, using defaults");
            AppConfig::default()
        }
    }
}

/// JSON-file backed config store.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<AppConfig, ConfigError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "Config file not found, using defaults");
            return Ok(AppConfig::default());
        }
        let contents =
            fs::read_to_string(&self.path).map_err(|e| ConfigError::io(&self.path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(config)?;

        // Atomic write: temp file then rename
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| ConfigError::io(&tmp_path, e))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(ConfigError::io(&self.path, e));
        }
        Ok(())
    }
}

impl ConfigStore for JsonConfigStore {
    fn load_config(&self) -> Result<AppConfig, ConfigError> {
        self.read()
    }

    fn save_config(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.write(config)
    }
}
