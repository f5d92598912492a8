//! User shortcut customization persistence.
//!
//! Format: `{"overrides": {"<entry id>": "<combo>" | null}}` where
//! - a combo string replaces the entry's whole fallback chain
//! - `null` disables the entry

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Shortcut, ShortcutParseError};
use crate::keymap::Keymap;

/// User shortcut overrides, stored in ~/.hotkey-dispatch/shortcuts.json
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShortcutOverrides {
    #[serde(default)]
    pub overrides: HashMap<String, Option<String>>,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid shortcut '{shortcut}' for binding '{binding_id}': {error}")]
    InvalidShortcut {
        binding_id: String,
        shortcut: String,
        #[source]
        error: ShortcutParseError,
    },

    #[error("No binding named '{0}'")]
    UnknownBinding(String),
}

impl ShortcutOverrides {
    /// Load overrides from a JSON file. Missing file means no overrides.
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides to a keymap.
    ///
    /// Valid overrides are applied even when others fail; the failures are
    /// returned and the affected entries keep their defaults.
    pub fn apply_to_keymap(&self, keymap: &mut Keymap) -> Vec<PersistenceError> {
        let mut errors = Vec::new();

        // Sorted for deterministic error order
        let mut ids: Vec<&String> = self.overrides.keys().collect();
        ids.sort();

        for binding_id in ids {
            if !keymap.contains(binding_id) {
                errors.push(PersistenceError::UnknownBinding(binding_id.clone()));
                continue;
            }
            match &self.overrides[binding_id] {
                None => {
                    keymap.set_override(binding_id, None);
                }
                Some(combo) => match Shortcut::parse(combo) {
                    Ok(_) => {
                        keymap.set_override(binding_id, Some(combo.clone()));
                    }
                    Err(error) => errors.push(PersistenceError::InvalidShortcut {
                        binding_id: binding_id.clone(),
                        shortcut: combo.clone(),
                        error,
                    }),
                },
            }
        }

        errors
    }

    /// Extract current overrides from a keymap.
    pub fn from_keymap(keymap: &Keymap) -> Self {
        Self {
            overrides: keymap.export_overrides(),
        }
    }

    pub fn set(&mut self, binding_id: impl Into<String>, shortcut: Option<String>) {
        self.overrides.insert(binding_id.into(), shortcut);
    }

    /// Remove an override (revert to default).
    pub fn remove(&mut self, binding_id: &str) {
        self.overrides.remove(binding_id);
    }

    pub fn has_override(&self, binding_id: &str) -> bool {
        self.overrides.contains_key(binding_id)
    }

    pub fn get(&self, binding_id: &str) -> Option<&Option<String>> {
        self.overrides.get(binding_id)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Load overrides and apply them, logging every problem.
///
/// A file that cannot be read or parsed leaves the keymap at its defaults.
pub fn load_into_keymap(path: &Path, keymap: &mut Keymap) -> usize {
    let overrides = match ShortcutOverrides::load(path) {
        Ok(overrides) => overrides,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring shortcut overrides file");
            return 0;
        }
    };
    let errors = overrides.apply_to_keymap(keymap);
    for error in &errors {
        tracing::warn!(error = %error, "Shortcut override not applied");
    }
    overrides.len() - errors.len()
}
