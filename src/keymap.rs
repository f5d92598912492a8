//! Declarative hotkey table.
//!
//! Each entry names one logical binding: an id (used by the overrides file),
//! the action it triggers and its combos with the primary first. Entries are
//! turned into fallback chains and bound once at startup by [`bind_keymap`].

use std::collections::HashMap;
use tracing::{info, warn};

use crate::actions::{Action, Direction, OpacityStep, ZoomChange};
use crate::hotkeys::{resolve, BindingRegistry, FallbackChain};
use crate::shortcuts::{Platform, Shortcut};

#[derive(Debug, Clone, PartialEq)]
pub struct KeymapEntry {
    pub id: String,
    pub action: Action,
    /// Primary combo first, then alternates in the order they are tried
    pub combos: Vec<String>,
}

impl KeymapEntry {
    pub fn new(id: impl Into<String>, action: Action, combos: &[&str]) -> Self {
        Self {
            id: id.into(),
            action,
            combos: combos.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Default entries plus user overrides.
///
/// Entries keep insertion order so binding and the startup summary are
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    entries: Vec<KeymapEntry>,
    index: HashMap<String, usize>,
    /// id -> override; `None` disables the entry
    overrides: HashMap<String, Option<String>>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults() -> Self {
        use Action::*;

        let mut keymap = Self::new();
        let entries = [
            KeymapEntry::new("capture", Capture, &["CommandOrControl+F2"]),
            KeymapEntry::new("capture-function-key", Capture, &["F12"]),
            KeymapEntry::new(
                "capture-alternate",
                Capture,
                &["CommandOrControl+H", "CommandOrControl+Shift+H"],
            ),
            KeymapEntry::new("process", Process, &["CommandOrControl+Enter"]),
            KeymapEntry::new("reset", Reset, &["CommandOrControl+R"]),
            KeymapEntry::new("move-left", Move(Direction::Left), &["CommandOrControl+Left"]),
            KeymapEntry::new("move-right", Move(Direction::Right), &["CommandOrControl+Right"]),
            KeymapEntry::new("move-down", Move(Direction::Down), &["CommandOrControl+Down"]),
            KeymapEntry::new("move-up", Move(Direction::Up), &["CommandOrControl+Up"]),
            KeymapEntry::new("toggle-window", ToggleVisibility, &["CommandOrControl+B"]),
            KeymapEntry::new("quit", Quit, &["CommandOrControl+Q"]),
            KeymapEntry::new(
                "opacity-down",
                AdjustOpacity(OpacityStep::Decrease),
                &["CommandOrControl+["],
            ),
            KeymapEntry::new(
                "opacity-up",
                AdjustOpacity(OpacityStep::Increase),
                &["CommandOrControl+]"],
            ),
            KeymapEntry::new("zoom-out", Zoom(ZoomChange::Out), &["CommandOrControl+-"]),
            KeymapEntry::new("zoom-reset", Zoom(ZoomChange::Reset), &["CommandOrControl+0"]),
            KeymapEntry::new("zoom-in", Zoom(ZoomChange::In), &["CommandOrControl+="]),
            KeymapEntry::new(
                "delete-last-screenshot",
                DeleteLastScreenshot,
                &["CommandOrControl+L"],
            ),
        ];
        for entry in entries {
            keymap.insert(entry);
        }
        keymap
    }

    /// Add an entry, replacing any entry with the same id.
    pub fn insert(&mut self, entry: KeymapEntry) {
        match self.index.get(&entry.id) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&KeymapEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn entries(&self) -> &[KeymapEntry] {
        &self.entries
    }

    /// Replace an entry's whole chain with one combo, or disable it with `None`.
    ///
    /// Returns `false` if no entry has this id.
    pub fn set_override(&mut self, id: &str, combo: Option<String>) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.overrides.insert(id.to_string(), combo);
        true
    }

    pub fn clear_override(&mut self, id: &str) {
        self.overrides.remove(id);
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        matches!(self.overrides.get(id), Some(None))
    }

    /// Combos in effect for an entry, override applied. `None` when disabled or unknown.
    pub fn effective_combos(&self, id: &str) -> Option<Vec<&str>> {
        match self.overrides.get(id) {
            Some(Some(combo)) => Some(vec![combo.as_str()]),
            Some(None) => None,
            None => self
                .get(id)
                .map(|e| e.combos.iter().map(String::as_str).collect()),
        }
    }

    pub fn export_overrides(&self) -> HashMap<String, Option<String>> {
        self.overrides.clone()
    }

    /// Fallback chains for every enabled entry, combos parsed for this platform.
    pub fn chains(&self) -> Vec<(String, FallbackChain)> {
        self.chains_for_platform(Platform::current())
    }

    /// Fallback chains for a given platform. Unparseable combos are skipped with a warning.
    pub fn chains_for_platform(&self, platform: Platform) -> Vec<(String, FallbackChain)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let combos = self.effective_combos(&entry.id)?;
                let candidates = combos
                    .into_iter()
                    .filter_map(|combo| match Shortcut::parse_for_platform(combo, platform) {
                        Ok(shortcut) => Some(shortcut),
                        Err(e) => {
                            warn!(id = %entry.id, combo, error = %e, "Skipping invalid combo");
                            None
                        }
                    })
                    .collect();
                Some((entry.id.clone(), FallbackChain::new(entry.action, candidates)))
            })
            .collect()
    }
}

/// Outcome of binding a keymap.
#[derive(Debug, Clone, Default)]
pub struct BindReport {
    /// (entry id, combo that was bound)
    pub bound: Vec<(String, Shortcut)>,
    /// Entries none of whose combos could be bound
    pub unreachable: Vec<String>,
    /// Entries turned off by an override
    pub disabled: Vec<String>,
}

impl BindReport {
    /// Multi-line summary of the shortcuts that are live.
    pub fn summary(&self, keymap: &Keymap) -> String {
        let mut lines = vec!["Available shortcuts:".to_string()];
        for (id, shortcut) in &self.bound {
            let description = keymap
                .get(id)
                .map(|e| e.action.description())
                .unwrap_or_default();
            lines.push(format!("  {:<24} {:<16} {}", id, shortcut.display(), description));
        }
        if !self.unreachable.is_empty() {
            lines.push(format!("  unavailable: {}", self.unreachable.join(", ")));
        }
        lines.join("\n")
    }
}

/// Bind every enabled entry through its fallback chain.
pub fn bind_keymap(registry: &mut BindingRegistry, keymap: &Keymap) -> BindReport {
    bind_chains(registry, keymap, keymap.chains())
}

pub fn bind_keymap_for_platform(
    registry: &mut BindingRegistry,
    keymap: &Keymap,
    platform: Platform,
) -> BindReport {
    bind_chains(registry, keymap, keymap.chains_for_platform(platform))
}

fn bind_chains(
    registry: &mut BindingRegistry,
    keymap: &Keymap,
    chains: Vec<(String, FallbackChain)>,
) -> BindReport {
    let mut report = BindReport {
        disabled: keymap
            .entries()
            .iter()
            .filter(|e| keymap.is_disabled(&e.id))
            .map(|e| e.id.clone())
            .collect(),
        ..Default::default()
    };

    for (id, chain) in chains {
        match resolve(registry, &chain) {
            Some(shortcut) => report.bound.push((id, shortcut)),
            None => report.unreachable.push(id),
        }
    }

    info!(
        bound = report.bound.len(),
        unreachable = report.unreachable.len(),
        disabled = report.disabled.len(),
        "Keymap bound"
    );
    info!("{}", report.summary(keymap));
    report
}

#[cfg(test)]
#[path = "keymap_tests.rs"]
mod tests;
