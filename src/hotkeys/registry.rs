//! Bookkeeping for bound combos.
//!
//! Every registration attempt is recorded as a [`Binding`], successful or
//! not, so startup can report which actions ended up unreachable. Only
//! `Bound` bindings hold an OS hotkey id.

use std::collections::HashMap;
use tracing::{info, warn};

use super::{HotkeyBackend, HotkeyError};
use crate::actions::Action;
use crate::shortcuts::Shortcut;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    /// Was bound, has since been released
    Unregistered,
    Bound,
    /// Registration failed (taken by another process or already bound here)
    Conflict,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub shortcut: Shortcut,
    pub action: Action,
    pub state: RegistrationState,
    pub hotkey_id: Option<u32>,
}

pub struct BindingRegistry {
    backend: Box<dyn HotkeyBackend>,
    bindings: Vec<Binding>,
    /// hotkey id -> index into `bindings`, for bound entries only
    bound_by_id: HashMap<u32, usize>,
}

impl BindingRegistry {
    pub fn new(backend: Box<dyn HotkeyBackend>) -> Self {
        Self {
            backend,
            bindings: Vec::new(),
            bound_by_id: HashMap::new(),
        }
    }

    /// Bind `shortcut` to `action`. Returns `false` on any conflict.
    pub fn register(&mut self, shortcut: &Shortcut, action: Action) -> bool {
        let result = if self.is_bound(shortcut) {
            Err(HotkeyError::AlreadyRegistered(shortcut.display()))
        } else {
            self.backend.register(shortcut)
        };

        match result {
            Ok(hotkey_id) => {
                self.bound_by_id.insert(hotkey_id, self.bindings.len());
                self.bindings.push(Binding {
                    shortcut: shortcut.clone(),
                    action,
                    state: RegistrationState::Bound,
                    hotkey_id: Some(hotkey_id),
                });
                info!(shortcut = %shortcut.display(), action = %action, hotkey_id, "Shortcut bound");
                true
            }
            Err(e) => {
                warn!(
                    shortcut = %shortcut.display(),
                    action = %action,
                    error = %e,
                    "{}",
                    e.user_message()
                );
                self.bindings.push(Binding {
                    shortcut: shortcut.clone(),
                    action,
                    state: RegistrationState::Conflict,
                    hotkey_id: None,
                });
                false
            }
        }
    }

    /// Release one bound combo. Returns `false` if it was not bound.
    pub fn unregister(&mut self, shortcut: &Shortcut) -> bool {
        let Some((&hotkey_id, &index)) = self
            .bound_by_id
            .iter()
            .find(|(_, &i)| self.bindings[i].shortcut == *shortcut)
        else {
            return false;
        };
        self.release(hotkey_id, index);
        true
    }

    /// Release every bound combo. Returns how many were released.
    pub fn unregister_all(&mut self) -> usize {
        let bound: Vec<(u32, usize)> = self.bound_by_id.iter().map(|(&id, &i)| (id, i)).collect();
        for &(hotkey_id, index) in &bound {
            self.release(hotkey_id, index);
        }
        if !bound.is_empty() {
            info!(count = bound.len(), "Released all global shortcuts");
        }
        bound.len()
    }

    fn release(&mut self, hotkey_id: u32, index: usize) {
        self.bound_by_id.remove(&hotkey_id);
        let binding = &mut self.bindings[index];
        binding.state = RegistrationState::Unregistered;
        binding.hotkey_id = None;
        if let Err(e) = self.backend.unregister(hotkey_id) {
            // Tracking is already updated; the OS side is best effort
            warn!(shortcut = %binding.shortcut.display(), error = %e, "Failed to unregister hotkey");
        }
    }

    /// Route an OS event id to its action.
    pub fn action_for(&self, hotkey_id: u32) -> Option<Action> {
        self.bound_by_id
            .get(&hotkey_id)
            .map(|&i| self.bindings[i].action)
    }

    pub fn is_bound(&self, shortcut: &Shortcut) -> bool {
        self.bound().any(|b| b.shortcut == *shortcut)
    }

    /// Currently bound combos.
    pub fn bound(&self) -> impl Iterator<Item = &Binding> {
        self.bindings
            .iter()
            .filter(|b| b.state == RegistrationState::Bound)
    }

    /// Every registration attempt so far, in order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
