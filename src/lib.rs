//! Hotkey Dispatch - global keyboard shortcuts for a screenshot assistant
//!
//! This library binds a declarative keymap to OS-level hotkeys, falling back
//! to alternate combos when one is taken, and routes each press to a handler
//! that acts through an injected application context.

pub mod actions;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod hotkeys;
pub mod keymap;
pub mod logging;
pub mod shortcuts;
pub mod window_control;

// Headless window, screenshot queues and capture used by the binary
pub mod host;

#[cfg(test)]
mod test_support;

pub use actions::Action;
pub use dispatcher::{DispatchOptions, Dispatcher, QuitPhase};
pub use error::{AppError, Result};
pub use keymap::{bind_keymap, BindReport, Keymap};
