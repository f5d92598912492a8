//! Keyboard shortcut model.
//!
//! This module provides:
//! - `Shortcut` parsing from accelerator strings (`CommandOrControl+Shift+H`)
//! - Platform-aware display formatting
//! - Conversion to `global-hotkey` key codes
//! - User overrides persisted in `shortcuts.json`
//!
//! # Example
//!
//! ```ignore
//! use hotkey_dispatch::shortcuts::Shortcut;
//!
//! let shortcut = Shortcut::parse("CommandOrControl+Shift+H")?;
//! println!("Display: {}", shortcut.display()); // ⇧⌘H on macOS, Ctrl+Shift+H elsewhere
//! ```

mod hotkey_compat;
mod persistence;
mod types;


pub use types::{
    canonicalize_key, is_known_key, Modifiers, Platform, Shortcut, ShortcutParseError,
};

pub use hotkey_compat::{key_to_code, to_hotkey, to_hotkey_modifiers};

pub use persistence::{load_into_keymap, PersistenceError, ShortcutOverrides};
