//! System-wide hotkey plumbing.
//!
//! - [`HotkeyBackend`]: the OS registration seam (`GlobalHotkeyBackend` in production)
//! - [`BindingRegistry`]: which combos are bound, to which action, and what failed
//! - [`resolve`]: bind the first free combo out of a fallback chain
//! - [`spawn_event_bridge`]: move pressed-key events off the OS receiver thread

mod fallback;
mod registry;

pub use fallback::{resolve, FallbackChain};
pub use registry::{Binding, BindingRegistry, RegistrationState};

use global_hotkey::{
    hotkey::HotKey, Error as GlobalHotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager,
    HotKeyState,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::shortcuts::{to_hotkey, Shortcut, ShortcutParseError};

#[derive(Error, Debug)]
pub enum HotkeyError {
    #[error("hotkey '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("system rejected hotkey '{shortcut}': {reason}")]
    Rejected { shortcut: String, reason: String },

    #[error("OS error for hotkey '{shortcut}': {reason}")]
    Os { shortcut: String, reason: String },

    #[error("hotkey '{shortcut}' cannot be expressed: {source}")]
    Unsupported {
        shortcut: String,
        #[source]
        source: ShortcutParseError,
    },
}

impl HotkeyError {
    /// Classify an error from the `global-hotkey` crate.
    pub fn from_os(error: GlobalHotkeyError, shortcut_display: &str) -> Self {
        let shortcut = shortcut_display.to_string();
        match error {
            GlobalHotkeyError::AlreadyRegistered(_) => HotkeyError::AlreadyRegistered(shortcut),
            GlobalHotkeyError::FailedToRegister(reason) => {
                HotkeyError::Rejected { shortcut, reason }
            }
            GlobalHotkeyError::OsError(os_err) => HotkeyError::Os {
                shortcut,
                reason: os_err.to_string(),
            },
            other => HotkeyError::Os {
                shortcut,
                reason: other.to_string(),
            },
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            HotkeyError::AlreadyRegistered(shortcut) => format!(
                "Hotkey '{}' is already registered by another application. \
                 Try a different shortcut or close the conflicting app.",
                shortcut
            ),
            HotkeyError::Rejected { shortcut, reason } => format!(
                "System rejected hotkey '{}': {}. This shortcut may be reserved by the OS.",
                shortcut, reason
            ),
            HotkeyError::Os { shortcut, reason } => format!(
                "OS error registering '{}': {}. Check system hotkey settings.",
                shortcut, reason
            ),
            HotkeyError::Unsupported { shortcut, source } => {
                format!("Hotkey '{}' is not supported: {}", shortcut, source)
            }
        }
    }
}

/// OS-level registration of global hotkeys.
///
/// Implementations must be driven from the thread that created them.
pub trait HotkeyBackend: Send {
    /// Register a combo and return the id its press events will carry.
    fn register(&mut self, shortcut: &Shortcut) -> Result<u32, HotkeyError>;
    fn unregister(&mut self, hotkey_id: u32) -> Result<(), HotkeyError>;
}

/// `HotkeyBackend` over `global_hotkey::GlobalHotKeyManager`.
pub struct GlobalHotkeyBackend {
    manager: GlobalHotKeyManager,
    /// Registered hotkeys by id (the OS needs the full `HotKey` to unregister)
    hotkeys: HashMap<u32, HotKey>,
}

impl GlobalHotkeyBackend {
    /// NOTE: Must be created on the main thread.
    pub fn new() -> Result<Self, GlobalHotkeyError> {
        Ok(Self {
            manager: GlobalHotKeyManager::new()?,
            hotkeys: HashMap::new(),
        })
    }
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn register(&mut self, shortcut: &Shortcut) -> Result<u32, HotkeyError> {
        let shortcut_display = shortcut.display();
        let hotkey = to_hotkey(shortcut).map_err(|source| HotkeyError::Unsupported {
            shortcut: shortcut_display.clone(),
            source,
        })?;
        let hotkey_id = hotkey.id();

        self.manager
            .register(hotkey)
            .map_err(|e| HotkeyError::from_os(e, &shortcut_display))?;
        self.hotkeys.insert(hotkey_id, hotkey);

        debug!(shortcut = %shortcut_display, hotkey_id, "Registered OS hotkey");
        Ok(hotkey_id)
    }

    fn unregister(&mut self, hotkey_id: u32) -> Result<(), HotkeyError> {
        let Some(hotkey) = self.hotkeys.remove(&hotkey_id) else {
            return Ok(());
        };
        self.manager
            .unregister(hotkey)
            .map_err(|e| HotkeyError::from_os(e, &hotkey_id.to_string()))
    }
}

/// Forward pressed-key ids from the OS event receiver into an async channel.
///
/// The bridge thread exits once the returned receiver is dropped and the
/// next event fails to send. Key releases are ignored.
pub fn spawn_event_bridge() -> async_channel::Receiver<u32> {
    let (tx, rx) = async_channel::bounded(32);
    std::thread::Builder::new()
        .name("hotkey-bridge".into())
        .spawn(move || {
            let receiver = GlobalHotKeyEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if event.state != HotKeyState::Pressed {
                    continue;
                }
                if tx.send_blocking(event.id).is_err() {
                    info!("Hotkey event channel closed, stopping bridge");
                    break;
                }
            }
        })
        .map_err(|e| warn!(error = %e, "Failed to spawn hotkey bridge thread"))
        .ok();
    rx
}
