use thiserror::Error;
use tracing::{error, warn};

use crate::config::ConfigError;
use crate::context::CaptureError;
use crate::hotkeys::HotkeyError;
use crate::shortcuts::{PersistenceError, ShortcutParseError};

/// Error severity for log triage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable, feature degraded
    Error,    // operation failed
    Critical, // startup cannot continue
}

/// Aggregate error for everything below the binary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Shortcut(#[from] ShortcutParseError),

    #[error(transparent)]
    Hotkey(#[from] HotkeyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Hotkey manager unavailable: {0}")]
    HotkeyManager(String),
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Shortcut(_) => ErrorSeverity::Warning,
            Self::Hotkey(HotkeyError::AlreadyRegistered(_)) => ErrorSeverity::Info,
            Self::Hotkey(_) => ErrorSeverity::Warning,
            Self::Config(_) => ErrorSeverity::Warning,
            Self::Capture(_) => ErrorSeverity::Error,
            Self::Persistence(_) => ErrorSeverity::Warning,
            Self::HotkeyManager(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Shortcut(e) => format!("Invalid shortcut: {}", e),
            Self::Hotkey(e) => e.user_message(),
            Self::Config(e) => format!("Configuration issue: {}", e),
            Self::Capture(e) => format!("Screenshot failed: {}", e),
            Self::Persistence(e) => format!("Shortcut overrides issue: {}", e),
            Self::HotkeyManager(msg) => format!("Global hotkeys are unavailable: {}", msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and nobody upstream needs to know.
///
/// ```ignore
/// use hotkey_dispatch::error::ResultExt;
///
/// let preview = make_preview(&path).await.log_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
