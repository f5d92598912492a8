//! Application actions a hotkey can trigger.
//!
//! Every bound combo routes to exactly one `Action`. The names returned by
//! [`Action::name`] are stable and appear in logs and the keymap summary.

use std::fmt;

/// Direction for window moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Which way an opacity hotkey nudges the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpacityStep {
    Decrease,
    Increase,
}

impl OpacityStep {
    /// Signed opacity delta for one press.
    pub fn delta(&self) -> f64 {
        match self {
            OpacityStep::Decrease => -crate::window_control::OPACITY_STEP,
            OpacityStep::Increase => crate::window_control::OPACITY_STEP,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomChange {
    In,
    Out,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Capture a screenshot and hand it to the window with a preview
    Capture,
    /// Start processing the queued screenshots
    Process,
    /// Cancel processing, clear both queues and return to the queue view
    Reset,
    Move(Direction),
    ToggleVisibility,
    /// Release hotkeys, close the window and exit
    Quit,
    AdjustOpacity(OpacityStep),
    Zoom(ZoomChange),
    DeleteLastScreenshot,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Capture => "capture",
            Action::Process => "process",
            Action::Reset => "reset",
            Action::Move(Direction::Left) => "move-left",
            Action::Move(Direction::Right) => "move-right",
            Action::Move(Direction::Up) => "move-up",
            Action::Move(Direction::Down) => "move-down",
            Action::ToggleVisibility => "toggle-window",
            Action::Quit => "quit",
            Action::AdjustOpacity(OpacityStep::Decrease) => "opacity-down",
            Action::AdjustOpacity(OpacityStep::Increase) => "opacity-up",
            Action::Zoom(ZoomChange::In) => "zoom-in",
            Action::Zoom(ZoomChange::Out) => "zoom-out",
            Action::Zoom(ZoomChange::Reset) => "zoom-reset",
            Action::DeleteLastScreenshot => "delete-last-screenshot",
        }
    }

    /// Human-readable description used in the startup summary.
    pub fn description(&self) -> &'static str {
        match self {
            Action::Capture => "Take screenshot",
            Action::Process => "Process screenshots",
            Action::Reset => "Reset queues",
            Action::Move(_) => "Move window",
            Action::ToggleVisibility => "Toggle window",
            Action::Quit => "Quit app",
            Action::AdjustOpacity(_) => "Adjust opacity",
            Action::Zoom(_) => "Zoom",
            Action::DeleteLastScreenshot => "Delete last screenshot",
        }
    }

    /// Whether the handler needs the main window to exist before it does anything.
    pub fn requires_window(&self) -> bool {
        matches!(
            self,
            Action::Capture
                | Action::Move(_)
                | Action::AdjustOpacity(_)
                | Action::Zoom(_)
                | Action::DeleteLastScreenshot
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
