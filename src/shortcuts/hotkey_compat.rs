//! Conversion from `Shortcut` to the `global-hotkey` crate's key types.

use global_hotkey::hotkey::{Code, HotKey, Modifiers as HotkeyModifiers};

use super::types::{Modifiers, Shortcut, ShortcutParseError};

/// Build the OS-level hotkey for a shortcut.
pub fn to_hotkey(shortcut: &Shortcut) -> Result<HotKey, ShortcutParseError> {
    let code = key_to_code(&shortcut.key)
        .ok_or_else(|| ShortcutParseError::UnknownKey(shortcut.key.clone()))?;
    let mods = to_hotkey_modifiers(shortcut.modifiers);
    Ok(HotKey::new((!mods.is_empty()).then_some(mods), code))
}

pub fn to_hotkey_modifiers(modifiers: Modifiers) -> HotkeyModifiers {
    let mut mods = HotkeyModifiers::empty();
    if modifiers.cmd {
        mods |= HotkeyModifiers::SUPER;
    }
    if modifiers.ctrl {
        mods |= HotkeyModifiers::CONTROL;
    }
    if modifiers.alt {
        mods |= HotkeyModifiers::ALT;
    }
    if modifiers.shift {
        mods |= HotkeyModifiers::SHIFT;
    }
    mods
}

/// Map a canonical key name to a physical key code.
pub fn key_to_code(key: &str) -> Option<Code> {
    let code = match key {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "f13" => Code::F13,
        "f14" => Code::F14,
        "f15" => Code::F15,
        "f16" => Code::F16,
        "f17" => Code::F17,
        "f18" => Code::F18,
        "f19" => Code::F19,
        "f20" => Code::F20,
        "f21" => Code::F21,
        "f22" => Code::F22,
        "f23" => Code::F23,
        "f24" => Code::F24,
        "space" => Code::Space,
        "enter" => Code::Enter,
        "tab" => Code::Tab,
        "escape" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" => Code::Delete,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "semicolon" => Code::Semicolon,
        "quote" => Code::Quote,
        "comma" => Code::Comma,
        "period" => Code::Period,
        "slash" => Code::Slash,
        "backslash" => Code::Backslash,
        "bracketleft" => Code::BracketLeft,
        "bracketright" => Code::BracketRight,
        "minus" => Code::Minus,
        "equal" => Code::Equal,
        "backquote" => Code::Backquote,
        _ => return None,
    };
    Some(code)
}
