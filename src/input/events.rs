use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Input events delivered by the host to the map surface, markers and panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click/tap
    Click {
        position: Point,
        button: MouseButton,
    },
    /// Keyboard input
    KeyPress {
        key: KeyCode,
        modifiers: KeyModifiers,
    },
}

/// Keyboard key codes the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Escape,
    Enter,
    Space,
    Tab,
    Other(u32),
}

impl KeyCode {
    /// Maps a DOM `KeyboardEvent.key` value
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => KeyCode::Escape,
            "Enter" => KeyCode::Enter,
            " " | "Spacebar" => KeyCode::Space,
            "Tab" => KeyCode::Tab,
            other => KeyCode::Other(other.chars().next().map(u32::from).unwrap_or(0)),
        }
    }
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub const NONE: KeyModifiers = KeyModifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: KeyModifiers = KeyModifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Whether an event was handled. `Handled` means the host should
/// suppress the default browser action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl InputEvent {
    pub fn click() -> Self {
        InputEvent::Click {
            position: Point::default(),
            button: MouseButton::Left,
        }
    }

    pub fn key(key: KeyCode) -> Self {
        InputEvent::KeyPress {
            key,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn key_with(key: KeyCode, modifiers: KeyModifiers) -> Self {
        InputEvent::KeyPress { key, modifiers }
    }

    /// Checks if this is a keyboard event
    pub fn is_keyboard_event(&self) -> bool {
        matches!(self, InputEvent::KeyPress { .. })
    }

    /// True for a primary click or an Enter key press, the two gestures
    /// that activate a marker
    pub fn is_activation(&self) -> bool {
        match self {
            InputEvent::Click { button, .. } => *button == MouseButton::Left,
            InputEvent::KeyPress { key, .. } => *key == KeyCode::Enter,
        }
    }
}
