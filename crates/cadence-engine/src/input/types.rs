use std::fmt;

/// Physical key, named by position on a US layout.
///
/// Keys the host cannot map arrive as `Unmapped` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Alpha0, Alpha1, Alpha2, Alpha3, Alpha4,
    Alpha5, Alpha6, Alpha7, Alpha8, Alpha9,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    Comma, Period, Slash, Semicolon, Apostrophe, Backslash,
    Equals, Minus, Tilde, LeftBracket, RightBracket,

    Return, Escape, Space, Tab, Backspace, CapsLock,
    Home, End, Insert, Delete, PageUp, PageDown,
    Left, Right, Up, Down,

    LeftShift, RightShift,
    LeftControl, RightControl,
    LeftAlt, RightAlt,
    LeftSuper, RightSuper,

    Unmapped(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Unmapped(code) => write!(f, "Unmapped({code:#x})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    X1,
    X2,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Held modifier keys, either side.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Scroll amount. `Lines` comes from notched wheels, `Pixels` from touchpads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    Lines { x: f32, y: f32 },
    Pixels { x: f32, y: f32 },
}

/// Platform-agnostic input events forwarded by a host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        /// Platform scancode, 0 when unavailable.
        code: u32,
        repeat: bool,
    },

    /// Pointer position in logical pixels.
    MouseMoved { x: f32, y: f32 },

    MouseButton {
        button: MouseButton,
        state: MouseButtonState,
        x: f32,
        y: f32,
    },

    Wheel {
        delta: WheelDelta,
        modifiers: Modifiers,
    },

    /// Committed text.
    Text(String),

    ModifiersChanged(Modifiers),
    PointerLeft,
    Focused(bool),
}
