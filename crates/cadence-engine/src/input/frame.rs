use std::collections::HashSet;

use super::types::{InputEvent, Key, MouseButton};

/// Transitions recorded since the last variable-rate tick.
///
/// Cleared by the coordinator after every `update`.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,

    /// Text committed since the last tick, concatenated.
    pub text: String,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.text.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
