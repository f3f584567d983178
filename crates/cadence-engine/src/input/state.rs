use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState};

/// Held keys and buttons plus the last known pointer position.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,

    /// Logical pixels; `None` while the pointer is outside the window.
    pub pointer: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the held state and records transitions in `frame`.
    ///
    /// Key repeats and duplicate presses do not register as new presses.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed if self.keys_down.insert(*key) => {
                        frame.keys_pressed.insert(*key);
                    }
                    KeyState::Released if self.keys_down.remove(key) => {
                        frame.keys_released.insert(*key);
                    }
                    _ => {}
                }
            }

            InputEvent::MouseMoved { x, y } => {
                self.pointer = Some((*x, *y));
            }

            InputEvent::MouseButton {
                button,
                state,
                x,
                y,
            } => {
                self.pointer = Some((*x, *y));
                match state {
                    MouseButtonState::Pressed if self.buttons_down.insert(*button) => {
                        frame.buttons_pressed.insert(*button);
                    }
                    MouseButtonState::Released if self.buttons_down.remove(button) => {
                        frame.buttons_released.insert(*button);
                    }
                    _ => {}
                }
            }

            InputEvent::Wheel { modifiers, .. } | InputEvent::ModifiersChanged(modifiers) => {
                self.modifiers = *modifiers;
            }

            InputEvent::Text(text) => frame.text.push_str(text),

            InputEvent::PointerLeft => self.pointer = None,

            InputEvent::Focused(focused) => {
                self.focused = *focused;
                if !focused {
                    // Releases are not delivered while unfocused.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }
        }

        frame.events.push(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}
