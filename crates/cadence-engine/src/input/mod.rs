//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Hosts translate platform events into `InputEvent`s and hand them to
//! `Game::dispatch_input`.

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, WheelDelta};
