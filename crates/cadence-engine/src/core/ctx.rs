use crate::fixed::LoopState;
use crate::input::{InputFrame, InputState, Key, MouseButton};
use crate::time::FrameTime;

/// Per-iteration context passed to `core::App::update`.
pub struct UpdateCtx<'a> {
    pub time: FrameTime,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    /// Last published variable-rate sample, in ticks per second.
    pub fps: u32,
    /// State of the fixed-rate thread at the start of this iteration.
    pub fixed_state: LoopState,
}

impl UpdateCtx<'_> {
    /// Seconds since the previous variable-rate tick.
    pub fn dt(&self) -> f32 {
        self.time.dt
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.input.key_down(key)
    }

    /// True only on the iteration the key went down.
    pub fn key_pressed(&self, key: Key) -> bool {
        self.input_frame.keys_pressed.contains(&key)
    }

    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.input_frame.buttons_pressed.contains(&button)
    }
}
