use anyhow::Result;

use crate::input::InputEvent;

use super::ctx::UpdateCtx;

/// Control directive returned by variable-rate callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by games.
///
/// All callbacks run with the application locked, so `update` and
/// `fixed_update` never overlap even though they are called from different
/// threads.
pub trait App: Send + 'static {
    /// Called once before either timeline starts.
    fn load_content(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once per host iteration (variable rate).
    fn update(&mut self, ctx: &UpdateCtx<'_>) -> Result<AppControl>;

    /// Called from the fixed-rate thread with a constant delta in seconds.
    fn fixed_update(&mut self, fixed_dt: f32) -> Result<()> {
        let _ = fixed_dt;
        Ok(())
    }

    /// Called for every input event the host forwards.
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }
}
