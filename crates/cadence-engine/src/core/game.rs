use anyhow::{Context, Result};

use crate::config::LoopConfig;
use crate::fixed::{LoopController, LoopReport, LoopState};
use crate::input::{InputEvent, InputFrame, InputState};
use crate::sync::{RunFlag, SharedState};
use crate::time::{DeltaClock, FrameClock};

use super::app::{App, AppControl};
use super::ctx::UpdateCtx;

/// Dual-rate coordinator.
///
/// Owns the application behind a [`SharedState`], the fixed-rate
/// [`LoopController`] and the variable-rate clocks. A host calls
/// [`start`](Self::start) once its own loop is live, then
/// [`tick_variable`](Self::tick_variable) once per iteration, and finally
/// [`shutdown`](Self::shutdown).
pub struct Game<A: App> {
    shared: SharedState<A>,
    controller: LoopController,
    running: RunFlag,
    delta: DeltaClock,
    fps: FrameClock,
    input: InputState,
    input_frame: InputFrame,
}

impl<A: App> Game<A> {
    pub fn new(app: A, config: LoopConfig) -> Self {
        Self {
            shared: SharedState::new(app),
            controller: LoopController::new(config),
            running: RunFlag::default(),
            delta: DeltaClock::default(),
            fps: FrameClock::monotonic(),
            input: InputState::default(),
            input_frame: InputFrame::default(),
        }
    }

    /// Handle to the application. Lock it only between ticks.
    pub fn shared(&self) -> SharedState<A> {
        self.shared.clone()
    }

    pub fn run_flag(&self) -> RunFlag {
        self.running.clone()
    }

    /// Loads content and starts the fixed-rate thread.
    ///
    /// The configuration is checked first so a bad frequency fails before
    /// `load_content` runs.
    pub fn start(&mut self) -> Result<()> {
        self.controller.config().validate()?;

        self.shared
            .with(|app| app.load_content())
            .context("load_content failed")?;

        self.controller.start(
            self.shared.clone(),
            |app: &mut A, fixed_dt| app.fixed_update(fixed_dt),
            self.running.predicate(),
        )?;

        self.delta.reset();
        Ok(())
    }

    /// Runs one variable-rate update with the application locked.
    pub fn tick_variable(&mut self) -> Result<AppControl> {
        let time = self.delta.tick();
        if let Some(rate) = self.fps.tick_now() {
            log::debug!("variable rate: {rate} ticks/s, fixed ticks so far: {}", self.controller.ticks());
        }

        let ctx = UpdateCtx {
            time,
            input: &self.input,
            input_frame: &self.input_frame,
            fps: self.fps.rate(),
            fixed_state: self.controller.state(),
        };

        let control = self.shared.with(|app| app.update(&ctx));
        self.input_frame.clear();

        control.with_context(|| format!("update failed on frame {}", time.frame_index))
    }

    /// Records `event` and forwards it to the application under the lock.
    pub fn dispatch_input(&mut self, event: InputEvent) -> AppControl {
        self.input.apply_event(&mut self.input_frame, event.clone());
        self.shared.with(|app| app.on_input(&event))
    }

    /// Held input as of the last dispatched event.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Last published variable-rate sample.
    pub fn fps(&self) -> u32 {
        self.fps.rate()
    }

    pub fn fixed_state(&self) -> LoopState {
        self.controller.state()
    }

    pub fn fixed_ticks(&self) -> u64 {
        self.controller.ticks()
    }

    /// True once the fixed thread has stopped because of a fault.
    ///
    /// The fault itself is returned by [`shutdown`](Self::shutdown).
    pub fn has_fixed_fault(&self) -> bool {
        self.controller.has_fault()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    /// Tells the fixed thread to exit at its next iteration.
    pub fn quit(&self) {
        self.running.stop();
    }

    /// Stops the fixed thread and waits for it.
    ///
    /// A fault recorded by the fixed thread is returned as the error.
    pub fn shutdown(&mut self) -> Result<LoopReport> {
        self.quit();
        let report = self.controller.join()?;
        log::info!(
            "fixed update loop joined: {} ticks in {:.2?}",
            report.ticks,
            report.ran_for
        );
        Ok(report)
    }
}

impl<A: App> Drop for Game<A> {
    /// Stops the fixed thread so it never outlives the coordinator.
    fn drop(&mut self) {
        self.quit();
        if let Err(fault) = self.controller.join() {
            log::error!("{fault}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use anyhow::bail;

    use super::*;
    use crate::input::{Key, KeyState, Modifiers};

    /// Counts ticks from both timelines into one plain integer.
    #[derive(Default)]
    struct Counter {
        total: u64,
        fixed: u64,
        variable: u64,
        loaded: bool,
        fixed_before_load: bool,
    }

    impl Counter {
        fn bump(&mut self) {
            // Read-yield-write: loses updates unless callers are serialized.
            let seen = self.total;
            thread::yield_now();
            self.total = seen + 1;
        }
    }

    impl App for Counter {
        fn load_content(&mut self) -> Result<()> {
            self.loaded = true;
            Ok(())
        }

        fn update(&mut self, _ctx: &UpdateCtx<'_>) -> Result<AppControl> {
            self.bump();
            self.variable += 1;
            Ok(AppControl::Continue)
        }

        fn fixed_update(&mut self, _fixed_dt: f32) -> Result<()> {
            if !self.loaded {
                self.fixed_before_load = true;
            }
            self.bump();
            self.fixed += 1;
            Ok(())
        }
    }

    // ── mutual exclusion ──────────────────────────────────────────────────

    #[test]
    fn both_timelines_serialize_on_one_lock() {
        let mut game = Game::new(Counter::default(), LoopConfig::with_frequency(500.0));
        game.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(1);
        while Instant::now() < deadline {
            game.tick_variable().unwrap();
        }

        let report = game.shutdown().unwrap();
        let shared = game.shared();
        let app = shared.lock();

        assert!(app.fixed > 0 && app.variable > 0);
        assert_eq!(app.fixed, report.ticks);
        assert_eq!(app.total, app.fixed + app.variable);
        assert!(!app.fixed_before_load);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn invalid_frequency_fails_before_load_content() {
        let mut game = Game::new(Counter::default(), LoopConfig::with_frequency(0.0));
        assert!(game.start().is_err());
        assert!(!game.shared().lock().loaded);
        assert_eq!(game.fixed_state(), LoopState::NotStarted);
    }

    #[test]
    fn shutdown_stops_fixed_thread() {
        let mut game = Game::new(Counter::default(), LoopConfig::with_frequency(100.0));
        game.start().unwrap();
        thread::sleep(Duration::from_millis(50));

        game.shutdown().unwrap();
        assert_eq!(game.fixed_state(), LoopState::Stopped);
        assert!(!game.is_running());
    }

    #[test]
    fn dropping_a_started_game_stops_fixed_thread() {
        let mut game = Game::new(Counter::default(), LoopConfig::with_frequency(200.0));
        let shared = game.shared();
        game.start().unwrap();
        thread::sleep(Duration::from_millis(50));

        drop(game);
        let after_drop = shared.lock().fixed;
        assert!(after_drop > 0);

        thread::sleep(Duration::from_millis(100));
        assert_eq!(shared.lock().fixed, after_drop);
    }

    struct Faulty {
        ticks: u32,
    }

    impl App for Faulty {
        fn update(&mut self, ctx: &UpdateCtx<'_>) -> Result<AppControl> {
            if ctx.fixed_state == LoopState::Stopped {
                return Ok(AppControl::Exit);
            }
            Ok(AppControl::Continue)
        }

        fn fixed_update(&mut self, _fixed_dt: f32) -> Result<()> {
            self.ticks += 1;
            if self.ticks == 2 {
                bail!("integrator blew up");
            }
            Ok(())
        }
    }

    #[test]
    fn fixed_fault_surfaces_at_shutdown() {
        let mut game = Game::new(Faulty { ticks: 0 }, LoopConfig::with_frequency(200.0));
        game.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while !game.has_fixed_fault() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(game.has_fixed_fault());
        assert_eq!(game.tick_variable().unwrap(), AppControl::Exit);

        let err = game.shutdown().unwrap_err();
        assert!(format!("{err:#}").contains("integrator blew up"));
    }

    // ── input ─────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct Keys {
        seen: Vec<Key>,
        pressed_in_update: bool,
    }

    impl App for Keys {
        fn update(&mut self, ctx: &UpdateCtx<'_>) -> Result<AppControl> {
            self.pressed_in_update |= ctx.key_pressed(Key::Space);
            Ok(AppControl::Continue)
        }

        fn on_input(&mut self, event: &InputEvent) -> AppControl {
            if let InputEvent::Key { key, .. } = event {
                self.seen.push(*key);
                if *key == Key::Escape {
                    return AppControl::Exit;
                }
            }
            AppControl::Continue
        }
    }

    fn key(key: Key) -> InputEvent {
        InputEvent::Key {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            code: 0,
            repeat: false,
        }
    }

    #[test]
    fn input_reaches_app_and_update_ctx() {
        let mut game = Game::new(Keys::default(), LoopConfig::default());

        assert_eq!(game.dispatch_input(key(Key::Space)), AppControl::Continue);
        game.tick_variable().unwrap();
        assert_eq!(game.dispatch_input(key(Key::Escape)), AppControl::Exit);

        let shared = game.shared();
        let app = shared.lock();
        assert_eq!(app.seen, vec![Key::Space, Key::Escape]);
        assert!(app.pressed_in_update);
    }
}
