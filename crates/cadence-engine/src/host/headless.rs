use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::{period_for, LoopConfig};
use crate::core::{App, AppControl, Game};
use crate::fixed::LoopReport;

/// Why a headless run ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StopReason {
    /// `update` returned `AppControl::Exit`.
    AppExit,
    /// The configured run time elapsed.
    TimeLimit,
    /// The fixed thread stopped with a fault.
    FixedFault,
}

/// Result of a headless run that ended without error.
#[derive(Debug, Copy, Clone)]
pub struct HeadlessSummary {
    pub reason: StopReason,
    pub variable_ticks: u64,
    pub fixed: LoopReport,
    /// Last published variable-rate sample.
    pub fps: u32,
}

/// Windowless host for the variable-rate timeline.
///
/// Calls `Game::tick_variable` in a paced loop on the calling thread. Useful
/// for servers, tests and tools that still want the fixed/variable split.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    config: LoopConfig,
    target_hz: Option<f64>,
    max_duration: Option<Duration>,
}

impl HeadlessHost {
    pub fn new(config: LoopConfig) -> Self {
        Self {
            config,
            target_hz: Some(60.0),
            max_duration: None,
        }
    }

    /// Paces variable ticks to `hz`. `None` runs them back to back.
    ///
    /// The rate is checked by [`run`](Self::run) with the same rules as the
    /// fixed frequency.
    pub fn with_target_hz(mut self, hz: Option<f64>) -> Self {
        self.target_hz = hz;
        self
    }

    /// Ends the run after `limit` even if the app never exits.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.max_duration = Some(limit);
        self
    }

    /// Runs `app` until it exits, the time limit passes, or the fixed thread
    /// faults. A fixed-thread fault is returned as the error.
    pub fn run<A: App>(&self, app: A) -> Result<HeadlessSummary> {
        let pace = self
            .target_hz
            .map(period_for)
            .transpose()
            .context("invalid headless target rate")?;

        let mut game = Game::new(app, self.config);
        game.start()?;

        let started = Instant::now();
        let mut variable_ticks = 0u64;

        let reason = loop {
            if game.has_fixed_fault() {
                break StopReason::FixedFault;
            }
            if self.max_duration.is_some_and(|limit| started.elapsed() >= limit) {
                break StopReason::TimeLimit;
            }

            let tick_start = Instant::now();
            let control = match game.tick_variable() {
                Ok(control) => control,
                Err(e) => {
                    // Stop the fixed thread before reporting.
                    if let Err(fixed) = game.shutdown() {
                        log::error!("{fixed:#}");
                    }
                    return Err(e);
                }
            };
            variable_ticks += 1;

            if control == AppControl::Exit {
                break StopReason::AppExit;
            }

            if let Some(pace) = pace {
                thread::sleep(pace.saturating_sub(tick_start.elapsed()));
            }
        };

        log::info!("headless host stopping: {reason:?} after {variable_ticks} variable ticks");

        let fps = game.fps();
        let fixed = game.shutdown()?;

        Ok(HeadlessSummary {
            reason,
            variable_ticks,
            fixed,
            fps,
        })
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::core::UpdateCtx;

    struct ExitAfter {
        frames: u32,
        fixed: u32,
    }

    impl App for ExitAfter {
        fn update(&mut self, _ctx: &UpdateCtx<'_>) -> Result<AppControl> {
            self.frames = self.frames.saturating_sub(1);
            Ok(if self.frames == 0 {
                AppControl::Exit
            } else {
                AppControl::Continue
            })
        }

        fn fixed_update(&mut self, _fixed_dt: f32) -> Result<()> {
            self.fixed += 1;
            Ok(())
        }
    }

    #[test]
    fn app_exit_ends_run() {
        let summary = HeadlessHost::new(LoopConfig::default())
            .with_target_hz(Some(200.0))
            .run(ExitAfter { frames: 20, fixed: 0 })
            .unwrap();

        assert_eq!(summary.reason, StopReason::AppExit);
        assert_eq!(summary.variable_ticks, 20);
    }

    #[test]
    fn time_limit_ends_run() {
        let summary = HeadlessHost::new(LoopConfig::with_frequency(100.0))
            .with_target_hz(Some(100.0))
            .with_time_limit(Duration::from_millis(300))
            .run(ExitAfter {
                frames: u32::MAX,
                fixed: 0,
            })
            .unwrap();

        assert_eq!(summary.reason, StopReason::TimeLimit);
        assert!(summary.variable_ticks > 0);
        assert!(summary.fixed.ticks > 0);
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let err = HeadlessHost::new(LoopConfig::with_frequency(-1.0))
            .run(ExitAfter { frames: 1, fixed: 0 })
            .unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn invalid_target_rate_is_an_error() {
        for hz in [1e-300, 0.0, f64::NAN] {
            let err = HeadlessHost::new(LoopConfig::default())
                .with_target_hz(Some(hz))
                .run(ExitAfter { frames: 1, fixed: 0 })
                .unwrap_err();
            assert!(format!("{err:#}").contains("invalid headless target rate"));
        }
    }

    #[test]
    fn unpaced_run_needs_no_target_rate() {
        let summary = HeadlessHost::new(LoopConfig::default())
            .with_target_hz(None)
            .run(ExitAfter { frames: 5, fixed: 0 })
            .unwrap();
        assert_eq!(summary.variable_ticks, 5);
    }

    struct BadFixed;

    impl App for BadFixed {
        fn update(&mut self, _ctx: &UpdateCtx<'_>) -> Result<AppControl> {
            Ok(AppControl::Continue)
        }

        fn fixed_update(&mut self, _fixed_dt: f32) -> Result<()> {
            bail!("nan in velocity")
        }
    }

    #[test]
    fn fixed_fault_ends_run_with_error() {
        let err = HeadlessHost::new(LoopConfig::with_frequency(100.0))
            .with_time_limit(Duration::from_secs(5))
            .run(BadFixed)
            .unwrap_err();
        assert!(format!("{err:#}").contains("nan in velocity"));
    }

    struct BadUpdate;

    impl App for BadUpdate {
        fn update(&mut self, _ctx: &UpdateCtx<'_>) -> Result<AppControl> {
            bail!("lost the swapchain")
        }
    }

    #[test]
    fn update_error_propagates() {
        let err = HeadlessHost::new(LoopConfig::default())
            .run(BadUpdate)
            .unwrap_err();
        assert!(format!("{err:#}").contains("lost the swapchain"));
    }
}
