use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::LoopConfig;
use crate::error::{FaultKind, LoopError, LoopFault};
use crate::sync::SharedState;

use super::state::{LoopState, StateCell};

const THREAD_NAME: &str = "cadence-fixed";

/// Summary of a fixed loop that ended without a fault.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LoopReport {
    /// Fixed ticks that ran to completion.
    pub ticks: u64,
    /// Wall time between thread start and exit.
    pub ran_for: Duration,
}

/// State observable from outside the worker thread.
#[derive(Debug)]
struct Status {
    state: StateCell,
    ticks: AtomicU64,
    fault: Mutex<Option<LoopFault>>,
}

/// Owns the fixed-rate thread.
///
/// The thread polls the host-running predicate once per iteration and exits
/// for good the first time it reads `false`. Each iteration locks the shared
/// application, runs the fixed callback, unlocks, then sleeps according to the
/// configured [`DriftPolicy`](crate::config::DriftPolicy).
///
/// An `Err` or a panic from the callback ends the thread and is kept as a
/// [`LoopFault`] for the host to collect. Dropping the controller detaches the
/// thread, which keeps running until the predicate turns false. `Game` clears
/// its run flag and joins on drop.
#[derive(Debug)]
pub struct LoopController {
    config: LoopConfig,
    status: Arc<Status>,
    handle: Option<JoinHandle<Duration>>,
}

impl LoopController {
    pub fn new(config: LoopConfig) -> Self {
        Self {
            config,
            status: Arc::new(Status {
                state: StateCell::new(),
                ticks: AtomicU64::new(0),
                fault: Mutex::new(None),
            }),
            handle: None,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Spawns the fixed-rate thread.
    ///
    /// Fails without spawning when the frequency is invalid or when this
    /// controller has already been started once.
    pub fn start<A, F, P>(
        &mut self,
        shared: SharedState<A>,
        fixed_update: F,
        is_host_running: P,
    ) -> Result<(), LoopError>
    where
        A: Send + 'static,
        F: FnMut(&mut A, f32) -> anyhow::Result<()> + Send + 'static,
        P: Fn() -> bool + Send + 'static,
    {
        if self.state() != LoopState::NotStarted {
            return Err(LoopError::AlreadyStarted);
        }
        self.config.validate()?;

        let worker = Worker {
            config: self.config,
            status: Arc::clone(&self.status),
            shared,
            fixed_update,
            is_host_running,
        };

        // Mark running before the thread exists so `state()` never reads
        // `NotStarted` after a successful start.
        self.status.state.advance(LoopState::Running);

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || worker.run())
            .map_err(|e| {
                self.status.state.advance(LoopState::Stopped);
                LoopError::Spawn(e)
            })?;

        self.handle = Some(handle);
        Ok(())
    }

    pub fn state(&self) -> LoopState {
        self.status.state.get()
    }

    /// Fixed ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.status.ticks.load(Ordering::Acquire)
    }

    pub fn has_fault(&self) -> bool {
        self.status.fault.lock().is_some()
    }

    /// Removes the recorded fault, if any.
    pub fn take_fault(&self) -> Option<LoopFault> {
        self.status.fault.lock().take()
    }

    /// Waits for the fixed thread to exit.
    ///
    /// Blocks until the host-running predicate returns `false` or the
    /// callback faults. Returns immediately for a controller that never started.
    pub fn join(&mut self) -> Result<LoopReport, LoopFault> {
        let ran_for = match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(ran_for) => ran_for,
                Err(payload) => {
                    // The worker catches callback panics; this is a panic in the loop itself.
                    self.status.state.advance(LoopState::Stopped);
                    return Err(LoopFault {
                        tick: self.ticks() + 1,
                        elapsed: Duration::ZERO,
                        kind: FaultKind::Panic(panic_message(payload.as_ref())),
                    });
                }
            },
            None => Duration::ZERO,
        };

        if let Some(fault) = self.take_fault() {
            return Err(fault);
        }

        Ok(LoopReport {
            ticks: self.ticks(),
            ran_for,
        })
    }
}

struct Worker<A, F, P> {
    config: LoopConfig,
    status: Arc<Status>,
    shared: SharedState<A>,
    fixed_update: F,
    is_host_running: P,
}

impl<A, F, P> Worker<A, F, P>
where
    F: FnMut(&mut A, f32) -> anyhow::Result<()>,
    P: Fn() -> bool,
{
    fn run(mut self) -> Duration {
        let started = Instant::now();
        let period = self.config.period();
        let fixed_dt = self.config.fixed_delta();

        log::info!(
            "fixed update loop started: {} Hz, {:?} drift",
            self.config.fixed_frequency_hz,
            self.config.drift
        );

        let mut tick: u64 = 0;

        loop {
            if !(self.is_host_running)() {
                log::info!("host stopped; fixed update loop exiting after {tick} ticks");
                break;
            }

            tick += 1;
            let tick_start = Instant::now();

            let mut app = self.shared.lock();
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| (self.fixed_update)(&mut *app, fixed_dt)));
            drop(app);

            let kind = match outcome {
                Ok(Ok(())) => {
                    self.status.ticks.store(tick, Ordering::Release);
                    None
                }
                Ok(Err(e)) => Some(FaultKind::Error(e)),
                Err(payload) => Some(FaultKind::Panic(panic_message(payload.as_ref()))),
            };

            if let Some(kind) = kind {
                let fault = LoopFault {
                    tick,
                    elapsed: started.elapsed(),
                    kind,
                };
                log::error!("{fault}; fixed update loop stopped");
                *self.status.fault.lock() = Some(fault);
                break;
            }

            let spent = tick_start.elapsed();
            if spent > period {
                log::trace!("fixed tick {tick} overran its period: {spent:?} > {period:?}");
            }
            thread::sleep(self.config.drift.sleep_for(period, spent));
        }

        self.status.state.advance(LoopState::Stopped);
        started.elapsed()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
