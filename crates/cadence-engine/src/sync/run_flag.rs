use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Host-running flag polled by the fixed-rate thread.
///
/// Cloning shares the flag. The host clears it on shutdown; setting it again
/// does not revive a fixed loop that has already observed `false`.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new(running: bool) -> Self {
        Self(Arc::new(AtomicBool::new(running)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, running: bool) {
        self.0.store(running, Ordering::Release);
    }

    pub fn stop(&self) {
        self.set(false);
    }

    /// Predicate form accepted by `LoopController::start`.
    pub fn predicate(&self) -> impl Fn() -> bool + Send + Sync + use<> {
        let flag = self.clone();
        move || flag.is_running()
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new(true)
    }
}
