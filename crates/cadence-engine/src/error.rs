use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Rejected loop configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("fixed update frequency must be positive, got {0} Hz")]
    NonPositiveFrequency(f64),

    #[error("fixed update frequency must be finite, got {0}")]
    NonFiniteFrequency(f64),

    #[error("frequency {0} Hz is too low: its period does not fit in a Duration")]
    PeriodOutOfRange(f64),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Errors returned when starting the fixed-rate timeline.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("invalid loop configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("fixed update loop was already started")]
    AlreadyStarted,

    #[error("failed to spawn fixed update thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// What went wrong inside a fixed-update callback.
#[derive(Debug)]
pub enum FaultKind {
    /// The callback returned `Err`.
    Error(anyhow::Error),
    /// The callback panicked; the payload message when it was a string.
    Panic(String),
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Error(e) => write!(f, "{e:#}"),
            FaultKind::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// A fault raised by the fixed-update callback.
///
/// Ends the fixed-rate thread only. `tick` is the 1-based index of the
/// invocation that failed; `elapsed` is measured from loop start.
#[derive(Debug, Error)]
#[error("fixed update faulted on tick {tick} ({elapsed:?} after start): {kind}")]
pub struct LoopFault {
    pub tick: u64,
    pub elapsed: Duration,
    pub kind: FaultKind,
}

impl LoopFault {
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, FaultKind::Panic(_))
    }
}
