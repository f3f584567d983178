//! Time subsystem.
//!
//! - `DeltaClock` produces the delta handed to each variable-rate update
//! - `FrameClock` turns a stream of ticks into a once-per-second rate sample
//! - `MonotonicMillis` is the millisecond source both rely on

mod delta_clock;
mod frame_clock;
mod millis;

pub use delta_clock::{DeltaClock, FrameTime};
pub use frame_clock::FrameClock;
pub use millis::MonotonicMillis;
