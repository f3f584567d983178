//! Fixed-rate timeline.
//!
//! `LoopController` runs the fixed-update callback on a dedicated thread at a
//! configured frequency, serialized against the variable-rate side through a
//! shared [`SharedState`](crate::sync::SharedState).

mod controller;
mod state;

pub use controller::{LoopController, LoopReport};
pub use state::LoopState;
