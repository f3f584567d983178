//! Cadence engine crate.
//!
//! A dual-rate game loop: a fixed-update thread running at a configured
//! frequency beside a variable-rate update driven by the host's event loop,
//! both serialized on one lock around the application.

pub mod config;
pub mod core;
pub mod error;
pub mod fixed;
pub mod host;
pub mod input;
pub mod sync;
pub mod time;
pub mod window;

pub mod logging;
