//! Loop configuration.
//!
//! The fixed-rate timeline has one knob worth configuring: its frequency.
//! Values come from code (`LoopConfig::with_frequency`) or the environment
//! (`LoopConfig::from_env`) and are validated before any thread starts.

mod loop_config;

pub use loop_config::{period_for, DriftPolicy, LoopConfig, DEFAULT_FIXED_FREQUENCY_HZ};
