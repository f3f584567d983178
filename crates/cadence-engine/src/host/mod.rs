//! Windowless host.

mod headless;

pub use headless::{HeadlessHost, HeadlessSummary, StopReason};
