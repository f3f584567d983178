//! Window host.
//!
//! Owns the `winit` EventLoop and Window and drives a `Game` from them.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
