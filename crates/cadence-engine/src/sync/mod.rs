//! Shared application state.
//!
//! Both timelines reach the application through a `SharedState` handle. The
//! handle wraps a single mutex: that mutex is the only mutual-exclusion domain,
//! and every callback runs while holding it.

mod shared;
mod run_flag;

pub use run_flag::RunFlag;
pub use shared::SharedState;
