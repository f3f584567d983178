//! Core engine-facing contracts.
//!
//! `App` is what a game implements; `Game` is what a host drives. Hosts never
//! touch the application directly: every call goes through the same lock the
//! fixed-rate thread uses.

mod app;
mod ctx;
mod game;

pub use app::{App, AppControl};
pub use ctx::UpdateCtx;
pub use game::Game;
