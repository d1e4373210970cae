//! Clockwork engine crate.
//!
//! Frame-driven timers and the host pieces that drive them: a frame
//! scheduler, observable cells for presentation layers, teardown scopes,
//! and windowed/headless frame runtimes.

pub mod time;
pub mod reactive;
pub mod core;
pub mod window;

pub mod logging;
