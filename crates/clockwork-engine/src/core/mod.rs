//! Core engine-facing contracts.
//!
//! The interface between a frame runtime (windowed or headless) and the
//! application that owns timers. Runtimes pump the shared `FrameQueue`
//! first, then hand the application a `FrameCtx` for the same frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, RuntimeCtx};
pub(crate) use ctx::Command;
