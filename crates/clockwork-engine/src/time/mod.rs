//! Time subsystem.
//!
//! - `FrameClock` turns "a frame happened" into monotonic millisecond
//!   timestamps, one clock per runtime loop
//! - `FrameScheduler` is the host's "call me on the next frame" primitive;
//!   `FrameQueue` is the stock implementation that runtimes pump
//! - `Timer` integrates frame timestamps into a countdown or count-up value
//!   and projects it into observable display state

mod frame_clock;
mod scheduler;
mod timer;

pub mod format;

pub use frame_clock::{FrameClock, FrameTime};
pub use scheduler::{FrameCallback, FrameHandle, FrameQueue, FrameRegistration, FrameScheduler};
pub use timer::{Timer, TimerConfig, TimerHandle, TimerStatus};
