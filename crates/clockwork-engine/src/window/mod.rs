//! Frame runtimes.
//!
//! Both runtimes own a `FrameClock`, pump a shared `FrameQueue` once per
//! frame, then call `core::App::on_frame`:
//! - `Runtime` drives frames from a winit window's redraw cycle
//! - `HeadlessRuntime` drives them from a fixed-interval loop

mod headless;
mod runtime;

pub use headless::{HeadlessConfig, HeadlessRuntime};
pub use runtime::{Runtime, RuntimeConfig};
