use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{ensure, Result};

use crate::core::{App, AppControl, Command, FrameCtx, RuntimeCtx};
use crate::time::{FrameClock, FrameQueue};

/// Headless loop configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Target spacing between frames.
    pub frame_interval: Duration,
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
    /// Stop once a frame ends with nothing scheduled for the next one.
    pub exit_when_idle: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_micros(16_667),
            max_frames: None,
            exit_when_idle: true,
        }
    }
}

impl HeadlessConfig {
    pub fn with_fps(fps: u32) -> Self {
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
            ..Self::default()
        }
    }
}

/// Fixed-interval frame loop without a window.
pub struct HeadlessRuntime;

impl HeadlessRuntime {
    /// Runs frames on the calling thread until the app exits, the queue goes
    /// idle (if configured), or `max_frames` is reached. Returns the number
    /// of frames run.
    pub fn run<A>(config: HeadlessConfig, frames: Rc<FrameQueue>, mut app: A) -> Result<u64>
    where
        A: App,
    {
        ensure!(
            !config.frame_interval.is_zero(),
            "headless frame interval must be non-zero"
        );

        log::debug!(
            "headless runtime starting ({:?} per frame, max {:?})",
            config.frame_interval,
            config.max_frames
        );

        let mut clock = FrameClock::new();
        let mut count = 0u64;

        loop {
            let started = Instant::now();
            let time = clock.tick();
            frames.run_frame(time.timestamp_ms);
            count += 1;

            let mut runtime_ctx = RuntimeCtx::default();
            let control = {
                let mut ctx = FrameCtx {
                    time,
                    frames: frames.as_ref(),
                    runtime: &mut runtime_ctx,
                };
                app.on_frame(&mut ctx)
            };

            let mut exit = control == AppControl::Exit;
            for cmd in runtime_ctx.drain() {
                match cmd {
                    Command::SetTitle(title) => log::debug!("title: {title}"),
                    Command::Exit => exit = true,
                }
            }

            if exit {
                log::debug!("headless runtime exit requested after {count} frame(s)");
                break;
            }
            if config.exit_when_idle && !frames.has_pending() {
                log::debug!("headless runtime idle after {count} frame(s)");
                break;
            }
            if config.max_frames.is_some_and(|max| count >= max) {
                break;
            }

            let elapsed = started.elapsed();
            if elapsed < config.frame_interval {
                thread::sleep(config.frame_interval - elapsed);
            }
        }

        Ok(count)
    }
}
