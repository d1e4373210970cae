use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, Command, FrameCtx, RuntimeCtx};
use crate::time::{FrameClock, FrameQueue};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Minimum spacing between frames. Nothing is presented, so redraws are
    /// not vsync-paced and need an explicit cap.
    pub frame_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "clockwork".to_string(),
            initial_size: LogicalSize::new(480.0, 160.0),
            frame_interval: Duration::from_micros(16_667),
        }
    }
}

/// Entry point for the windowed runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and runs until it closes or the app exits.
    ///
    /// Frames are produced only while `frames` has pending callbacks, plus
    /// one frame after each window event so the app can react to input.
    pub fn run<A>(config: RuntimeConfig, frames: Rc<FrameQueue>, app: A) -> Result<()>
    where
        A: App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, frames, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

struct RuntimeState<A: App> {
    config: RuntimeConfig,
    frames: Rc<FrameQueue>,
    app: A,

    clock: FrameClock,
    window: Option<Window>,
    last_frame_at: Option<Instant>,
    needs_frame: bool,
    exit_requested: bool,
}

impl<A: App> RuntimeState<A> {
    fn new(config: RuntimeConfig, frames: Rc<FrameQueue>, app: A) -> Self {
        Self {
            config,
            frames,
            app,
            clock: FrameClock::new(),
            window: None,
            last_frame_at: None,
            needs_frame: true,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        log::debug!("window {:?} created", window.id());
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    /// Drives one frame: scheduled callbacks first, then the app.
    fn frame(&mut self) {
        self.needs_frame = false;
        self.last_frame_at = Some(Instant::now());

        let time = self.clock.tick();
        self.frames.run_frame(time.timestamp_ms);

        let mut runtime_ctx = RuntimeCtx::default();
        let control = {
            let mut ctx = FrameCtx {
                time,
                frames: self.frames.as_ref(),
                runtime: &mut runtime_ctx,
            };
            self.app.on_frame(&mut ctx)
        };

        if control == AppControl::Exit {
            runtime_ctx.exit();
        }
        self.apply_commands(runtime_ctx);
    }

    fn apply_commands(&mut self, mut ctx: RuntimeCtx) {
        for cmd in ctx.drain() {
            match cmd {
                Command::SetTitle(title) => {
                    if let Some(window) = &self.window {
                        window.set_title(&title);
                    }
                }
                Command::Exit => self.exit_requested = true,
            }
        }
    }
}

impl<A: App> ApplicationHandler for RuntimeState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.request_exit();
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(window) = &self.window else {
            return;
        };

        if !self.needs_frame && !self.frames.has_pending() {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let due = self
            .last_frame_at
            .map(|at| at + self.config.frame_interval)
            .unwrap_or_else(Instant::now);

        if Instant::now() >= due {
            event_loop.set_control_flow(ControlFlow::Wait);
            window.request_redraw();
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(due));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.window.as_ref().map(Window::id) != Some(window_id) {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.request_exit();
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::debug!("window {window_id:?} close requested");
                self.window = None;
                self.request_exit();
            }

            WindowEvent::RedrawRequested => self.frame(),

            // Input may have started or paused a timer; give the app a frame
            // to show it even if nothing is scheduled.
            _ => self.needs_frame = true,
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}
