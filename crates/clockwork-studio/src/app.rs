use clockwork_engine::core::{App, AppControl, FrameCtx};
use clockwork_engine::time::{Timer, TimerStatus};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard-driven timer shown through the window title.
pub struct StudioApp {
    timer: Timer,
    label: String,
    title: String,
}

impl StudioApp {
    pub fn new(timer: Timer, label: String) -> Self {
        Self {
            timer,
            label,
            title: String::new(),
        }
    }

    fn key(&mut self, code: KeyCode) -> AppControl {
        match code {
            KeyCode::Space if self.timer.is_running() => self.timer.pause(),
            KeyCode::Space => self.timer.start(),
            KeyCode::KeyS => self.timer.stop(),
            KeyCode::KeyR => self.timer.restart(),
            KeyCode::Escape => return AppControl::Exit,
            _ => {}
        }
        AppControl::Continue
    }

    fn current_title(&self) -> String {
        let status = match self.timer.status() {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Completed => "done",
        };
        let display = self.timer.display().get();
        if display.is_empty() {
            format!("{} [{status}]", self.label)
        } else {
            format!("{} {display} [{status}]", self.label)
        }
    }
}

impl App for StudioApp {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }
        match event.physical_key {
            PhysicalKey::Code(code) => self.key(code),
            PhysicalKey::Unidentified(_) => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let title = self.current_title();
        if title != self.title {
            ctx.runtime.set_title(title.clone());
            self.title = title;
        }
        AppControl::Continue
    }
}
