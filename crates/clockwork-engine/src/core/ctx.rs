use crate::time::{FrameQueue, FrameTime};

/// Commands an application can issue from a frame callback.
///
/// Commands are buffered and applied after the callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    SetTitle(String),
    Exit,
}

impl RuntimeCtx {
    /// Sets the window title. Headless runtimes log it instead.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commands.push(Command::SetTitle(title.into()));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Command> {
        self.commands.drain(..)
    }
}

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a> {
    pub time:    FrameTime,
    /// The queue the runtime just pumped. Timers created with it run on the
    /// next frame.
    pub frames:  &'a FrameQueue,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_> {
    /// Whether any frame callback is waiting for the next frame.
    pub fn has_pending_frames(&self) -> bool {
        self.frames.has_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_drain_in_order() {
        let mut rt = RuntimeCtx::default();
        rt.set_title("a");
        rt.exit();
        rt.set_title(String::from("b"));

        let drained: Vec<Command> = rt.drain().collect();
        assert_eq!(
            drained,
            vec![
                Command::SetTitle("a".into()),
                Command::Exit,
                Command::SetTitle("b".into()),
            ]
        );
        assert_eq!(rt.drain().count(), 0);
    }
}
