use std::cell::OnceCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use clockwork_engine::time::{format, FrameScheduler, Timer, TimerConfig, TimerHandle};
use clockwork_fs::FileEntry;
use serde::{Deserialize, Serialize};

use crate::cli::RunArgs;

/// Timer settings as stored in a preset file. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub name: Option<String>,
    pub seconds: f64,
    pub count_down: bool,
    pub clock: bool,
    pub repeat: bool,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: None,
            seconds: 0.0,
            count_down: false,
            clock: false,
            repeat: false,
        }
    }
}

impl Preset {
    pub fn load(path: &Path) -> Result<Self> {
        let entry = FileEntry::open(path)
            .with_context(|| format!("failed to open preset {}", path.display()))?;
        let preset = clockwork_fs::read_file_json(&entry)
            .with_context(|| format!("failed to read preset {}", path.display()))?;
        log::debug!("loaded preset {}", entry.path);
        Ok(preset)
    }

    /// A 25 minute countdown, written by `presets --init`.
    pub fn pomodoro() -> Self {
        Self {
            name: Some("pomodoro".into()),
            seconds: 25.0 * 60.0,
            count_down: true,
            clock: true,
            repeat: false,
        }
    }

    /// Applies command-line overrides. Flags can only switch options on.
    pub fn with_args(mut self, args: &RunArgs) -> Self {
        if let Some(seconds) = args.seconds {
            self.seconds = seconds;
        }
        self.count_down |= args.count_down;
        self.clock |= args.clock;
        self.repeat |= args.repeat;
        self
    }

    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None if self.count_down => "countdown".into(),
            None => "stopwatch".into(),
        }
    }

    pub fn describe(&self) -> String {
        let mut text = format!(
            "{} {}s",
            if self.count_down { "down" } else { "up" },
            self.seconds
        );
        if self.repeat {
            text.push_str(" repeat");
        }
        text
    }

    /// Builds an idle timer. A repeating countdown restarts itself on
    /// completion through its own handle.
    pub fn build_timer(&self, scheduler: Rc<dyn FrameScheduler>) -> Result<Timer> {
        let slot = Rc::new(OnceCell::new());
        let timer = Timer::new(scheduler, self.timer_config(slot.clone()));
        slot.set(timer.handle())
            .map_err(|_| anyhow!("timer handle for {} was already set", self.label()))?;
        Ok(timer)
    }

    /// `handle` is read when the countdown completes, so it may be filled in
    /// after the timer is built.
    fn timer_config(&self, handle: Rc<OnceCell<TimerHandle>>) -> TimerConfig {
        let label = self.label();
        let repeat = self.repeat;

        let config = TimerConfig::new()
            .initial_seconds(self.seconds)
            .count_down(self.count_down)
            .on_complete(move || {
                log::info!("{label}: done");
                if repeat {
                    if let Some(handle) = handle.get() {
                        handle.restart();
                    }
                }
            });

        if self.clock {
            config.format(format::clock)
        } else {
            config
        }
    }
}
