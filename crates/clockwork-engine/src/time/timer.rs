use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::reactive::{Observable, Scope};

use super::format;
use super::scheduler::{FrameRegistration, FrameScheduler};

type CompleteFn = Box<dyn Fn()>;
type TickFn = Box<dyn Fn(i64)>;
type FormatFn = Box<dyn Fn(f64, f64) -> String>;

/// Where a timer is in its lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TimerStatus {
    /// Never started, or reset since.
    Idle,
    Running,
    /// Halted by `pause` or `stop`; `start` resumes.
    Paused,
    /// A countdown reached zero. `reset`, `restart` and `set_time` leave
    /// this state.
    Completed,
}

/// Construction-time timer settings.
///
/// ```rust,ignore
/// let config = TimerConfig::new()
///     .initial_seconds(90.0)
///     .count_down(true)
///     .format(format::clock)
///     .on_complete(|| log::info!("time's up"));
/// ```
pub struct TimerConfig {
    initial_seconds: f64,
    count_down: bool,
    auto_start: bool,
    on_complete: Option<CompleteFn>,
    on_tick: Option<TickFn>,
    format: Option<FormatFn>,
}

impl TimerConfig {
    pub fn new() -> Self {
        Self {
            initial_seconds: 0.0,
            count_down: false,
            auto_start: false,
            on_complete: None,
            on_tick: None,
            format: None,
        }
    }

    /// Starting value for both the current and the total seconds.
    pub fn initial_seconds(mut self, seconds: f64) -> Self {
        self.initial_seconds = seconds;
        self
    }

    /// Count down to zero instead of up without bound.
    pub fn count_down(mut self, count_down: bool) -> Self {
        self.count_down = count_down;
        self
    }

    /// Start running as soon as the timer is constructed.
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Called once each time a countdown reaches zero.
    pub fn on_complete(mut self, f: impl Fn() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Called after every integration step with the floored current seconds.
    pub fn on_tick(mut self, f: impl Fn(i64) + 'static) -> Self {
        self.on_tick = Some(Box::new(f));
        self
    }

    /// Replaces [`format::default_display`].
    pub fn format(mut self, f: impl Fn(f64, f64) -> String + 'static) -> Self {
        self.format = Some(Box::new(f));
        self
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerConfig")
            .field("initial_seconds", &self.initial_seconds)
            .field("count_down", &self.count_down)
            .field("auto_start", &self.auto_start)
            .field("on_complete", &self.on_complete.is_some())
            .field("on_tick", &self.on_tick.is_some())
            .field("format", &self.format.is_some())
            .finish()
    }
}

/// Frame-driven countdown / count-up clock.
///
/// The timer asks its [`FrameScheduler`] for one frame at a time while
/// running and integrates the real time between frame timestamps, so a slow
/// or throttled host never makes it drift. Its public state lives in
/// [`Observable`] cells that presentation layers can bind to.
///
/// Dropping the timer cancels any outstanding frame.
pub struct Timer {
    core: Rc<TimerCore>,
}

/// Weak, cloneable control handle for a [`Timer`].
///
/// Meant for callbacks that drive their own timer (e.g. restarting from
/// `on_complete`) without keeping it alive. Every operation is a no-op once
/// the timer is gone.
#[derive(Clone)]
pub struct TimerHandle {
    core: Weak<TimerCore>,
}

struct TimerCore {
    scheduler: Rc<dyn FrameScheduler>,
    weak_self: Weak<TimerCore>,

    initial_seconds: f64,
    count_down: bool,
    on_complete: Option<CompleteFn>,
    on_tick: Option<TickFn>,
    format: FormatFn,

    seconds: Observable<f64>,
    total_seconds: Observable<f64>,
    running: Observable<bool>,
    display: Observable<String>,

    status: Cell<TimerStatus>,
    last_timestamp: Cell<Option<f64>>,
    /// Generation of the outstanding frame request. A tick carrying any
    /// other value is stale.
    ticket: Cell<u64>,
    registration: RefCell<Option<FrameRegistration>>,
    /// Set when the owning `Scope` tears down; `start` is refused after.
    torn_down: Cell<bool>,
}

impl Timer {
    pub fn new(scheduler: Rc<dyn FrameScheduler>, config: TimerConfig) -> Self {
        let TimerConfig {
            initial_seconds,
            count_down,
            auto_start,
            on_complete,
            on_tick,
            format,
        } = config;

        let initial_seconds = sanitize_seconds(initial_seconds);
        let format = format.unwrap_or_else(|| Box::new(format::default_display));
        let display = format(initial_seconds, initial_seconds);

        let core = Rc::new_cyclic(|weak_self| TimerCore {
            scheduler,
            weak_self: weak_self.clone(),
            initial_seconds,
            count_down,
            on_complete,
            on_tick,
            format,
            seconds: Observable::new(initial_seconds),
            total_seconds: Observable::new(initial_seconds),
            running: Observable::new(false),
            display: Observable::new(display),
            status: Cell::new(TimerStatus::Idle),
            last_timestamp: Cell::new(None),
            ticket: Cell::new(0),
            registration: RefCell::new(None),
            torn_down: Cell::new(false),
        });

        let timer = Self { core };
        if auto_start {
            timer.start();
        }
        timer
    }

    /// Like [`Timer::new`], and also halts the timer when `scope` tears down.
    /// Once torn down, the timer refuses to start again.
    pub fn in_scope(scope: &Scope, scheduler: Rc<dyn FrameScheduler>, config: TimerConfig) -> Self {
        let timer = Self::new(scheduler, config);
        let handle = timer.handle();
        scope.on_teardown(move || handle.halt_for_teardown());
        timer
    }

    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            core: Rc::downgrade(&self.core),
        }
    }

    // ── Control ───────────────────────────────────────────────────────────

    pub fn start(&self) {
        self.core.start();
    }

    pub fn pause(&self) {
        self.core.pause();
    }

    /// Same effect as [`pause`](Timer::pause).
    pub fn stop(&self) {
        self.core.stop();
    }

    pub fn reset(&self) {
        self.core.reset();
    }

    pub fn restart(&self) {
        self.core.restart();
    }

    pub fn set_time(&self, seconds: f64) {
        self.core.set_time(seconds);
    }

    // ── State ─────────────────────────────────────────────────────────────

    pub fn seconds(&self) -> &Observable<f64> {
        &self.core.seconds
    }

    pub fn total_seconds(&self) -> &Observable<f64> {
        &self.core.total_seconds
    }

    pub fn running(&self) -> &Observable<bool> {
        &self.core.running
    }

    pub fn display(&self) -> &Observable<String> {
        &self.core.display
    }

    pub fn is_running(&self) -> bool {
        self.core.running.get()
    }

    pub fn status(&self) -> TimerStatus {
        self.core.status.get()
    }

    pub fn is_count_down(&self) -> bool {
        self.core.count_down
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("status", &self.core.status.get())
            .field("seconds", &self.core.seconds.get())
            .field("total_seconds", &self.core.total_seconds.get())
            .field("count_down", &self.core.count_down)
            .finish()
    }
}

impl TimerHandle {
    pub fn is_alive(&self) -> bool {
        self.core.strong_count() > 0
    }

    pub fn start(&self) {
        self.with_core(TimerCore::start);
    }

    pub fn pause(&self) {
        self.with_core(TimerCore::pause);
    }

    pub fn stop(&self) {
        self.with_core(TimerCore::stop);
    }

    pub fn reset(&self) {
        self.with_core(TimerCore::reset);
    }

    pub fn restart(&self) {
        self.with_core(TimerCore::restart);
    }

    pub fn set_time(&self, seconds: f64) {
        self.with_core(|core| core.set_time(seconds));
    }

    /// Current status, or `None` once the timer is dropped.
    pub fn status(&self) -> Option<TimerStatus> {
        self.core.upgrade().map(|core| core.status.get())
    }

    fn halt_for_teardown(&self) {
        self.with_core(|core| {
            core.torn_down.set(true);
            if core.halt(TimerStatus::Paused) {
                log::debug!("timer halted by scope teardown");
            }
        });
    }

    fn with_core(&self, f: impl FnOnce(&TimerCore)) {
        if let Some(core) = self.core.upgrade() {
            f(&core);
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl TimerCore {
    fn start(&self) {
        match self.status.get() {
            TimerStatus::Running => return,
            TimerStatus::Completed => {
                log::debug!("start ignored: countdown already completed");
                return;
            }
            TimerStatus::Idle | TimerStatus::Paused => {}
        }
        if self.torn_down.get() {
            log::debug!("start ignored: scope already torn down");
            return;
        }

        self.last_timestamp.set(None);
        self.status.set(TimerStatus::Running);
        self.schedule();
        self.running.set(true);
        log::debug!("timer started at {:.3}s", self.seconds.get());
    }

    fn pause(&self) {
        if self.halt(TimerStatus::Paused) {
            log::debug!("timer paused at {:.3}s", self.seconds.get());
        }
    }

    fn stop(&self) {
        if self.halt(TimerStatus::Paused) {
            log::debug!("timer stopped at {:.3}s", self.seconds.get());
        }
    }

    fn reset(&self) {
        // `running` goes out with the rest of the snapshot.
        self.release(TimerStatus::Idle);
        self.status.set(TimerStatus::Idle);

        let initial = self.initial_seconds;
        let text = (self.format)(initial, initial);
        self.publish(initial, initial, false, text);
    }

    fn restart(&self) {
        self.reset();
        self.start();
    }

    fn set_time(&self, seconds: f64) {
        if self.status.get() == TimerStatus::Completed {
            self.status.set(TimerStatus::Idle);
        }

        let seconds = sanitize_seconds(seconds);
        let text = (self.format)(seconds, seconds);
        self.publish(seconds, seconds, self.running.get(), text);
    }

    /// Cancels the outstanding frame and leaves `Running` for `status`.
    /// Returns `false` (doing nothing) if the timer was not running.
    fn halt(&self, status: TimerStatus) -> bool {
        let halted = self.release(status);
        if halted {
            self.running.set(false);
        }
        halted
    }

    /// [`halt`](Self::halt) without touching `running`; the caller publishes it.
    fn release(&self, status: TimerStatus) -> bool {
        if self.status.get() != TimerStatus::Running {
            return false;
        }

        // Dropping the registration cancels the frame with the host.
        drop(self.registration.take());
        self.last_timestamp.set(None);
        self.status.set(status);
        true
    }

    fn schedule(&self) {
        let ticket = self.ticket.get().wrapping_add(1);
        self.ticket.set(ticket);

        let weak = self.weak_self.clone();
        let registration = FrameRegistration::request(
            &self.scheduler,
            Box::new(move |timestamp| {
                if let Some(core) = weak.upgrade() {
                    core.tick(ticket, timestamp);
                }
            }),
        );

        let previous = self.registration.replace(Some(registration));
        drop(previous);
    }

    fn tick(&self, ticket: u64, timestamp: f64) {
        if self.status.get() != TimerStatus::Running || ticket != self.ticket.get() {
            log::trace!("stale frame ignored (ticket {ticket})");
            return;
        }

        if let Some(registration) = self.registration.take() {
            registration.fired();
        }

        let delta = match self.last_timestamp.replace(Some(timestamp)) {
            None => 0.0,
            // Non-monotonic host clocks must not reverse the direction.
            Some(last) => ((timestamp - last) / 1000.0).max(0.0),
        };

        let mut current = self.seconds.get();
        if self.count_down {
            current -= delta;
        } else {
            current += delta;
        }

        let completed = self.count_down && current <= 0.0;
        if completed {
            current = 0.0;
            self.last_timestamp.set(None);
            self.status.set(TimerStatus::Completed);
        } else {
            self.schedule();
        }

        log::trace!("tick at {timestamp:.3}ms: delta {delta:.4}s, now {current:.4}s");

        let whole = current.floor();
        let text = (self.format)(whole, self.total_seconds.get());
        self.publish(current, self.total_seconds.get(), !completed, text);

        if completed {
            log::debug!("countdown completed");
            if let Some(on_complete) = &self.on_complete {
                on_complete();
            }
        }

        if let Some(on_tick) = &self.on_tick {
            // Read back: `on_complete` may have reset or restarted the timer.
            on_tick(self.seconds.get().floor() as i64);
        }
    }

    /// Stores a full snapshot, then notifies observers of what changed.
    fn publish(&self, seconds: f64, total: f64, running: bool, display: String) {
        let seconds_changed = self.seconds.store(seconds);
        let total_changed = self.total_seconds.store(total);
        let running_changed = self.running.store(running);
        let display_changed = self.display.store(display);

        if seconds_changed {
            self.seconds.notify();
        }
        if total_changed {
            self.total_seconds.notify();
        }
        if running_changed {
            self.running.notify();
        }
        if display_changed {
            self.display.notify();
        }
    }
}

fn sanitize_seconds(seconds: f64) -> f64 {
    if seconds.is_nan() || seconds < 0.0 {
        log::warn!("invalid timer value {seconds}; using 0");
        return 0.0;
    }
    seconds
}
