use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Milliseconds since the clock was created. Monotonic, sub-millisecond
    /// resolution; this is what frame callbacks receive.
    pub timestamp_ms: f64,

    /// Seconds elapsed since the previous tick (zero on the first tick).
    pub dt: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One clock per runtime loop, so separate loops never share a baseline.
///
/// Unlike a simulation clock, `dt` is not clamped: timers integrate real
/// elapsed time and must see long stalls in full.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
    last: Option<Instant>,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last: None,
            frame_index: 0,
        }
    }

    /// Milliseconds elapsed since the clock was created, without ticking.
    pub fn now_ms(&self) -> f64 {
        millis_between(self.origin, Instant::now())
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last = Some(now);

        let ft = FrameTime {
            timestamp_ms: millis_between(self.origin, now),
            dt,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

fn millis_between(origin: Instant, now: Instant) -> f64 {
    now.saturating_duration_since(origin).as_secs_f64() * 1000.0
}
