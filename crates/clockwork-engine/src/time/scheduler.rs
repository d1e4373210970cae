use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

/// Callback run once on a future frame with that frame's timestamp in
/// milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Identifies one pending frame request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// For `FrameScheduler` implementations outside this crate.
    pub fn from_id(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host primitive for "run this on the next frame".
///
/// Implementations call each callback at most once, roughly once per display
/// refresh, with monotonically increasing timestamps. `cancel_frame` on a
/// handle that already ran (or was already cancelled) is a no-op.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;
    fn cancel_frame(&self, handle: FrameHandle);
}

/// Stock `FrameScheduler` pumped by a runtime loop.
///
/// Callbacks requested while a frame is running land on the *next* frame.
/// Cancelling a callback that belongs to the frame currently being run
/// prevents it from running.
#[derive(Default)]
pub struct FrameQueue {
    inner: RefCell<QueueInner>,
}

#[derive(Default)]
struct QueueInner {
    next_id: u64,
    pending: Vec<(FrameHandle, FrameCallback)>,
    /// Handles taken out for the frame in progress and not yet run.
    in_flight: Vec<FrameHandle>,
    running: bool,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Runs every callback queued before this call with `timestamp_ms`.
    ///
    /// Returns how many callbacks ran. Nested calls from inside a callback
    /// are ignored. If a callback panics, the callbacks of this frame that
    /// have not run yet go back to the front of the queue.
    pub fn run_frame(&self, timestamp_ms: f64) -> usize {
        let batch = {
            let mut inner = self.inner.borrow_mut();
            if inner.running {
                log::warn!("FrameQueue::run_frame called re-entrantly; ignored");
                return 0;
            }
            let batch = mem::take(&mut inner.pending);
            inner.in_flight = batch.iter().map(|(handle, _)| *handle).collect();
            inner.running = true;
            batch
        };

        let mut frame = FrameInProgress {
            inner: &self.inner,
            rest: batch.into_iter(),
        };

        let mut ran = 0;
        while let Some((handle, callback)) = frame.rest.next() {
            // The borrow must end before the callback runs: callbacks
            // request and cancel frames.
            let live = {
                let mut inner = self.inner.borrow_mut();
                match inner.in_flight.iter().position(|h| *h == handle) {
                    Some(pos) => {
                        inner.in_flight.swap_remove(pos);
                        true
                    }
                    None => false,
                }
            };
            if live {
                callback(timestamp_ms);
                ran += 1;
            }
        }
        drop(frame);

        log::trace!("frame at {timestamp_ms:.3}ms ran {ran} callback(s)");
        ran
    }
}

/// Unlocks the queue when a frame ends, including by unwinding.
struct FrameInProgress<'a> {
    inner: &'a RefCell<QueueInner>,
    rest: std::vec::IntoIter<(FrameHandle, FrameCallback)>,
}

impl Drop for FrameInProgress<'_> {
    fn drop(&mut self) {
        let cancelled = {
            let mut inner = self.inner.borrow_mut();
            let in_flight = mem::take(&mut inner.in_flight);
            inner.running = false;

            let (live, cancelled): (Vec<_>, Vec<_>) =
                self.rest.by_ref().partition(|(handle, _)| in_flight.contains(handle));
            if !live.is_empty() {
                log::warn!("frame unwound; requeued {} callback(s)", live.len());
                inner.pending.splice(0..0, live);
            }
            cancelled
        };
        // Captured state may itself cancel frames when dropped.
        drop(cancelled);
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id = inner.next_id.wrapping_add(1);
        let handle = FrameHandle(inner.next_id);
        inner.pending.push((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            if let Some(pos) = inner.pending.iter().position(|(h, _)| *h == handle) {
                Some(inner.pending.remove(pos))
            } else {
                if let Some(pos) = inner.in_flight.iter().position(|h| *h == handle) {
                    inner.in_flight.swap_remove(pos);
                }
                None
            }
        };
        // Captured state may itself cancel frames when dropped.
        drop(removed);
    }
}

/// Outstanding frame request that is cancelled when dropped.
///
/// Holding one of these is what "scheduled" means for a timer: every way of
/// letting go of it (pause, completion, teardown, drop) releases the host
/// registration.
pub struct FrameRegistration {
    scheduler: Rc<dyn FrameScheduler>,
    handle: Option<FrameHandle>,
}

impl FrameRegistration {
    pub fn request(scheduler: &Rc<dyn FrameScheduler>, callback: FrameCallback) -> Self {
        let handle = scheduler.request_frame(callback);
        Self {
            scheduler: Rc::clone(scheduler),
            handle: Some(handle),
        }
    }

    pub fn handle(&self) -> Option<FrameHandle> {
        self.handle
    }

    /// Consumes the registration after its callback has run.
    pub fn fired(mut self) {
        self.handle = None;
    }
}

impl Drop for FrameRegistration {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.scheduler.cancel_frame(handle);
        }
    }
}

impl std::fmt::Debug for FrameRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRegistration")
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() -> FrameCallback) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let make = move || -> FrameCallback {
            let h = h.clone();
            Box::new(move |_| h.set(h.get() + 1))
        };
        (hits, make)
    }

    fn explode(_timestamp: f64) {
        panic!("callback failed");
    }

    #[test]
    fn runs_each_callback_once() {
        let queue = FrameQueue::new();
        let (hits, cb) = counter();
        queue.request_frame(cb());
        queue.request_frame(cb());

        assert_eq!(queue.run_frame(16.0), 2);
        assert_eq!(hits.get(), 2);
        assert_eq!(queue.run_frame(32.0), 0);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn callback_receives_timestamp() {
        let queue = FrameQueue::new();
        let seen = Rc::new(Cell::new(0.0));
        let s = seen.clone();
        queue.request_frame(Box::new(move |t| s.set(t)));
        queue.run_frame(123.5);
        assert_eq!(seen.get(), 123.5);
    }

    #[test]
    fn cancel_before_frame() {
        let queue = FrameQueue::new();
        let (hits, cb) = counter();
        let handle = queue.request_frame(cb());
        queue.cancel_frame(handle);

        assert!(!queue.has_pending());
        assert_eq!(queue.run_frame(16.0), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn cancel_unknown_handle_is_noop() {
        let queue = FrameQueue::new();
        let (_, cb) = counter();
        let handle = queue.request_frame(cb());
        queue.run_frame(1.0);
        queue.cancel_frame(handle);
        queue.cancel_frame(FrameHandle(999));
        assert!(!queue.has_pending());
    }

    #[test]
    fn requests_during_frame_run_next_frame() {
        let queue = Rc::new(FrameQueue::new());
        let hits = Rc::new(Cell::new(0));

        let q = queue.clone();
        let h = hits.clone();
        queue.request_frame(Box::new(move |_| {
            h.set(h.get() + 1);
            let h2 = h.clone();
            q.request_frame(Box::new(move |_| h2.set(h2.get() + 10)));
        }));

        assert_eq!(queue.run_frame(1.0), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(queue.pending_len(), 1);

        assert_eq!(queue.run_frame(2.0), 1);
        assert_eq!(hits.get(), 11);
    }

    #[test]
    fn cancel_in_flight_callback_prevents_it() {
        let queue = Rc::new(FrameQueue::new());
        let (hits, cb) = counter();

        // First callback cancels the second, which is already in this frame's batch.
        let victim = Rc::new(Cell::new(None));
        let q = queue.clone();
        let v = victim.clone();
        queue.request_frame(Box::new(move |_| {
            if let Some(handle) = v.get() {
                q.cancel_frame(handle);
            }
        }));
        victim.set(Some(queue.request_frame(cb())));

        assert_eq!(queue.run_frame(1.0), 1);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn nested_run_frame_is_ignored() {
        let queue = Rc::new(FrameQueue::new());
        let nested = Rc::new(Cell::new(usize::MAX));
        let q = queue.clone();
        let n = nested.clone();
        queue.request_frame(Box::new(move |t| n.set(q.run_frame(t))));
        queue.run_frame(1.0);
        assert_eq!(nested.get(), 0);
    }

    #[test]
    fn panicking_callback_requeues_rest_of_frame() {
        let queue = Rc::new(FrameQueue::new());
        let (hits, cb) = counter();
        queue.request_frame(Box::new(explode));
        queue.request_frame(cb());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            queue.run_frame(1.0);
        }));
        assert!(result.is_err());
        assert_eq!(hits.get(), 0);
        assert_eq!(queue.pending_len(), 1);

        assert_eq!(queue.run_frame(2.0), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn panic_does_not_requeue_cancelled_callbacks() {
        let queue = Rc::new(FrameQueue::new());
        let (hits, cb) = counter();

        let victim = Rc::new(Cell::new(None));
        let q = queue.clone();
        let v = victim.clone();
        queue.request_frame(Box::new(move |t| {
            if let Some(handle) = v.get() {
                q.cancel_frame(handle);
            }
            explode(t);
        }));
        victim.set(Some(queue.request_frame(cb())));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            queue.run_frame(1.0);
        }));
        assert!(result.is_err());
        assert!(!queue.has_pending());
        assert_eq!(queue.run_frame(2.0), 0);
        assert_eq!(hits.get(), 0);
    }

    // ── FrameRegistration ─────────────────────────────────────────────────

    #[test]
    fn dropping_registration_cancels() {
        let queue = Rc::new(FrameQueue::new());
        let scheduler: Rc<dyn FrameScheduler> = queue.clone();
        let (hits, cb) = counter();

        let reg = FrameRegistration::request(&scheduler, cb());
        assert!(reg.handle().is_some());
        assert!(queue.has_pending());
        drop(reg);

        assert!(!queue.has_pending());
        queue.run_frame(1.0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn fired_registration_does_not_cancel_again() {
        let queue = Rc::new(FrameQueue::new());
        let scheduler: Rc<dyn FrameScheduler> = queue.clone();
        let (hits, cb) = counter();

        let reg = FrameRegistration::request(&scheduler, cb());
        queue.run_frame(1.0);
        reg.fired();
        assert_eq!(hits.get(), 1);
    }
}
