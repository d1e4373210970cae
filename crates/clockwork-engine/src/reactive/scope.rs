use std::cell::{Cell, RefCell};
use std::fmt;

type Cleanup = Box<dyn FnOnce()>;

/// Teardown registration point for whatever owns a set of timers.
///
/// Cleanups run in reverse registration order, exactly once, either on an
/// explicit [`teardown`](Scope::teardown) or when the scope is dropped,
/// whichever comes first. Unwinding through the owner drops the scope too,
/// so registered cleanups run on every exit path.
#[derive(Default)]
pub struct Scope {
    cleanups: RefCell<Vec<Cleanup>>,
    torn_down: Cell<bool>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `cleanup`. On a scope that is already torn down it runs
    /// immediately.
    pub fn on_teardown(&self, cleanup: impl FnOnce() + 'static) {
        if self.torn_down.get() {
            log::debug!("scope already torn down; running cleanup immediately");
            cleanup();
            return;
        }
        self.cleanups.borrow_mut().push(Box::new(cleanup));
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.borrow().len()
    }

    pub fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        // Cleanups may register further cleanups; those run immediately
        // because `torn_down` is already set.
        let cleanups = std::mem::take(&mut *self.cleanups.borrow_mut());
        log::debug!("tearing down scope ({} cleanup(s))", cleanups.len());
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("cleanups", &self.cleanups.borrow().len())
            .field("torn_down", &self.torn_down.get())
            .finish()
    }
}
