use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Token returned by [`Observable::subscribe`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

type Observer<T> = Rc<dyn Fn(&T)>;

/// Single-threaded value cell with change notification.
///
/// Observers run synchronously inside `set`, after the new value is stored,
/// and may freely read this or any other cell. They may also subscribe or
/// unsubscribe; such changes take effect from the next notification.
pub struct Observable<T> {
    value: RefCell<T>,
    observers: RefCell<Vec<(SubscriptionId, Observer<T>)>>,
    next_id: Cell<u64>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            observers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Borrows the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Runs every observer against a snapshot of the current value.
    ///
    /// No borrow is held while observers run, so they may set this cell
    /// again; that nested `set` notifies before the outer loop continues.
    pub fn notify(&self) {
        let observers: Vec<Observer<T>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, o)| Rc::clone(o))
            .collect();
        if observers.is_empty() {
            return;
        }

        let value = self.get();
        for observer in observers {
            observer(&value);
        }
    }
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Stores `value` and notifies observers if it differs from the current one.
    pub fn set(&self, value: T) -> bool {
        let changed = self.store(value);
        if changed {
            self.notify();
        }
        changed
    }

    /// Stores `value` without notifying. Returns whether it changed.
    ///
    /// Used to update several cells as one unit before any observer runs.
    pub fn store(&self, value: T) -> bool {
        let mut slot = self.value.borrow_mut();
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.value.borrow())
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        (log, move |v: &T| l.borrow_mut().push(v.clone()))
    }

    #[test]
    fn set_notifies_on_change_only() {
        let cell = Observable::new(1);
        let (seen, obs) = recorder();
        cell.subscribe(obs);

        assert!(cell.set(2));
        assert!(!cell.set(2));
        assert!(cell.set(3));

        assert_eq!(*seen.borrow(), vec![2, 3]);
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn store_is_silent_until_notify() {
        let cell = Observable::new(String::new());
        let (seen, obs) = recorder();
        cell.subscribe(obs);

        assert!(cell.store("a".to_string()));
        assert!(seen.borrow().is_empty());

        cell.notify();
        assert_eq!(*seen.borrow(), vec!["a".to_string()]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let cell = Observable::new(0);
        let (seen, obs) = recorder();
        let id = cell.subscribe(obs);

        cell.set(1);
        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));
        cell.set(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(cell.observer_count(), 0);
    }

    #[test]
    fn observer_can_read_cell_and_subscribe() {
        let cell = Rc::new(Observable::new(0));
        let reads = Rc::new(Cell::new(0));

        let c = cell.clone();
        let r = reads.clone();
        cell.subscribe(move |v| {
            assert_eq!(c.get(), *v);
            r.set(r.get() + 1);
            c.subscribe(|_| {});
        });

        cell.set(5);
        assert_eq!(reads.get(), 1);
        assert_eq!(cell.observer_count(), 2);
    }

    #[test]
    fn observer_may_set_same_cell() {
        let cell = Rc::new(Observable::new(0));
        let c = cell.clone();
        cell.subscribe(move |v| {
            if *v > 10 {
                c.set(10);
            }
        });

        cell.set(42);
        assert_eq!(cell.get(), 10);
    }

    #[test]
    fn with_borrows_without_clone() {
        let cell = Observable::new(vec![1, 2, 3]);
        assert_eq!(cell.with(|v| v.len()), 3);
    }
}
