//! Minimal synchronous pub-sub used for cross-component state.
//!
//! Every `notify` immediately invokes all subscribers with the current value;
//! there is no batching. Subscribers may read or write other stores, and may
//! even write this one: the value and the subscriber list are cloned out of
//! their cells before any callback runs.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

pub type Subscriber<T> = Rc<dyn Fn(&T)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct StoreInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
    next_id: Cell<u64>,
}

/// A shared, observable value. Clones share the same state.
pub struct Store<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T: Clone + 'static> Store<T> {
    pub fn provide(value: T) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Reads the value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replaces the value and notifies
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.notify();
    }

    /// Mutates the value in place and notifies
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.notify();
    }

    /// Replaces the value without notifying; pair with a later `notify`
    pub fn set_silently(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    pub fn notify(&self) {
        let value = self.get();
        let subscribers: Vec<Subscriber<T>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in subscribers {
            callback(&value);
        }
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::provide(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}
