//! Current-value cells with change notification.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Handler<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: RefCell<T>,
    handlers: RefCell<Vec<(u64, Handler<T>)>>,
    next_id: Cell<u64>,
}

/// A value that can be read synchronously and watched for changes.
///
/// Cloning shares the same cell.
pub struct Observable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.handlers.borrow().len())
            .finish()
    }
}

impl<T: Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                handlers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Register `handler`; it runs on every change until the returned
    /// subscription is dropped or unsubscribed.
    pub fn subscribe(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.handlers.borrow_mut().push((id, Rc::new(handler)));

        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.handlers.borrow_mut().retain(|(h, _)| *h != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Store `value`, notifying subscribers when it differs from the current one.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        if *self.inner.value.borrow() == value {
            return false;
        }
        *self.inner.value.borrow_mut() = value.clone();

        // Handlers may subscribe or unsubscribe while being notified.
        let handlers: Vec<Handler<T>> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(&value);
        }
        true
    }
}

/// Handle to an active subscription. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a cancellation callback.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
