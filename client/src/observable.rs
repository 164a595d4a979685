use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::pubsub::Subscription;

/// Single-value holder with subscribe-on-change semantics.
///
/// `update` compares structurally (`PartialEq`): an equal value is a no-op.
/// When the value differs, every subscriber is invoked synchronously in
/// subscription order; subscribers registered during that fan-out do not
/// fire for the same update.
pub struct Observable<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(u64, Rc<dyn Fn(&T)>)>>,
    next_id: Cell<u64>,
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    pub fn update(&self, next: T) {
        if *self.value.borrow() == next {
            return;
        }
        *self.value.borrow_mut() = next.clone();

        let snapshot: Vec<Rc<dyn Fn(&T)>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, subscriber)| subscriber.clone())
            .collect();
        for subscriber in snapshot {
            subscriber(&next);
        }
    }

    pub fn on_update(self: &Rc<Self>, subscriber: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));

        let observable = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(observable) = observable.upgrade() {
                observable
                    .subscribers
                    .borrow_mut()
                    .retain(|(subscriber_id, _)| *subscriber_id != id);
            }
        })
    }

    /// Drops every subscriber without invoking them.
    pub fn clear_subscribers(&self) {
        self.subscribers.borrow_mut().clear();
    }
}
