use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Handle to one registered callback.
///
/// `unsubscribe` is idempotent; dropping the handle without calling it
/// leaves the callback registered.
pub struct Subscription {
    cancel: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Cell::new(Some(Box::new(cancel))),
        }
    }

    pub fn unsubscribe(&self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

type TopicHandlers<T> = Vec<(u64, Rc<dyn Fn(&T)>)>;

/// Topic-keyed fan-out registry.
///
/// Each owning component keeps its own emitter; there are no global
/// registries. Handlers fire synchronously in subscription order.
pub struct Emitter<T> {
    topics: RefCell<HashMap<String, TopicHandlers<T>>>,
    next_id: Cell<u64>,
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self {
            topics: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<T: 'static> Emitter<T> {
    pub fn subscribe(self: &Rc<Self>, topic: &str, handler: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.topics
            .borrow_mut()
            .entry(topic.to_string())
            .or_default()
            .push((id, Rc::new(handler)));

        let emitter = Rc::downgrade(self);
        let topic = topic.to_string();
        Subscription::new(move || {
            if let Some(emitter) = emitter.upgrade() {
                let mut topics = emitter.topics.borrow_mut();
                if let Some(handlers) = topics.get_mut(&topic) {
                    handlers.retain(|(handler_id, _)| *handler_id != id);
                    if handlers.is_empty() {
                        topics.remove(&topic);
                    }
                }
            }
        })
    }

    /// Invokes every handler registered for `topic` at the moment of the
    /// call. Handlers registered during the fan-out do not see this publish.
    pub fn publish(&self, topic: &str, value: &T) {
        let snapshot: Vec<Rc<dyn Fn(&T)>> = match self.topics.borrow().get(topic) {
            Some(handlers) => handlers.iter().map(|(_, handler)| handler.clone()).collect(),
            None => return,
        };
        for handler in snapshot {
            handler(value);
        }
    }

    /// Drops every handler on every topic without invoking them.
    pub fn clear(&self) {
        self.topics.borrow_mut().clear();
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .borrow()
            .get(topic)
            .map(Vec::len)
            .unwrap_or(0)
    }
}
