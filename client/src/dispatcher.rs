use std::cell::RefCell;
use std::rc::Rc;

use accord_shared::{ActionOrPair, CheckedState, ChecksumError, Reducer};

use crate::observable::Observable;

/// Emitted after a successful local dispatch.
///
/// The action keeps its tuple shape so the outer binding can forward the
/// pair to the master, which broadcasts the public half only.
#[derive(Debug, Clone)]
pub struct DispatchedEvent<S, A> {
    pub action: ActionOrPair<A>,
    pub next: CheckedState<S>,
    pub prev: CheckedState<S>,
}

/// Binds a reducer to an observable of checked state: turns an incoming
/// action (or `[private, public]` pair) into a state update plus a
/// dispatched event.
pub struct Dispatcher<R: Reducer> {
    observable: Rc<Observable<CheckedState<R::State>>>,
    reducer: Rc<R>,
    on_dispatched: RefCell<Option<Box<dyn Fn(DispatchedEvent<R::State, R::Action>)>>>,
}

impl<R: Reducer> Dispatcher<R> {
    pub fn new(
        observable: Rc<Observable<CheckedState<R::State>>>,
        reducer: Rc<R>,
        on_dispatched: impl Fn(DispatchedEvent<R::State, R::Action>) + 'static,
    ) -> Self {
        Self {
            observable,
            reducer,
            on_dispatched: RefCell::new(Some(Box::new(on_dispatched))),
        }
    }

    /// Applies the local half of `action`, updates the observable, then
    /// emits the dispatched event (fallible version).
    pub fn try_dispatch(
        &self,
        action: ActionOrPair<R::Action>,
    ) -> Result<CheckedState<R::State>, ChecksumError> {
        let prev = self.observable.get();
        let next = CheckedState::compute(self.reducer.reduce(prev.state(), action.local()))?;
        self.observable.update(next.clone());
        if let Some(on_dispatched) = self.on_dispatched.borrow().as_ref() {
            on_dispatched(DispatchedEvent {
                action,
                next: next.clone(),
                prev,
            });
        }
        Ok(next)
    }

    /// Applies the local half of `action` and updates the observable
    pub fn dispatch(&self, action: ActionOrPair<R::Action>) -> CheckedState<R::State> {
        self.try_dispatch(action)
            .expect("Resource state must stay canonically serializable! Cannot dispatch.")
    }

    /// Applies the local half of `action` without emitting a dispatched
    /// event.
    pub fn try_apply(
        &self,
        action: &ActionOrPair<R::Action>,
    ) -> Result<CheckedState<R::State>, ChecksumError> {
        let prev = self.observable.get();
        let next = CheckedState::compute(self.reducer.reduce(prev.state(), action.local()))?;
        self.observable.update(next.clone());
        Ok(next)
    }

    /// Detaches the dispatched-event sink; state updates keep working.
    pub fn unsubscribe(&self) {
        self.on_dispatched.borrow_mut().take();
    }
}
