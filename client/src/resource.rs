use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;
use thiserror::Error;

use accord_shared::{
    ActionOrPair, CheckedAction, CheckedState, Checksum, ChecksumError, ReconciliatoryActions,
    Reducer,
};

use crate::{
    dispatcher::{DispatchedEvent, Dispatcher},
    observable::Observable,
    pubsub::{Emitter, Subscription},
};

/// Errors that can occur while operating a client resource
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// Operation on a resource after `destroy()`
    #[error("Resource has already been destroyed")]
    AlreadyDestroyed,

    /// Reconciliation produced a different digest than the master announced
    #[error("Checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch {
        expected: Checksum,
        actual: Checksum,
    },

    /// The state stopped being canonically serializable
    #[error(transparent)]
    State(#[from] ChecksumError),
}

const DISPATCHED_TOPIC: &str = "dispatched";

/// Owns one observable of checked state for one logical resource instance.
///
/// Local dispatches are optimistic: the reducer runs immediately and
/// subscribers see the new checked state before the master has echoed the
/// action. Reconciliation is explicit — the outer binding feeds
/// master-authoritative actions into `reconciliate_action` /
/// `reconciliate_actions`, and a checksum mismatch is reported without
/// touching local state so the binding can refresh from the master.
pub struct ClientResource<R: Reducer> {
    observable: Rc<Observable<CheckedState<R::State>>>,
    reducer: Rc<R>,
    dispatcher: Dispatcher<R>,
    dispatched: Rc<Emitter<DispatchedEvent<R::State, R::Action>>>,
    teardowns: RefCell<Vec<Subscription>>,
    destroyed: Cell<bool>,
}

impl<R: Reducer> ClientResource<R> {
    /// Creates a resource starting from the reducer's initial state
    /// (fallible version).
    pub fn try_new(reducer: R) -> Result<Self, ChecksumError> {
        let initial = reducer.initial_state();
        Self::try_with_state(reducer, initial)
    }

    /// Creates a resource starting from the reducer's initial state.
    pub fn new(reducer: R) -> Self {
        Self::try_new(reducer)
            .expect("Initial state must be canonically serializable! Cannot create resource.")
    }

    /// Creates a resource starting from an explicit state (fallible
    /// version).
    pub fn try_with_state(reducer: R, state: R::State) -> Result<Self, ChecksumError> {
        let observable = Rc::new(Observable::new(CheckedState::compute(state)?));
        let reducer = Rc::new(reducer);
        let dispatched: Rc<Emitter<DispatchedEvent<R::State, R::Action>>> =
            Rc::new(Emitter::default());

        let sink = dispatched.clone();
        let dispatcher = Dispatcher::new(observable.clone(), reducer.clone(), move |event| {
            sink.publish(DISPATCHED_TOPIC, &event);
        });

        let teardowns = vec![
            Subscription::new({
                let observable = observable.clone();
                move || observable.clear_subscribers()
            }),
            Subscription::new({
                let dispatched = dispatched.clone();
                move || dispatched.clear()
            }),
        ];

        Ok(Self {
            observable,
            reducer,
            dispatcher,
            dispatched,
            teardowns: RefCell::new(teardowns),
            destroyed: Cell::new(false),
        })
    }

    /// Creates a resource starting from an explicit state.
    pub fn with_state(reducer: R, state: R::State) -> Self {
        Self::try_with_state(reducer, state)
            .expect("Initial state must be canonically serializable! Cannot create resource.")
    }

    fn guard(&self) -> Result<(), ResourceError> {
        if self.destroyed.get() {
            Err(ResourceError::AlreadyDestroyed)
        } else {
            Ok(())
        }
    }

    // Local dispatch

    /// Dispatches a single public action (fallible version).
    pub fn try_dispatch(&self, action: R::Action) -> Result<(), ResourceError> {
        self.guard()?;
        self.dispatcher.try_dispatch(ActionOrPair::Public(action))?;
        Ok(())
    }

    /// Dispatches a single public action.
    pub fn dispatch(&self, action: R::Action) {
        self.try_dispatch(action)
            .expect("Resource must be live and its state serializable! Cannot dispatch.")
    }

    /// Dispatches a `[private, public]` pair: the private half is applied
    /// locally, the public half is what peers get to see (fallible
    /// version).
    pub fn try_dispatch_private(
        &self,
        private: R::Action,
        public: R::Action,
    ) -> Result<(), ResourceError> {
        self.guard()?;
        self.dispatcher
            .try_dispatch(ActionOrPair::paired(private, public))?;
        Ok(())
    }

    /// Dispatches a `[private, public]` pair.
    pub fn dispatch_private(&self, private: R::Action, public: R::Action) {
        self.try_dispatch_private(private, public)
            .expect("Resource must be live and its state serializable! Cannot dispatch.")
    }

    /// Applies an action synchronously and returns the new checked state.
    /// No dispatched event is emitted (fallible version).
    pub fn try_apply_action(
        &self,
        action: ActionOrPair<R::Action>,
    ) -> Result<CheckedState<R::State>, ResourceError> {
        self.guard()?;
        Ok(self.dispatcher.try_apply(&action)?)
    }

    /// Applies an action synchronously and returns the new checked state.
    pub fn apply_action(&self, action: ActionOrPair<R::Action>) -> CheckedState<R::State> {
        self.try_apply_action(action)
            .expect("Resource must be live and its state serializable! Cannot apply action.")
    }

    // Reconciliation

    /// Adopts one master-authoritative action: computes the next checked
    /// state from the action and byte-compares its checksum against the
    /// expected one. On mismatch the observable is left untouched.
    pub fn reconciliate_action(
        &self,
        checked: &CheckedAction<R::Action>,
    ) -> Result<CheckedState<R::State>, ResourceError> {
        self.guard()?;
        let current = self.observable.get();
        let next = CheckedState::compute(self.reducer.reduce(current.state(), &checked.action))?;
        if next.checksum() != &checked.checksum {
            warn!(
                "Reconciliation diverged: expected checksum {}, computed {}",
                checked.checksum,
                next.checksum()
            );
            return Err(ResourceError::ChecksumMismatch {
                expected: checked.checksum.clone(),
                actual: next.checksum().clone(),
            });
        }
        self.observable.update(next.clone());
        Ok(next)
    }

    /// Adopts an ordered batch of master-authoritative actions atomically:
    /// the batch is applied on a scratch state and verified against the
    /// final checksum before the observable sees anything.
    pub fn reconciliate_actions(
        &self,
        batch: &ReconciliatoryActions<R::Action>,
    ) -> Result<CheckedState<R::State>, ResourceError> {
        self.guard()?;
        let mut state = self.observable.get().into_state();
        for checked in &batch.actions {
            state = self.reducer.reduce(&state, &checked.action);
        }
        let next = CheckedState::compute(state)?;
        if next.checksum() != &batch.final_checksum {
            warn!(
                "Reconciliation batch of {} diverged: expected checksum {}, computed {}",
                batch.actions.len(),
                batch.final_checksum,
                next.checksum()
            );
            return Err(ResourceError::ChecksumMismatch {
                expected: batch.final_checksum.clone(),
                actual: next.checksum().clone(),
            });
        }
        self.observable.update(next.clone());
        Ok(next)
    }

    // Subscriptions

    pub fn on_updated(
        &self,
        subscriber: impl Fn(&CheckedState<R::State>) + 'static,
    ) -> Result<Subscription, ResourceError> {
        self.guard()?;
        Ok(self.observable.on_update(subscriber))
    }

    pub fn on_dispatched(
        &self,
        subscriber: impl Fn(&DispatchedEvent<R::State, R::Action>) + 'static,
    ) -> Result<Subscription, ResourceError> {
        self.guard()?;
        Ok(self.dispatched.subscribe(DISPATCHED_TOPIC, subscriber))
    }

    // Reads & direct replacement

    pub fn get(&self) -> Result<CheckedState<R::State>, ResourceError> {
        self.guard()?;
        Ok(self.observable.get())
    }

    pub fn get_unchecked_state(&self) -> Result<R::State, ResourceError> {
        self.guard()?;
        Ok(self.observable.get().into_state())
    }

    /// Replaces the held state wholesale. The supplied digest is discarded
    /// and recomputed (fallible version).
    pub fn try_update(&self, next: CheckedState<R::State>) -> Result<(), ResourceError> {
        self.try_update_unchecked_state(next.into_state())
    }

    /// Replaces the held state wholesale, recomputing the checksum.
    pub fn update(&self, next: CheckedState<R::State>) {
        self.try_update(next)
            .expect("Resource must be live and its state serializable! Cannot update.")
    }

    /// Replaces the held state from a bare value, recomputing the checksum
    /// (fallible version).
    pub fn try_update_unchecked_state(&self, next: R::State) -> Result<(), ResourceError> {
        self.guard()?;
        self.observable.update(CheckedState::compute(next)?);
        Ok(())
    }

    /// Replaces the held state from a bare value, recomputing the checksum.
    pub fn update_unchecked_state(&self, next: R::State) {
        self.try_update_unchecked_state(next)
            .expect("Resource must be live and its state serializable! Cannot update.")
    }

    // Teardown

    /// Runs every registered teardown exactly once and drops all
    /// subscribers. Subsequent calls are no-ops; any other operation on a
    /// destroyed resource fails with `AlreadyDestroyed`.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.dispatcher.unsubscribe();
        for teardown in self.teardowns.borrow_mut().drain(..) {
            teardown.unsubscribe();
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}
