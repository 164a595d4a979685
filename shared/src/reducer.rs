use std::fmt::Debug;

use serde::Serialize;

use crate::action::StateAction;

/// Bound alias for reducer states: canonically serializable (for the
/// checksum) and structurally comparable (for change detection).
pub trait ResourceState: Serialize + Clone + PartialEq + Debug + 'static {}

impl<T> ResourceState for T where T: Serialize + Clone + PartialEq + Debug + 'static {}

/// The pure transition seam every resource is built around.
///
/// `reduce` must be deterministic: equal `(state, action)` inputs produce
/// canonically equal outputs on every peer, which is what makes checksum
/// comparison a divergence detector. Reducers never perform IO; a panic
/// inside `reduce` propagates uncaught to the dispatching caller.
pub trait Reducer {
    type State: ResourceState;
    type Action: StateAction;

    /// The state a resource starts from when created without one.
    fn initial_state(&self) -> Self::State;

    fn reduce(&self, state: &Self::State, action: &Self::Action) -> Self::State;
}
