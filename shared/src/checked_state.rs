use serde::{Deserialize, Serialize};

use crate::checksum::{checksum_of, Checksum, ChecksumError};

/// The unit of peer-observable value: a state paired with the checksum of
/// its canonical serialization. Serializes as the two-element array
/// `[state, checksum]`, matching the wire form the master emits.
///
/// Invariant: `checksum == checksum_of(state)` at all times a reader
/// observes it. Construct through [`CheckedState::compute`] to keep it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedState<S>(S, Checksum);

impl<S> CheckedState<S> {
    pub fn state(&self) -> &S {
        &self.0
    }

    pub fn checksum(&self) -> &Checksum {
        &self.1
    }

    pub fn into_state(self) -> S {
        self.0
    }
}

impl<S: Serialize> CheckedState<S> {
    /// Pairs `state` with its freshly computed checksum.
    pub fn compute(state: S) -> Result<Self, ChecksumError> {
        let checksum = checksum_of(&state)?;
        Ok(Self(state, checksum))
    }
}
