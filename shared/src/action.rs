use std::fmt::Debug;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::checksum::Checksum;

/// Bound alias for action payloads: actions form a user-defined sum type
/// that crosses the wire as JSON.
pub trait StateAction: Serialize + DeserializeOwned + Clone + Debug + 'static {}

impl<T> StateAction for T where T: Serialize + DeserializeOwned + Clone + Debug + 'static {}

/// A single public action, or a `[private, public]` pair.
///
/// Private actions never leave the dispatching peer: the local reducer
/// applies the private half while the master broadcasts only the public
/// half to everyone else. On the wire a single action serializes as itself
/// and a pair as a two-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionOrPair<A> {
    Public(A),
    Paired(A, A),
}

impl<A> ActionOrPair<A> {
    pub fn paired(private: A, public: A) -> Self {
        Self::Paired(private, public)
    }

    /// The half the dispatching peer applies locally.
    pub fn local(&self) -> &A {
        match self {
            Self::Public(action) => action,
            Self::Paired(private, _) => private,
        }
    }

    /// The half every other peer is allowed to see.
    pub fn public(&self) -> &A {
        match self {
            Self::Public(action) => action,
            Self::Paired(_, public) => public,
        }
    }

    pub fn is_paired(&self) -> bool {
        matches!(self, Self::Paired(..))
    }
}

/// An action accompanied by the checksum the authoritative sender computed
/// after applying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedAction<A> {
    pub action: A,
    pub checksum: Checksum,
}

/// An ordered batch of master-authoritative actions, adopted atomically
/// against `final_checksum`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliatoryActions<A> {
    pub actions: Vec<CheckedAction<A>>,
    pub final_checksum: Checksum,
}
