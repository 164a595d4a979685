//! # Accord Shared
//! Deterministic checked state, actions and the wire catalog shared between
//! accord clients and the master. Everything here must behave
//! byte-identically on both hosts: the checksum of a state is the contract
//! peers use to detect divergence.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod action;
mod checked_state;
mod checksum;
mod messages;
mod reducer;
mod resource_id;

pub use action::{ActionOrPair, CheckedAction, ReconciliatoryActions, StateAction};
pub use checked_state::CheckedState;
pub use checksum::{checksum_of, Checksum, ChecksumError};
pub use messages::{
    AckEnvelope, ClientRecord, CreateClientPayload, CreateResourcePayload, EmitActionPayload,
    FwdActionPush, GetClientPayload, GetResourceStatePayload, MessageKind,
    ReconciliateActionsPush, RemoveClientPayload, ResourceRecord, SubscribeToResourcePayload,
    UnsubscribeFromResourcePayload, FWD_ACTION_CHANNEL, RECONCILIATE_ACTIONS_CHANNEL,
};
pub use reducer::{Reducer, ResourceState};
pub use resource_id::{ResourceIdentifier, ResourceIdentifierError};
