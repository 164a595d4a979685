//! # Accord Client
//! Client-side runtime of the accord distributed-state core: optimistic
//! reducer dispatch over observables, checksum-verified reconciliation
//! against the master, and the request/acknowledge wrapper over the shared
//! duplex transport.
//!
//! The runtime is single-threaded and cooperative. Local dispatch is
//! synchronous; the only suspension points are request/ack round-trips,
//! surfaced as poll-style handles resolved by
//! [`MasterConnection::pump`].

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use accord_shared as shared;

mod client_config;
mod connection;
mod dispatcher;
mod observable;
mod pubsub;
mod resource;
mod transport;

pub use client_config::{ClientConfig, DEFAULT_WAIT_FOR_RESPONSE};
pub use connection::{
    MasterConnection, RequestError, RequestHandle, RequestResult, ResourceConnection,
    SOCKET_CONNECT_TOPIC, SOCKET_DISCONNECT_TOPIC,
};
pub use dispatcher::{DispatchedEvent, Dispatcher};
pub use observable::Observable;
pub use pubsub::{Emitter, Subscription};
pub use resource::{ClientResource, ResourceError};
pub use transport::{
    ChannelTransport, MasterEndpoint, OutboundMessage, RequestToken, Transport, TransportError,
    TransportEvent,
};
