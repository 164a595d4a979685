mod channel;

pub use channel::{ChannelTransport, MasterEndpoint, OutboundMessage};

use serde_json::Value;
use thiserror::Error;

/// Correlation token carried by a request and echoed by its
/// acknowledgement.
pub type RequestToken = String;

/// Errors that can occur at the transport boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The channel is not currently connected
    #[error("Transport is not connected")]
    NotConnected,

    /// The remote end of the channel has gone away
    #[error("Transport channel closed")]
    ChannelClosed,
}

/// One inbound event drained from the channel.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    /// Acknowledgement correlated to an earlier `send` that carried
    /// `token`.
    Ack { token: RequestToken, payload: Value },
    /// Server-pushed broadcast on a named channel.
    Push { channel: String, payload: Value },
}

/// A duplex message channel to the master.
///
/// `send` with a token asks the remote end to acknowledge on that token;
/// inbound traffic is drained by polling `receive`. The concrete network
/// library lives behind this seam — the crate only ships the in-memory
/// [`ChannelTransport`].
pub trait Transport {
    fn connect(&mut self) -> Result<(), TransportError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    fn send(
        &mut self,
        channel: &str,
        payload: Value,
        ack_token: Option<RequestToken>,
    ) -> Result<(), TransportError>;

    /// Receives the next pending event from the channel, if any.
    fn receive(&mut self) -> Option<TransportEvent>;
}
