use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::Value;

use super::{RequestToken, Transport, TransportError, TransportEvent};

/// One message traveling client → master.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub channel: String,
    pub payload: Value,
    pub ack_token: Option<RequestToken>,
}

struct Shared {
    to_master: RefCell<VecDeque<OutboundMessage>>,
    to_client: RefCell<VecDeque<TransportEvent>>,
    connected: Cell<bool>,
}

/// In-memory duplex channel: the client side implements [`Transport`], the
/// paired [`MasterEndpoint`] plays the master. Used by tests and local
/// simulation; no network I/O.
pub struct ChannelTransport {
    shared: Rc<Shared>,
}

/// Master-side handle of a [`ChannelTransport`] pair.
pub struct MasterEndpoint {
    shared: Rc<Shared>,
}

impl ChannelTransport {
    pub fn pair() -> (ChannelTransport, MasterEndpoint) {
        let shared = Rc::new(Shared {
            to_master: RefCell::new(VecDeque::new()),
            to_client: RefCell::new(VecDeque::new()),
            connected: Cell::new(false),
        });
        (
            ChannelTransport {
                shared: shared.clone(),
            },
            MasterEndpoint { shared },
        )
    }
}

impl Transport for ChannelTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.shared.connected.set(true);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.shared.connected.set(false);
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.get()
    }

    fn send(
        &mut self,
        channel: &str,
        payload: Value,
        ack_token: Option<RequestToken>,
    ) -> Result<(), TransportError> {
        if !self.shared.connected.get() {
            return Err(TransportError::NotConnected);
        }
        self.shared.to_master.borrow_mut().push_back(OutboundMessage {
            channel: channel.to_string(),
            payload,
            ack_token,
        });
        Ok(())
    }

    fn receive(&mut self) -> Option<TransportEvent> {
        self.shared.to_client.borrow_mut().pop_front()
    }
}

impl MasterEndpoint {
    /// Drains every request the client has sent since the last call.
    pub fn drain_requests(&self) -> Vec<OutboundMessage> {
        self.shared.to_master.borrow_mut().drain(..).collect()
    }

    /// Acknowledges `token` with an envelope payload. Dropped while the
    /// channel is down, like a real socket.
    pub fn ack(&self, token: &str, payload: Value) {
        if !self.shared.connected.get() {
            return;
        }
        self.shared.to_client.borrow_mut().push_back(TransportEvent::Ack {
            token: token.to_string(),
            payload,
        });
    }

    /// Pushes a broadcast to the client on `channel`.
    pub fn push(&self, channel: &str, payload: Value) {
        if !self.shared.connected.get() {
            return;
        }
        self.shared
            .to_client
            .borrow_mut()
            .push_back(TransportEvent::Push {
                channel: channel.to_string(),
                payload,
            });
    }

    /// Simulates the channel dropping out from under the client.
    pub fn drop_connection(&self) {
        if self.shared.connected.replace(false) {
            self.shared
                .to_client
                .borrow_mut()
                .push_back(TransportEvent::Disconnected);
        }
    }

    /// Simulates the underlying transport auto-reconnecting.
    pub fn restore_connection(&self) {
        if !self.shared.connected.replace(true) {
            self.shared
                .to_client
                .borrow_mut()
                .push_back(TransportEvent::Connected);
        }
    }
}
