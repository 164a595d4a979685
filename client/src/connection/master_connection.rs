use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Instant;

use log::{info, warn};
use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use accord_shared::{
    AckEnvelope, ClientRecord, CreateClientPayload, GetClientPayload, MessageKind,
    RemoveClientPayload, FWD_ACTION_CHANNEL, RECONCILIATE_ACTIONS_CHANNEL,
};

use crate::{
    client_config::ClientConfig,
    connection::request::{PendingRequest, RequestError, RequestHandle, RequestSlot},
    pubsub::{Emitter, Subscription},
    transport::{RequestToken, Transport, TransportError, TransportEvent},
};

/// Local topic published when the underlying channel comes up.
pub const SOCKET_CONNECT_TOPIC: &str = "_socketConnect";
/// Local topic published when the underlying channel goes down.
pub const SOCKET_DISCONNECT_TOPIC: &str = "_socketDisconnect";

/// Request/acknowledge wrapper around the shared duplex channel.
///
/// One connection carries many concurrent in-flight requests: each gets a
/// correlation token, a one-shot outcome slot and a deadline. Server-pushed
/// broadcasts fan out to topic subscribers. `pump` drives everything —
/// callbacks fire synchronously inside it.
///
/// Pending requests are not replayed after a reconnect; they run into their
/// deadline and resolve with a timeout, and the application decides whether
/// a retry is safe.
pub struct MasterConnection {
    config: ClientConfig,
    user_id: String,
    transport: RefCell<Box<dyn Transport>>,
    pending: RefCell<HashMap<RequestToken, PendingRequest>>,
    used_tokens: RefCell<HashSet<RequestToken>>,
    emitter: Rc<Emitter<Value>>,
}

impl MasterConnection {
    pub fn new(config: ClientConfig, transport: Box<dyn Transport>) -> Self {
        let user_id = config.resolved_user_id();
        Self {
            config,
            user_id,
            transport: RefCell::new(transport),
            pending: RefCell::new(HashMap::new()),
            used_tokens: RefCell::new(HashSet::new()),
            emitter: Rc::new(Emitter::default()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The identity this connection announces to the master.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // Connection management

    pub fn connect(&self) -> Result<(), TransportError> {
        self.transport.borrow_mut().connect()?;
        info!("Connected to master at {:?}", self.config.url);
        self.emitter.publish(SOCKET_CONNECT_TOPIC, &Value::Null);
        Ok(())
    }

    pub fn disconnect(&self) {
        self.transport.borrow_mut().disconnect();
        self.emitter.publish(SOCKET_DISCONNECT_TOPIC, &Value::Null);
    }

    pub fn is_connected(&self) -> bool {
        self.transport.borrow().is_connected()
    }

    // Outgoing requests

    /// Issues `kind` and returns a typed handle to the eventual
    /// acknowledgement.
    pub fn request<P: Serialize, T: DeserializeOwned>(
        &self,
        kind: MessageKind,
        payload: &P,
    ) -> RequestHandle<T> {
        let (token, slot) = match serde_json::to_value(payload) {
            Ok(payload) => self.issue(kind, payload),
            Err(err) => {
                let slot = RequestSlot::new();
                slot.resolve(Err(RequestError::Encode {
                    reason: err.to_string(),
                }));
                (format!("{}:unsent", kind.req()), slot)
            }
        };
        RequestHandle::new(token, slot)
    }

    fn issue(&self, kind: MessageKind, payload: Value) -> (RequestToken, Rc<RequestSlot>) {
        let token = self.allocate_token(kind);
        let slot = RequestSlot::new();
        info!("Sending {} request [{}]", kind.req(), token);

        let sent = self
            .transport
            .borrow_mut()
            .send(kind.req(), payload, Some(token.clone()));
        match sent {
            Ok(()) => {
                self.pending.borrow_mut().insert(
                    token.clone(),
                    PendingRequest {
                        slot: slot.clone(),
                        deadline: Instant::now() + self.config.wait_for_response,
                        waited: self.config.wait_for_response,
                    },
                );
            }
            Err(err) => {
                warn!("Failed to send {} request [{}]: {}", kind.req(), token, err);
                slot.resolve(Err(RequestError::Transport(err)));
            }
        }
        (token, slot)
    }

    /// `"<op>:<5-digit-random>"`, re-rolled until unique for this
    /// connection's lifetime.
    fn allocate_token(&self, kind: MessageKind) -> RequestToken {
        let mut rng = rand::thread_rng();
        loop {
            let token = format!("{}:{:05}", kind.req(), rng.gen_range(0..100_000u32));
            if self.used_tokens.borrow_mut().insert(token.clone()) {
                return token;
            }
        }
    }

    // Incoming traffic

    /// Drives the connection: drains the transport, routes
    /// acknowledgements to their pending slot, fans broadcasts out to topic
    /// subscribers and expires overdue requests.
    pub fn pump(&self) {
        loop {
            let event = self.transport.borrow_mut().receive();
            let Some(event) = event else { break };
            match event {
                TransportEvent::Connected => {
                    self.emitter.publish(SOCKET_CONNECT_TOPIC, &Value::Null);
                }
                TransportEvent::Disconnected => {
                    self.emitter.publish(SOCKET_DISCONNECT_TOPIC, &Value::Null);
                }
                TransportEvent::Ack { token, payload } => self.handle_ack(token, payload),
                TransportEvent::Push { channel, payload } => self.handle_push(&channel, payload),
            }
        }
        self.expire_overdue();
    }

    fn handle_ack(&self, token: RequestToken, payload: Value) {
        let pending = self.pending.borrow_mut().remove(&token);
        let Some(pending) = pending else {
            // Late or unknown ack; its request already resolved.
            warn!("Discarding unexpected ack [{}]", token);
            return;
        };

        let envelope: AckEnvelope = match serde_json::from_value(payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!("Malformed ack envelope [{}]: {}", token, err);
                pending.slot.resolve(Err(RequestError::Decode {
                    reason: err.to_string(),
                }));
                return;
            }
        };

        match envelope.into_result() {
            Ok(val) => {
                info!("Request [{}] resolved: {}", token, val);
                pending.slot.resolve(Ok(val));
            }
            Err(val) => {
                warn!("Request [{}] failed remotely: {}", token, val);
                pending.slot.resolve(Err(RequestError::Remote(val)));
            }
        }
    }

    fn handle_push(&self, channel: &str, payload: Value) {
        if channel == FWD_ACTION_CHANNEL || channel == RECONCILIATE_ACTIONS_CHANNEL {
            self.emitter.publish(channel, &payload);
            return;
        }
        if let Some(kind) = MessageKind::from_res(channel) {
            // Result broadcasts arrive enveloped; errored ones have no
            // correlated awaiter and are dropped.
            match serde_json::from_value::<AckEnvelope>(payload) {
                Ok(envelope) if envelope.ok => self.emitter.publish(kind.res(), &envelope.val),
                Ok(_) => {}
                Err(err) => warn!("Malformed broadcast on {}: {}", channel, err),
            }
            return;
        }
        warn!("Dropping broadcast on unknown channel {}", channel);
    }

    fn expire_overdue(&self) {
        let now = Instant::now();
        let mut expired = Vec::new();
        {
            let mut pending = self.pending.borrow_mut();
            let overdue: Vec<RequestToken> = pending
                .iter()
                .filter(|(_, request)| request.deadline <= now)
                .map(|(token, _)| token.clone())
                .collect();
            for token in overdue {
                if let Some(request) = pending.remove(&token) {
                    expired.push((token, request));
                }
            }
        }
        for (token, request) in expired {
            warn!(
                "Request [{}] timed out after {} ms",
                token,
                request.waited.as_millis()
            );
            request.slot.resolve(Err(RequestError::Timeout {
                waited_ms: request.waited.as_millis() as u64,
            }));
        }
    }

    // Topic subscriptions

    /// Subscribes to a transport-level topic: a message kind's result
    /// broadcasts, the push channels, or the socket lifecycle topics.
    pub fn on(&self, topic: &str, handler: impl Fn(&Value) + 'static) -> Subscription {
        self.emitter.subscribe(topic, handler)
    }

    // Client sessions

    pub fn create_client(&self) -> RequestHandle<ClientRecord> {
        self.request(
            MessageKind::CreateClient,
            &CreateClientPayload {
                user_id: self.user_id.clone(),
            },
        )
    }

    pub fn get_client(&self) -> RequestHandle<ClientRecord> {
        self.request(
            MessageKind::GetClient,
            &GetClientPayload {
                user_id: self.user_id.clone(),
            },
        )
    }

    pub fn remove_client(&self) -> RequestHandle<Value> {
        self.request(
            MessageKind::RemoveClient,
            &RemoveClientPayload {
                user_id: self.user_id.clone(),
            },
        )
    }
}
