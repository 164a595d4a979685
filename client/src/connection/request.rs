use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::transport::{RequestToken, TransportError};

/// Errors a request can resolve with
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// No acknowledgement arrived within the configured window
    #[error("Request timed out after {waited_ms} ms")]
    Timeout { waited_ms: u64 },

    /// The master answered with the error branch of the ack envelope
    #[error("Master returned an error: {0}")]
    Remote(Value),

    /// The request payload could not be encoded for the wire
    #[error("Request payload could not be encoded: {reason}")]
    Encode { reason: String },

    /// The acknowledged value did not decode into the expected type
    #[error("Response value could not be decoded: {reason}")]
    Decode { reason: String },

    /// The request never left the client
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Outcome slot shared between the connection and the caller's handle.
/// The first resolution wins; a late ack or a late timer fire is ignored.
pub(crate) struct RequestSlot {
    outcome: RefCell<Option<Result<Value, RequestError>>>,
}

impl RequestSlot {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            outcome: RefCell::new(None),
        })
    }

    /// Returns whether this call resolved the slot.
    pub(crate) fn resolve(&self, outcome: Result<Value, RequestError>) -> bool {
        let mut slot = self.outcome.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(outcome);
        true
    }

    fn peek(&self) -> Option<Result<Value, RequestError>> {
        self.outcome.borrow().clone()
    }
}

/// Pending bookkeeping kept by the connection until ack or deadline.
pub(crate) struct PendingRequest {
    pub(crate) slot: Rc<RequestSlot>,
    pub(crate) deadline: Instant,
    pub(crate) waited: Duration,
}

/// Poll-style state of an in-flight request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestResult<T> {
    /// The ack has not arrived and the deadline has not passed.
    Waiting,
    Ok(T),
    Err(RequestError),
}

impl<T> RequestResult<T> {
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting)
    }
}

/// Caller-side handle to one in-flight request, resolved by
/// [`MasterConnection::pump`](crate::MasterConnection::pump). Requests
/// cannot be cancelled; the timeout is the only escape.
pub struct RequestHandle<T> {
    token: RequestToken,
    slot: Rc<RequestSlot>,
    _result: PhantomData<T>,
}

impl<T: DeserializeOwned> RequestHandle<T> {
    pub(crate) fn new(token: RequestToken, slot: Rc<RequestSlot>) -> Self {
        Self {
            token,
            slot,
            _result: PhantomData,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn receive(&self) -> RequestResult<T> {
        match self.slot.peek() {
            None => RequestResult::Waiting,
            Some(Ok(val)) => match serde_json::from_value(val) {
                Ok(decoded) => RequestResult::Ok(decoded),
                Err(err) => RequestResult::Err(RequestError::Decode {
                    reason: err.to_string(),
                }),
            },
            Some(Err(err)) => RequestResult::Err(err),
        }
    }
}
