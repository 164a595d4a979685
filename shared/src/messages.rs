use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    action::{ActionOrPair, CheckedAction, ReconciliatoryActions},
    checked_state::CheckedState,
    checksum::Checksum,
    resource_id::ResourceIdentifier,
};

/// Channel for master-relayed peer actions (server push, no ack).
pub const FWD_ACTION_CHANNEL: &str = "fwdAction";
/// Channel for master-ordered reconciliation batches (server push, no ack).
pub const RECONCILIATE_ACTIONS_CHANNEL: &str = "reconciliateActions";

/// Every request the client can issue to the master. Each kind owns a
/// request channel and a response channel on the wire; for this catalog the
/// two share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    CreateResource,
    GetResourceState,
    EmitAction,
    SubscribeToResource,
    UnsubscribeFromResource,
    CreateClient,
    GetClient,
    RemoveClient,
}

impl MessageKind {
    pub const ALL: [MessageKind; 8] = [
        MessageKind::CreateResource,
        MessageKind::GetResourceState,
        MessageKind::EmitAction,
        MessageKind::SubscribeToResource,
        MessageKind::UnsubscribeFromResource,
        MessageKind::CreateClient,
        MessageKind::GetClient,
        MessageKind::RemoveClient,
    ];

    /// Channel the request goes out on.
    pub fn req(&self) -> &'static str {
        match self {
            MessageKind::CreateResource => "createResource",
            MessageKind::GetResourceState => "getResourceState",
            MessageKind::EmitAction => "emitAction",
            MessageKind::SubscribeToResource => "subscribeToResource",
            MessageKind::UnsubscribeFromResource => "unsubscribeFromResource",
            MessageKind::CreateClient => "createClient",
            MessageKind::GetClient => "getClient",
            MessageKind::RemoveClient => "removeClient",
        }
    }

    /// Channel the master answers or broadcasts results on.
    pub fn res(&self) -> &'static str {
        self.req()
    }

    /// Looks a result-broadcast channel back up to its kind.
    pub fn from_res(channel: &str) -> Option<MessageKind> {
        MessageKind::ALL.into_iter().find(|kind| kind.res() == channel)
    }
}

// Request payloads

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourcePayload<S> {
    pub resource_type: String,
    pub resource_state: S,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResourceStatePayload {
    pub rid: ResourceIdentifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitActionPayload<A> {
    pub rid: ResourceIdentifier,
    pub action: ActionOrPair<A>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeToResourcePayload {
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeFromResourcePayload {
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetClientPayload {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveClientPayload {
    pub user_id: String,
}

// Acknowledgement values

/// Master's record of a created resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord<S> {
    pub rid: ResourceIdentifier,
    pub state: CheckedState<S>,
}

/// Master's record of a client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub user_id: String,
}

// Server-push payloads

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FwdActionPush<A> {
    pub rid: ResourceIdentifier,
    pub action: A,
    pub checksum: Checksum,
}

impl<A> FwdActionPush<A> {
    pub fn into_parts(self) -> (ResourceIdentifier, CheckedAction<A>) {
        (
            self.rid,
            CheckedAction {
                action: self.action,
                checksum: self.checksum,
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliateActionsPush<A> {
    pub rid: ResourceIdentifier,
    pub actions: Vec<CheckedAction<A>>,
    pub final_checksum: Checksum,
}

impl<A> ReconciliateActionsPush<A> {
    pub fn into_parts(self) -> (ResourceIdentifier, ReconciliatoryActions<A>) {
        (
            self.rid,
            ReconciliatoryActions {
                actions: self.actions,
                final_checksum: self.final_checksum,
            },
        )
    }
}

/// The `{ok, val}` wrapper every acknowledgement arrives in. `val` carries
/// the result on success and the error payload otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckEnvelope {
    pub ok: bool,
    #[serde(default)]
    pub val: Value,
}

impl AckEnvelope {
    pub fn ok(val: Value) -> Self {
        Self { ok: true, val }
    }

    pub fn err(val: Value) -> Self {
        Self { ok: false, val }
    }

    pub fn into_result(self) -> Result<Value, Value> {
        if self.ok {
            Ok(self.val)
        } else {
            Err(self.val)
        }
    }
}
