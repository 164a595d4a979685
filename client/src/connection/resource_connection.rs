use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use accord_shared::{
    ActionOrPair, CheckedAction, CheckedState, CreateResourcePayload, EmitActionPayload,
    FwdActionPush, GetResourceStatePayload, MessageKind, ReconciliateActionsPush,
    ReconciliatoryActions, ResourceIdentifier, ResourceRecord, ResourceState, StateAction,
    SubscribeToResourcePayload, UnsubscribeFromResourcePayload, FWD_ACTION_CHANNEL,
    RECONCILIATE_ACTIONS_CHANNEL,
};

use crate::{
    connection::{master_connection::MasterConnection, request::RequestHandle},
    pubsub::{Emitter, Subscription},
};

/// Topic scoping one resource identifier inside a connection's registries.
fn rid_topic(rid: &ResourceIdentifier) -> String {
    format!("rid:{}", rid)
}

/// Per-resource-type multiplexer over the shared master connection.
///
/// Filters master-pushed `fwdAction` / `reconciliateActions` events by
/// resource type and re-dispatches the survivors per resource identifier.
/// Several resource connections share one transport; each holds its own
/// pair of transport subscriptions, so destroying one leaves the others
/// untouched.
pub struct ResourceConnection<S, A> {
    resource_type: String,
    connection: Rc<MasterConnection>,
    fwd_actions: Rc<Emitter<CheckedAction<A>>>,
    reconciliations: Rc<Emitter<ReconciliatoryActions<A>>>,
    transport_subs: RefCell<Vec<Subscription>>,
    _state: PhantomData<S>,
}

impl<S, A> ResourceConnection<S, A>
where
    S: ResourceState + DeserializeOwned,
    A: StateAction,
{
    pub fn new(resource_type: &str, connection: Rc<MasterConnection>) -> Self {
        let fwd_actions: Rc<Emitter<CheckedAction<A>>> = Rc::new(Emitter::default());
        let reconciliations: Rc<Emitter<ReconciliatoryActions<A>>> = Rc::new(Emitter::default());

        let fwd_sub = {
            let own_type = resource_type.to_string();
            let fwd_actions = fwd_actions.clone();
            connection.on(FWD_ACTION_CHANNEL, move |payload| {
                let push: FwdActionPush<A> = match serde_json::from_value(payload.clone()) {
                    Ok(push) => push,
                    Err(err) => {
                        warn!("Dropping malformed fwdAction push: {}", err);
                        return;
                    }
                };
                if push.rid.resource_type() != own_type {
                    return;
                }
                let (rid, checked) = push.into_parts();
                fwd_actions.publish(&rid_topic(&rid), &checked);
            })
        };

        let recon_sub = {
            let own_type = resource_type.to_string();
            let reconciliations = reconciliations.clone();
            connection.on(RECONCILIATE_ACTIONS_CHANNEL, move |payload| {
                let push: ReconciliateActionsPush<A> =
                    match serde_json::from_value(payload.clone()) {
                        Ok(push) => push,
                        Err(err) => {
                            warn!("Dropping malformed reconciliateActions push: {}", err);
                            return;
                        }
                    };
                if push.rid.resource_type() != own_type {
                    return;
                }
                let (rid, batch) = push.into_parts();
                reconciliations.publish(&rid_topic(&rid), &batch);
            })
        };

        Self {
            resource_type: resource_type.to_string(),
            connection,
            fwd_actions,
            reconciliations,
            transport_subs: RefCell::new(vec![fwd_sub, recon_sub]),
            _state: PhantomData,
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    // Requests

    /// Asks the master to create a new instance of this connection's
    /// resource type.
    pub fn create(&self, state: &S) -> RequestHandle<ResourceRecord<S>> {
        self.connection.request(
            MessageKind::CreateResource,
            &CreateResourcePayload {
                resource_type: self.resource_type.clone(),
                resource_state: state.clone(),
            },
        )
    }

    /// Fetches the master's checked state for `rid`; the usual follow-up to
    /// a checksum mismatch.
    pub fn get(&self, rid: &ResourceIdentifier) -> RequestHandle<CheckedState<S>> {
        self.connection.request(
            MessageKind::GetResourceState,
            &GetResourceStatePayload { rid: rid.clone() },
        )
    }

    /// Forwards a locally dispatched action to the master. A pair transmits
    /// both halves; the master broadcasts only the public one to other
    /// peers.
    pub fn emit_action(
        &self,
        rid: &ResourceIdentifier,
        action: &ActionOrPair<A>,
    ) -> RequestHandle<Value> {
        self.connection.request(
            MessageKind::EmitAction,
            &EmitActionPayload {
                rid: rid.clone(),
                action: action.clone(),
            },
        )
    }

    pub fn subscribe(&self, rid: &ResourceIdentifier) -> RequestHandle<()> {
        self.connection.request(
            MessageKind::SubscribeToResource,
            &SubscribeToResourcePayload {
                resource_id: rid.canonical(),
            },
        )
    }

    pub fn unsubscribe(&self, rid: &ResourceIdentifier) -> RequestHandle<()> {
        self.connection.request(
            MessageKind::UnsubscribeFromResource,
            &UnsubscribeFromResourcePayload {
                resource_id: rid.canonical(),
            },
        )
    }

    // Master-pushed events

    /// Fires for every forward action whose rid canonicalizes to `rid`,
    /// received after registration and before unsubscribe.
    pub fn on_fwd_action(
        &self,
        rid: &ResourceIdentifier,
        handler: impl Fn(&CheckedAction<A>) + 'static,
    ) -> Subscription {
        self.fwd_actions.subscribe(&rid_topic(rid), handler)
    }

    pub fn on_reconciliatory_actions(
        &self,
        rid: &ResourceIdentifier,
        handler: impl Fn(&ReconciliatoryActions<A>) + 'static,
    ) -> Subscription {
        self.reconciliations.subscribe(&rid_topic(rid), handler)
    }

    /// Releases this connection's transport subscriptions and local
    /// registries. Other resource connections on the same transport keep
    /// working.
    pub fn destroy(&self) {
        for subscription in self.transport_subs.borrow_mut().drain(..) {
            subscription.unsubscribe();
        }
        self.fwd_actions.clear();
        self.reconciliations.clear();
    }
}
