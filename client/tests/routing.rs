/// Tests for per-resource-type routing of master-pushed events.
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use accord_client::{ChannelTransport, ClientConfig, MasterConnection, ResourceConnection};
use accord_shared::{
    checksum_of, CheckedAction, ResourceIdentifier, FWD_ACTION_CHANNEL,
    RECONCILIATE_ACTIONS_CHANNEL,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
enum GameAction {
    Inc,
}

fn connected_pair() -> (Rc<MasterConnection>, accord_client::MasterEndpoint) {
    let (transport, master) = ChannelTransport::pair();
    let mut config = ClientConfig::new("channel://test");
    config.wait_for_response = Duration::from_millis(15_000);
    let connection = Rc::new(MasterConnection::new(config, Box::new(transport)));
    connection.connect().unwrap();
    (connection, master)
}

fn fwd_action_payload(rid: &str, next_state: i64) -> serde_json::Value {
    json!({
        "rid": rid,
        "action": {"type": "inc"},
        "checksum": checksum_of(&next_state).unwrap(),
    })
}

#[test]
fn events_route_only_to_the_matching_resource_type() {
    let (connection, master) = connected_pair();
    let games: ResourceConnection<i64, GameAction> =
        ResourceConnection::new("game", connection.clone());
    let chats: ResourceConnection<i64, GameAction> =
        ResourceConnection::new("chat", connection.clone());

    let game_rid = ResourceIdentifier::new("game", "42").unwrap();
    let chat_rid = ResourceIdentifier::new("chat", "42").unwrap();

    let game_seen = Rc::new(RefCell::new(Vec::new()));
    let chat_seen = Rc::new(RefCell::new(Vec::new()));
    let game_sink = game_seen.clone();
    let chat_sink = chat_seen.clone();
    let _game_sub = games.on_fwd_action(&game_rid, move |checked| {
        game_sink.borrow_mut().push(checked.clone())
    });
    let _chat_sub = chats.on_fwd_action(&chat_rid, move |checked| {
        chat_sink.borrow_mut().push(checked.clone())
    });

    master.push(FWD_ACTION_CHANNEL, fwd_action_payload("game:42", 1));
    connection.pump();

    assert_eq!(game_seen.borrow().len(), 1);
    assert_eq!(game_seen.borrow()[0].action, GameAction::Inc);
    assert!(chat_seen.borrow().is_empty());
}

#[test]
fn events_route_only_to_the_matching_resource_id() {
    let (connection, master) = connected_pair();
    let games: ResourceConnection<i64, GameAction> =
        ResourceConnection::new("game", connection.clone());

    let seen = Rc::new(RefCell::new(Vec::<CheckedAction<GameAction>>::new()));
    let sink = seen.clone();
    let rid = ResourceIdentifier::new("game", "42").unwrap();
    let _sub = games.on_fwd_action(&rid, move |checked| sink.borrow_mut().push(checked.clone()));

    master.push(FWD_ACTION_CHANNEL, fwd_action_payload("game:43", 1));
    connection.pump();

    assert!(seen.borrow().is_empty());
}

#[test]
fn unsubscribed_rid_callbacks_stop_firing() {
    let (connection, master) = connected_pair();
    let games: ResourceConnection<i64, GameAction> =
        ResourceConnection::new("game", connection.clone());

    let seen = Rc::new(RefCell::new(Vec::<CheckedAction<GameAction>>::new()));
    let sink = seen.clone();
    let rid = ResourceIdentifier::new("game", "42").unwrap();
    let sub = games.on_fwd_action(&rid, move |checked| sink.borrow_mut().push(checked.clone()));

    master.push(FWD_ACTION_CHANNEL, fwd_action_payload("game:42", 1));
    connection.pump();
    assert_eq!(seen.borrow().len(), 1);

    sub.unsubscribe();
    master.push(FWD_ACTION_CHANNEL, fwd_action_payload("game:42", 2));
    connection.pump();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn reconciliatory_batches_route_by_rid() {
    let (connection, master) = connected_pair();
    let games: ResourceConnection<i64, GameAction> =
        ResourceConnection::new("game", connection.clone());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let rid = ResourceIdentifier::new("game", "42").unwrap();
    let _sub = games
        .on_reconciliatory_actions(&rid, move |batch| sink.borrow_mut().push(batch.clone()));

    master.push(
        RECONCILIATE_ACTIONS_CHANNEL,
        json!({
            "rid": "game:42",
            "actions": [
                {"action": {"type": "inc"}, "checksum": checksum_of(&1).unwrap()}
            ],
            "finalChecksum": checksum_of(&1).unwrap(),
        }),
    );
    connection.pump();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].actions.len(), 1);
    assert_eq!(seen[0].final_checksum, checksum_of(&1).unwrap());
}

#[test]
fn destroying_one_connection_leaves_the_other_alive() {
    let (connection, master) = connected_pair();
    let games: ResourceConnection<i64, GameAction> =
        ResourceConnection::new("game", connection.clone());
    let chats: ResourceConnection<i64, GameAction> =
        ResourceConnection::new("chat", connection.clone());

    let game_seen = Rc::new(RefCell::new(Vec::<CheckedAction<GameAction>>::new()));
    let chat_seen = Rc::new(RefCell::new(Vec::<CheckedAction<GameAction>>::new()));
    let game_sink = game_seen.clone();
    let chat_sink = chat_seen.clone();
    let game_rid = ResourceIdentifier::new("game", "1").unwrap();
    let chat_rid = ResourceIdentifier::new("chat", "1").unwrap();
    let _game_sub = games.on_fwd_action(&game_rid, move |checked| {
        game_sink.borrow_mut().push(checked.clone())
    });
    let _chat_sub = chats.on_fwd_action(&chat_rid, move |checked| {
        chat_sink.borrow_mut().push(checked.clone())
    });

    games.destroy();

    master.push(FWD_ACTION_CHANNEL, fwd_action_payload("game:1", 1));
    master.push(FWD_ACTION_CHANNEL, fwd_action_payload("chat:1", 1));
    connection.pump();

    assert!(game_seen.borrow().is_empty());
    assert_eq!(chat_seen.borrow().len(), 1);
}

#[test]
fn malformed_pushes_are_dropped_without_disturbing_subscribers() {
    let (connection, master) = connected_pair();
    let games: ResourceConnection<i64, GameAction> =
        ResourceConnection::new("game", connection.clone());

    let seen = Rc::new(RefCell::new(Vec::<CheckedAction<GameAction>>::new()));
    let sink = seen.clone();
    let rid = ResourceIdentifier::new("game", "42").unwrap();
    let _sub = games.on_fwd_action(&rid, move |checked| sink.borrow_mut().push(checked.clone()));

    master.push(FWD_ACTION_CHANNEL, json!({"rid": "not-a-rid"}));
    master.push(FWD_ACTION_CHANNEL, fwd_action_payload("game:42", 1));
    connection.pump();

    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn requests_carry_the_connection_wide_resource_type() {
    let (connection, master) = connected_pair();
    let games: ResourceConnection<i64, GameAction> =
        ResourceConnection::new("game", connection.clone());

    let _create = games.create(&7);
    let rid = ResourceIdentifier::new("game", "42").unwrap();
    let _get = games.get(&rid);
    let _subscribe = games.subscribe(&rid);

    let requests = master.drain_requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].channel, "createResource");
    assert_eq!(requests[0].payload["resourceType"], json!("game"));
    assert_eq!(requests[0].payload["resourceState"], json!(7));
    assert_eq!(requests[1].channel, "getResourceState");
    assert_eq!(requests[1].payload["rid"], json!("game:42"));
    assert_eq!(requests[2].channel, "subscribeToResource");
    assert_eq!(requests[2].payload["resourceId"], json!("game:42"));
}
