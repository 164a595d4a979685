/// Tests for the wire shape of actions and the ack envelope
use accord_shared::{AckEnvelope, ActionOrPair, CheckedAction, ReconciliatoryActions, checksum_of};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
enum CardAction {
    RevealCard { card: String },
    Fold,
}

#[test]
fn single_action_serializes_as_itself() {
    let action = ActionOrPair::Public(CardAction::Fold);
    let wire = serde_json::to_value(&action).unwrap();
    assert_eq!(wire, json!({"type": "fold"}));

    let back: ActionOrPair<CardAction> = serde_json::from_value(wire).unwrap();
    assert_eq!(back, action);
}

#[test]
fn paired_action_serializes_as_a_two_element_array() {
    let action = ActionOrPair::paired(
        CardAction::RevealCard {
            card: "A♠".to_string(),
        },
        CardAction::RevealCard {
            card: "?".to_string(),
        },
    );
    let wire = serde_json::to_value(&action).unwrap();
    assert_eq!(
        wire,
        json!([
            {"type": "revealCard", "payload": {"card": "A♠"}},
            {"type": "revealCard", "payload": {"card": "?"}}
        ])
    );

    let back: ActionOrPair<CardAction> = serde_json::from_value(wire).unwrap();
    assert!(back.is_paired());
    assert_eq!(
        back.local(),
        &CardAction::RevealCard {
            card: "A♠".to_string()
        }
    );
    assert_eq!(
        back.public(),
        &CardAction::RevealCard {
            card: "?".to_string()
        }
    );
}

#[test]
fn local_and_public_halves_of_a_single_action_coincide() {
    let action = ActionOrPair::Public(CardAction::Fold);
    assert_eq!(action.local(), action.public());
    assert!(!action.is_paired());
}

#[test]
fn reconciliatory_actions_use_camel_case_on_the_wire() {
    let checksum = checksum_of(&1).unwrap();
    let batch = ReconciliatoryActions {
        actions: vec![CheckedAction {
            action: CardAction::Fold,
            checksum: checksum.clone(),
        }],
        final_checksum: checksum,
    };

    let wire = serde_json::to_value(&batch).unwrap();
    assert!(wire.get("finalChecksum").is_some());
    assert!(wire.get("final_checksum").is_none());

    let back: ReconciliatoryActions<CardAction> = serde_json::from_value(wire).unwrap();
    assert_eq!(back, batch);
}

#[test]
fn ack_envelope_translates_to_a_tagged_result() {
    assert_eq!(AckEnvelope::ok(json!(7)).into_result(), Ok(json!(7)));
    assert_eq!(
        AckEnvelope::err(json!("denied")).into_result(),
        Err(json!("denied"))
    );
}

#[test]
fn ack_envelope_defaults_a_missing_val_to_null() {
    let envelope: AckEnvelope = serde_json::from_value(json!({"ok": true})).unwrap();
    assert_eq!(envelope.into_result(), Ok(serde_json::Value::Null));
}
