/// Tests for resource identifier parsing and canonical round-trips
use accord_shared::{ResourceIdentifier, ResourceIdentifierError};

#[test]
fn object_to_string_round_trip() {
    let rid = ResourceIdentifier::new("game", "42").unwrap();
    assert_eq!(rid.canonical(), "game:42");

    let back: ResourceIdentifier = rid.canonical().parse().unwrap();
    assert_eq!(back, rid);
}

#[test]
fn string_to_object_round_trip() {
    let rid: ResourceIdentifier = "chat:lobby-1".parse().unwrap();
    assert_eq!(rid.resource_type(), "chat");
    assert_eq!(rid.resource_id(), "lobby-1");
    assert_eq!(rid.to_string(), "chat:lobby-1");
}

#[test]
fn id_half_may_contain_separators() {
    let rid: ResourceIdentifier = "game:east:table:7".parse().unwrap();
    assert_eq!(rid.resource_type(), "game");
    assert_eq!(rid.resource_id(), "east:table:7");
    assert_eq!(rid.canonical(), "game:east:table:7");
}

#[test]
fn invalid_forms_are_rejected() {
    for input in ["", "no-separator", ":42", "game:", ":"] {
        let result: Result<ResourceIdentifier, _> = input.parse();
        assert!(
            matches!(result, Err(ResourceIdentifierError::Invalid { .. })),
            "expected {input:?} to be rejected"
        );
    }
}

#[test]
fn constructor_rejects_empty_and_separator_laden_types() {
    assert!(ResourceIdentifier::new("", "42").is_err());
    assert!(ResourceIdentifier::new("game:sub", "42").is_err());
    assert!(ResourceIdentifier::new("game", "").is_err());
}

#[test]
fn serde_uses_the_canonical_string() {
    let rid = ResourceIdentifier::new("game", "42").unwrap();
    let wire = serde_json::to_value(&rid).unwrap();
    assert_eq!(wire, serde_json::json!("game:42"));

    let back: ResourceIdentifier = serde_json::from_value(wire).unwrap();
    assert_eq!(back, rid);
}

#[test]
fn serde_rejects_invalid_strings() {
    let result: Result<ResourceIdentifier, _> = serde_json::from_value(serde_json::json!("nope"));
    assert!(result.is_err());
}

#[test]
fn error_display_format() {
    let error = ResourceIdentifierError::Invalid {
        input: ":42".to_string(),
    };
    let error_string = format!("{}", error);
    assert!(error_string.contains("Invalid resource identifier"));
    assert!(error_string.contains(":42"));
}
