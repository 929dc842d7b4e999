//! Contract tests for the event envelope
//!
//! These exercise the public API the way a consuming pipeline does: decode an
//! envelope from its wire form, attach codecs, and materialize payloads.

use event_envelope::{
    from_wire, to_wire, CodecError, Codecs, EnvelopeError, EventEnvelope, Payload,
    APPLICATION_JSON,
};
use proptest::prelude::*;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize, PartialEq)]
struct OrderDetails {
    amount: i64,
}

fn order_created(payload: Payload) -> EventEnvelope {
    EventEnvelope::new(
        "e1".to_string(),
        "order-created".to_string(),
        "orders".to_string(),
        "v1".to_string(),
        None,
        None,
        "order-svc".to_string(),
        Some(42),
        Some(1_700_000_000),
        payload,
        None,
    )
}

fn amount_payload() -> Payload {
    json!({"amount": 100}).as_object().cloned().unwrap()
}

/// TEST 1: order-created walkthrough, raw then typed before and after attaching codecs
#[test]
fn test_order_created_scenario() {
    let mut envelope = order_created(amount_payload());

    let raw: Payload = envelope.payload_as().unwrap();
    assert_eq!(Value::Object(raw), json!({"amount": 100}));

    let err = envelope.payload_as::<OrderDetails>().unwrap_err();
    assert!(matches!(err, EnvelopeError::MissingCapability { ref event_id } if event_id == "e1"));

    envelope.attach_codecs(Codecs::json());
    let details: OrderDetails = envelope.payload_as().unwrap();
    assert_eq!(details, OrderDetails { amount: 100 });
}

/// TEST 2: envelopes decoded from the wire carry no codecs until attached
#[test]
fn test_wire_envelope_needs_codecs() {
    let mut envelope: EventEnvelope = serde_json::from_value(json!({
        "id": "e7",
        "event-type": "order-created",
        "stream-name": "orders",
        "schema": "v1",
        "service-id": "order-svc",
        "order-id": 7,
        "payload": {"amount": 250}
    }))
    .unwrap();

    assert!(envelope.codecs().is_none());
    assert!(envelope.event_time().is_none());
    assert!(envelope.payload_as::<OrderDetails>().is_err());

    envelope.attach_codecs(Codecs::default());
    assert_eq!(envelope.payload_as::<OrderDetails>().unwrap().amount, 250);
}

/// TEST 3: codec failures surface unchanged
#[test]
fn test_codec_errors_pass_through() {
    let envelope = order_created(json!({"amount": "a lot"}).as_object().cloned().unwrap())
        .with_codecs(Codecs::json());

    let via_envelope = envelope.payload_as::<OrderDetails>().unwrap_err();
    let direct = envelope.payload_with::<OrderDetails>(&Codecs::json()).unwrap_err();

    assert_eq!(via_envelope, EnvelopeError::Codec(direct.clone()));
    assert!(matches!(direct, CodecError::Shape { .. }));
}

/// TEST 4: a child event links back to its parent and survives the wire
#[test]
fn test_causal_link_round_trip() {
    let parent = order_created(amount_payload());
    let child = EventEnvelope::fresh(
        "payment-requested".to_string(),
        "payments".to_string(),
        "v2".to_string(),
        "payments-svc".to_string(),
        Payload::new(),
    )
    .caused_by(&parent, "requested-for");

    let wire = to_wire(&child);
    assert_eq!(wire["caused-by-id"], json!("e1"));
    assert_eq!(wire["caused-by-relation"], json!("requested-for"));

    let decoded = from_wire(wire).unwrap();
    assert_eq!(decoded, child);
    assert_eq!(decoded.caused_by_link().unwrap().id, parent.id());
}

/// TEST 5: a shared envelope can be read from many threads at once
#[test]
fn test_concurrent_reads() {
    let envelope = Arc::new(order_created(amount_payload()).with_codecs(Codecs::json()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let envelope = Arc::clone(&envelope);
            std::thread::spawn(move || envelope.payload_as::<OrderDetails>().unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), OrderDetails { amount: 100 });
    }
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _-]{0,16}".prop_map(Value::from),
    ]
}

fn json_tree() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn payload_strategy() -> impl Strategy<Value = Payload> {
    prop::collection::btree_map("[a-z]{1,8}", json_tree(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_raw_payload_is_identity(payload in payload_strategy()) {
        let envelope = order_created(payload.clone());

        prop_assert_eq!(envelope.payload(), &payload);
        prop_assert_eq!(envelope.payload_as::<Payload>().unwrap(), payload);
    }

    #[test]
    fn prop_typed_payload_is_encode_then_decode(payload in payload_strategy()) {
        let codecs = Codecs::json();
        let envelope = order_created(payload.clone()).with_codecs(codecs.clone());

        let encoded = codecs.encode(&payload, &[APPLICATION_JSON]).unwrap();
        let expected: Value = codecs.decode(&encoded.payload, APPLICATION_JSON).unwrap();

        prop_assert_eq!(envelope.payload_as::<Value>().unwrap(), expected);
    }

    #[test]
    fn prop_typed_payload_without_codecs_is_missing_capability(payload in payload_strategy()) {
        let envelope = order_created(payload);
        let is_missing = matches!(
            envelope.payload_as::<Value>(),
            Err(EnvelopeError::MissingCapability { .. })
        );
        prop_assert!(is_missing);
    }

    #[test]
    fn prop_accessors_preserve_constructor_values(
        id in "[a-z0-9-]{1,12}",
        caused_by_id in proptest::option::of("[a-z0-9-]{1,12}"),
        caused_by_relation in proptest::option::of("[a-z-]{1,12}"),
        order_id in proptest::option::of(any::<i64>()),
        event_time in proptest::option::of(any::<i64>()),
    ) {
        let envelope = EventEnvelope::new(
            id.clone(),
            "order-created".to_string(),
            "orders".to_string(),
            "v1".to_string(),
            caused_by_id.clone(),
            caused_by_relation.clone(),
            "order-svc".to_string(),
            order_id,
            event_time,
            Payload::new(),
            None,
        );

        prop_assert_eq!(envelope.id(), id.as_str());
        prop_assert_eq!(envelope.caused_by_id(), caused_by_id.as_deref());
        prop_assert_eq!(envelope.caused_by_relation(), caused_by_relation.as_deref());
        prop_assert_eq!(envelope.order_id(), order_id);
        prop_assert_eq!(envelope.event_time(), event_time);

        let decoded = from_wire(to_wire(&envelope)).unwrap();
        prop_assert_eq!(decoded, envelope);
    }
}
