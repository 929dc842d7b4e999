//! # Wire Form
//!
//! JSON object representation of an [`EventEnvelope`]. Field names are
//! mapped to wire keys through [`EnvelopeField::wire_key`], the single table
//! both directions use.
//!
//! ```json
//! {
//!   "id": "e1",
//!   "event-type": "order-created",
//!   "stream-name": "orders",
//!   "schema": "v1",
//!   "caused-by-id": "e0",
//!   "caused-by-relation": "triggered-by",
//!   "service-id": "order-svc",
//!   "order-id": 42,
//!   "event-time": 1700000000000,
//!   "payload": { "amount": 100 }
//! }
//! ```
//!
//! Absent optional fields are omitted. Codecs are never part of the wire form.

use crate::envelope::{EventEnvelope, Payload};
use crate::error::{EnvelopeError, EnvelopeResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Envelope fields, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeField {
    Id,
    EventType,
    StreamName,
    Schema,
    CausedById,
    CausedByRelation,
    Service,
    OrderId,
    EventTime,
    Payload,
}

impl EnvelopeField {
    pub const ALL: [EnvelopeField; 10] = [
        EnvelopeField::Id,
        EnvelopeField::EventType,
        EnvelopeField::StreamName,
        EnvelopeField::Schema,
        EnvelopeField::CausedById,
        EnvelopeField::CausedByRelation,
        EnvelopeField::Service,
        EnvelopeField::OrderId,
        EnvelopeField::EventTime,
        EnvelopeField::Payload,
    ];

    /// Key this field is stored under in the wire form
    pub const fn wire_key(self) -> &'static str {
        match self {
            EnvelopeField::Id => "id",
            EnvelopeField::EventType => "event-type",
            EnvelopeField::StreamName => "stream-name",
            EnvelopeField::Schema => "schema",
            EnvelopeField::CausedById => "caused-by-id",
            EnvelopeField::CausedByRelation => "caused-by-relation",
            EnvelopeField::Service => "service-id",
            EnvelopeField::OrderId => "order-id",
            EnvelopeField::EventTime => "event-time",
            EnvelopeField::Payload => "payload",
        }
    }

    /// Required fields must be present as non-empty strings
    pub const fn is_required(self) -> bool {
        matches!(
            self,
            EnvelopeField::Id | EnvelopeField::EventType | EnvelopeField::StreamName
        )
    }
}

/// Convert an envelope into its wire form
pub fn to_wire(envelope: &EventEnvelope) -> Value {
    let mut wire = Map::new();

    for field in EnvelopeField::ALL {
        let value = match field {
            EnvelopeField::Id => Some(Value::from(envelope.id())),
            EnvelopeField::EventType => Some(Value::from(envelope.event_type())),
            EnvelopeField::StreamName => Some(Value::from(envelope.stream_name())),
            EnvelopeField::Schema => Some(Value::from(envelope.schema())),
            EnvelopeField::CausedById => envelope.caused_by_id().map(Value::from),
            EnvelopeField::CausedByRelation => envelope.caused_by_relation().map(Value::from),
            EnvelopeField::Service => Some(Value::from(envelope.service())),
            EnvelopeField::OrderId => envelope.order_id().map(Value::from),
            EnvelopeField::EventTime => envelope.event_time().map(Value::from),
            EnvelopeField::Payload => Some(Value::Object(envelope.payload().clone())),
        };

        if let Some(value) = value {
            wire.insert(field.wire_key().to_string(), value);
        }
    }

    Value::Object(wire)
}

/// Build an envelope from its wire form
///
/// The result has no codecs attached. Unknown keys are ignored.
///
/// # Errors
///
/// Returns [`EnvelopeError::InvalidEnvelope`] if [`validate_envelope_fields`] fails
pub fn from_wire(wire: Value) -> EnvelopeResult<EventEnvelope> {
    validate_envelope_fields(&wire).map_err(EnvelopeError::InvalidEnvelope)?;

    let Value::Object(mut wire) = wire else {
        return Err(EnvelopeError::InvalidEnvelope(
            "envelope must be a JSON object".to_string(),
        ));
    };

    let payload = match wire.remove(EnvelopeField::Payload.wire_key()) {
        Some(Value::Object(payload)) => payload,
        _ => Payload::new(),
    };

    Ok(EventEnvelope::new(
        string_field(&wire, EnvelopeField::Id).unwrap_or_default(),
        string_field(&wire, EnvelopeField::EventType).unwrap_or_default(),
        string_field(&wire, EnvelopeField::StreamName).unwrap_or_default(),
        string_field(&wire, EnvelopeField::Schema).unwrap_or_default(),
        string_field(&wire, EnvelopeField::CausedById),
        string_field(&wire, EnvelopeField::CausedByRelation),
        string_field(&wire, EnvelopeField::Service).unwrap_or_default(),
        integer_field(&wire, EnvelopeField::OrderId),
        integer_field(&wire, EnvelopeField::EventTime),
        payload,
        None,
    ))
}

/// Validate the structure of a wire-form envelope
///
/// # Validation Rules
///
/// - The envelope must be a JSON object
/// - `id`, `event-type`, `stream-name`: required non-empty strings
/// - `schema`, `service-id`, `caused-by-id`, `caused-by-relation`: strings or null if present
/// - `order-id`, `event-time`: 64-bit integers or null if present
/// - `payload`: required object
///
/// # Errors
///
/// Returns a descriptive error string if validation fails
pub fn validate_envelope_fields(envelope: &Value) -> Result<(), String> {
    let object = envelope
        .as_object()
        .ok_or("Envelope must be a JSON object")?;

    for field in EnvelopeField::ALL {
        let key = field.wire_key();
        let value = object.get(key);

        if field.is_required() {
            let text = value
                .and_then(|v| v.as_str())
                .ok_or_else(|| format!("Missing or invalid {key}"))?;
            if text.trim().is_empty() {
                return Err(format!("{key} cannot be empty"));
            }
            continue;
        }

        match field {
            EnvelopeField::Payload => {
                let payload = value.ok_or("Missing required field: payload")?;
                if !payload.is_object() {
                    return Err("Invalid payload: must be an object".to_string());
                }
            }
            EnvelopeField::OrderId | EnvelopeField::EventTime => {
                if let Some(v) = value.filter(|v| !v.is_null()) {
                    if !v.is_i64() {
                        return Err(format!("Invalid {key}: must be a 64-bit integer or null"));
                    }
                }
            }
            _ => {
                if let Some(v) = value.filter(|v| !v.is_null()) {
                    if !v.is_string() {
                        return Err(format!("Invalid {key}: must be a string or null"));
                    }
                }
            }
        }
    }

    Ok(())
}

fn string_field(wire: &Map<String, Value>, field: EnvelopeField) -> Option<String> {
    wire.get(field.wire_key())
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn integer_field(wire: &Map<String, Value>, field: EnvelopeField) -> Option<i64> {
    wire.get(field.wire_key()).and_then(Value::as_i64)
}

impl Serialize for EventEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_wire(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EventEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Value::deserialize(deserializer)?;
        from_wire(wire).map_err(serde::de::Error::custom)
    }
}
