//! # Event Envelope
//!
//! Canonical envelope for one domain event: metadata, an untyped payload, and
//! an optional codec capability used to materialize the payload into a typed
//! shape on demand.
//!
//! ## Envelope Fields
//!
//! - `id`: Unique event identifier
//! - `event_type`: Logical event kind (e.g., "order-created")
//! - `stream_name`: Stream the event belongs to
//! - `schema`: Identifier/version of the payload schema
//! - `caused_by_id` / `caused_by_relation`: Optional causal link to another event
//! - `service`: Producing service
//! - `order_id`: Optional sequencing value
//! - `event_time`: Optional occurrence time, epoch milliseconds
//! - `payload`: Event data as a generic JSON object
//!
//! ## Thread Safety
//!
//! Attaching codecs takes `&mut self`, so a shared envelope (`&` or `Arc`)
//! can only be read. Concurrent reads, including payload materialization,
//! are safe.

use crate::codec::{Codecs, APPLICATION_JSON};
use crate::error::{CodecError, EnvelopeError, EnvelopeResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::any::Any;
use tracing::trace;
use uuid::Uuid;

/// Event payload in its generic decoded form
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Weak back-reference to the event that caused this one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CausalLink<'a> {
    pub id: &'a str,
    pub relation: Option<&'a str>,
}

/// Canonical event envelope
///
/// Equality covers the data fields only; the attached codecs never take part.
///
/// # Examples
///
/// ```rust
/// use event_envelope::{Codecs, EventEnvelope, EnvelopeError};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Debug, Deserialize)]
/// struct OrderDetails {
///     amount: i64,
/// }
///
/// let payload = json!({"amount": 100}).as_object().cloned().unwrap();
/// let mut envelope = EventEnvelope::new(
///     "e1".to_string(),
///     "order-created".to_string(),
///     "orders".to_string(),
///     "v1".to_string(),
///     None,
///     None,
///     "order-svc".to_string(),
///     Some(42),
///     Some(1_700_000_000),
///     payload,
///     None,
/// );
///
/// assert!(matches!(
///     envelope.payload_as::<OrderDetails>(),
///     Err(EnvelopeError::MissingCapability { .. })
/// ));
///
/// envelope.attach_codecs(Codecs::json());
/// assert_eq!(envelope.payload_as::<OrderDetails>().unwrap().amount, 100);
/// ```
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    id: String,
    event_type: String,
    stream_name: String,
    schema: String,
    caused_by_id: Option<String>,
    caused_by_relation: Option<String>,
    service: String,
    order_id: Option<i64>,
    event_time: Option<i64>,
    payload: Payload,
    codecs: Option<Codecs>,
}

impl EventEnvelope {
    /// Assemble an envelope from its parts
    ///
    /// No validation is performed; see [`EventEnvelope::validate`].
    pub fn new(
        id: String,
        event_type: String,
        stream_name: String,
        schema: String,
        caused_by_id: Option<String>,
        caused_by_relation: Option<String>,
        service: String,
        order_id: Option<i64>,
        event_time: Option<i64>,
        payload: Payload,
        codecs: Option<Codecs>,
    ) -> Self {
        Self {
            id,
            event_type,
            stream_name,
            schema,
            caused_by_id,
            caused_by_relation,
            service,
            order_id,
            event_time,
            payload,
            codecs,
        }
    }

    /// Create a new event as a producer would
    ///
    /// Assigns a UUIDv4 id and stamps `event_time` with the current time.
    pub fn fresh(
        event_type: String,
        stream_name: String,
        schema: String,
        service: String,
        payload: Payload,
    ) -> Self {
        Self::new(
            Uuid::new_v4().to_string(),
            event_type,
            stream_name,
            schema,
            None,
            None,
            service,
            None,
            Some(Utc::now().timestamp_millis()),
            payload,
            None,
        )
    }

    pub fn with_codecs(mut self, codecs: Codecs) -> Self {
        self.codecs = Some(codecs);
        self
    }

    pub fn with_order_id(mut self, order_id: Option<i64>) -> Self {
        self.order_id = order_id;
        self
    }

    pub fn with_event_time(mut self, event_time: Option<i64>) -> Self {
        self.event_time = event_time;
        self
    }

    /// Set the causal link explicitly
    pub fn with_caused_by(mut self, id: Option<String>, relation: Option<String>) -> Self {
        self.caused_by_id = id;
        self.caused_by_relation = relation;
        self
    }

    /// Link this event to the envelope that triggered it
    pub fn caused_by(self, parent: &EventEnvelope, relation: impl Into<String>) -> Self {
        self.with_caused_by(Some(parent.id.clone()), Some(relation.into()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn caused_by_id(&self) -> Option<&str> {
        self.caused_by_id.as_deref()
    }

    pub fn caused_by_relation(&self) -> Option<&str> {
        self.caused_by_relation.as_deref()
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn order_id(&self) -> Option<i64> {
        self.order_id
    }

    pub fn event_time(&self) -> Option<i64> {
        self.event_time
    }

    /// Causal link, present whenever `caused_by_id` is
    pub fn caused_by_link(&self) -> Option<CausalLink<'_>> {
        self.caused_by_id().map(|id| CausalLink {
            id,
            relation: self.caused_by_relation(),
        })
    }

    /// `event_time` as a UTC timestamp
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.event_time.and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    /// The raw payload; never requires a codec
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn codecs(&self) -> Option<&Codecs> {
        self.codecs.as_ref()
    }

    /// Attach (or replace) the codec capability
    pub fn attach_codecs(&mut self, codecs: Codecs) {
        self.codecs = Some(codecs);
    }

    /// Materialize the payload as `T`
    ///
    /// Requesting exactly [`Payload`] returns a copy of the raw payload without
    /// touching the codec. Every other shape is encoded as `application/json`
    /// and decoded back through the attached codecs.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MissingCapability`] if no codecs are attached
    /// - [`EnvelopeError::Codec`] if encoding or decoding fails
    pub fn payload_as<T>(&self) -> EnvelopeResult<T>
    where
        T: DeserializeOwned + 'static,
    {
        if raw_payload_requested::<T>() {
            let copy: Box<dyn Any> = Box::new(self.payload.clone());
            if let Ok(payload) = copy.downcast::<T>() {
                return Ok(*payload);
            }
        }

        let codecs = self
            .codecs
            .as_ref()
            .ok_or_else(|| EnvelopeError::MissingCapability {
                event_id: self.id.clone(),
            })?;

        Ok(self.payload_with(codecs)?)
    }

    /// Materialize the payload as `T` through an explicitly supplied codec registry
    ///
    /// Always runs the encode-then-decode composition, regardless of `T`.
    pub fn payload_with<T>(&self, codecs: &Codecs) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        trace!(
            event_id = %self.id,
            shape = std::any::type_name::<T>(),
            "Materializing payload"
        );

        let encoded = codecs.encode(&self.payload, &[APPLICATION_JSON])?;
        codecs.decode(&encoded.payload, &encoded.content_type)
    }

    /// Check that `id`, `event_type` and `stream_name` are non-empty
    pub fn validate(&self) -> EnvelopeResult<()> {
        let required = [
            ("id", &self.id),
            ("event-type", &self.event_type),
            ("stream-name", &self.stream_name),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(EnvelopeError::InvalidEnvelope(format!(
                    "{name} cannot be empty"
                )));
            }
        }

        Ok(())
    }
}

impl PartialEq for EventEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.event_type == other.event_type
            && self.stream_name == other.stream_name
            && self.schema == other.schema
            && self.caused_by_id == other.caused_by_id
            && self.caused_by_relation == other.caused_by_relation
            && self.service == other.service
            && self.order_id == other.order_id
            && self.event_time == other.event_time
            && self.payload == other.payload
    }
}

fn raw_payload_requested<T: 'static>() -> bool {
    std::any::TypeId::of::<T>() == std::any::TypeId::of::<Payload>()
}
