//! # Event Envelope
//!
//! The canonical envelope for a single domain event, with a codec capability
//! for turning its untyped payload into whatever shape a handler expects.
//!
//! ## What Lives Here
//!
//! - [`EventEnvelope`]: event metadata, causal link, and raw payload
//! - [`Codecs`]: registry of [`Codec`] implementations with content-type negotiation
//! - [`wire`]: the kebab-case JSON wire form and its structural validation
//!
//! Transport, delivery and persistence of envelopes belong to whatever
//! pipeline carries them; nothing in this crate does I/O.
//!
//! ## Usage
//!
//! ```rust
//! use event_envelope::{Codecs, EventEnvelope};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct OrderCreated {
//!     amount: i64,
//! }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Envelopes arrive in wire form, without codecs
//! let mut envelope: EventEnvelope = serde_json::from_value(json!({
//!     "id": "e1",
//!     "event-type": "order-created",
//!     "stream-name": "orders",
//!     "schema": "v1",
//!     "service-id": "order-svc",
//!     "payload": {"amount": 100}
//! }))?;
//!
//! // The owning pipeline attaches the codec capability
//! envelope.attach_codecs(Codecs::json());
//!
//! let order: OrderCreated = envelope.payload_as()?;
//! assert_eq!(order.amount, 100);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod codec;
mod envelope;
mod error;
pub mod wire;

pub use codec::{Codec, Codecs, EncodingResult, JsonCodec, APPLICATION_JSON};
pub use envelope::{CausalLink, EventEnvelope, Payload};
pub use error::{CodecError, EnvelopeError, EnvelopeResult};
pub use wire::{from_wire, to_wire, validate_envelope_fields, EnvelopeField};
