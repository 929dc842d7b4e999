//! Subcommand implementations, written against `Write` so they can be tested
//! without a terminal.

use anyhow::{anyhow, Context};
use event_envelope::{from_wire, validate_envelope_fields, Codecs, EventEnvelope};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use tracing::{debug, info};

/// Read a wire envelope from a file path, or stdin when `input` is `-`
pub fn read_wire(input: &str) -> anyhow::Result<Value> {
    let raw = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read envelope from stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?
    };

    serde_json::from_str(&raw).with_context(|| format!("{input} is not valid JSON"))
}

pub fn validate(wire: &Value) -> anyhow::Result<()> {
    validate_envelope_fields(wire).map_err(|reason| anyhow!("invalid envelope: {reason}"))
}

pub fn decode(wire: Value) -> anyhow::Result<EventEnvelope> {
    let envelope = from_wire(wire)?;
    debug!(event_id = %envelope.id(), event_type = %envelope.event_type(), "Envelope decoded");
    Ok(envelope)
}

pub fn show<W: Write>(envelope: &EventEnvelope, out: &mut W) -> anyhow::Result<()> {
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    let rows = [
        ("id", envelope.id().to_string()),
        ("event-type", envelope.event_type().to_string()),
        ("stream-name", envelope.stream_name().to_string()),
        ("schema", envelope.schema().to_string()),
        ("service-id", envelope.service().to_string()),
        ("order-id", or_dash(envelope.order_id().map(|v| v.to_string()))),
        ("event-time", or_dash(envelope.event_time().map(|v| v.to_string()))),
        ("occurred-at", or_dash(envelope.occurred_at().map(|t| t.to_rfc3339()))),
        (
            "caused-by",
            or_dash(envelope.caused_by_link().map(|link| match link.relation {
                Some(relation) => format!("{} ({relation})", link.id),
                None => link.id.to_string(),
            })),
        ),
        ("payload-keys", envelope.payload().len().to_string()),
    ];

    for (name, value) in rows {
        writeln!(out, "{name:<14} {value}")?;
    }
    Ok(())
}

/// Materialize the payload through the codecs and print it with sorted keys
pub fn payload<W: Write>(
    mut envelope: EventEnvelope,
    codecs: Codecs,
    out: &mut W,
) -> anyhow::Result<()> {
    envelope.attach_codecs(codecs);

    let sorted: BTreeMap<String, Value> = envelope
        .payload_as()
        .with_context(|| format!("failed to materialize payload of {}", envelope.id()))?;

    serde_json::to_writer_pretty(&mut *out, &sorted)?;
    writeln!(out)?;
    Ok(())
}

/// Encode the payload with the first acceptable content type; returns the type used
pub fn encode<W: Write>(
    envelope: &EventEnvelope,
    codecs: &Codecs,
    accept: &[&str],
    out: &mut W,
) -> anyhow::Result<String> {
    let encoded = codecs.encode(envelope.payload(), accept)?;
    out.write_all(&encoded.payload)?;

    info!(
        event_id = %envelope.id(),
        content_type = %encoded.content_type,
        bytes = encoded.payload.len(),
        "Payload encoded"
    );
    Ok(encoded.content_type)
}
