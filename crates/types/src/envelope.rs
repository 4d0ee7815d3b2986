// Path: crates/types/src/envelope.rs
//! The standard event envelope wrapped around every published payload.
//!
//! The envelope follows the CloudEvents 1.0 field set. It is constructed
//! once by [`EnvelopeBuilder`] and is immutable afterwards; the only
//! mutation the runtime ever performs is reading it back out for
//! serialization. When a request carries the raw-payload flag the builder
//! is bypassed entirely and the user's bytes travel verbatim.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The `specversion` stamped on every envelope.
pub const SPEC_VERSION: &str = "1.0";
/// The `type` attribute for events originating from an application publish.
pub const EVENT_TYPE: &str = "com.portico.event.sent";
/// Default content type assumed when the caller supplies none.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";
/// Content type of the serialized envelope itself.
pub const ENVELOPE_CONTENT_TYPE: &str = "application/cloudevents+json";

/// A fully built event envelope.
///
/// Field order here is the serialization order; `serde_json` emits struct
/// fields in declaration order, which keeps the wire form deterministic for
/// a given envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique event id, assigned at construction.
    pub(crate) id: String,
    /// The publishing application id.
    pub(crate) source: String,
    /// The event type attribute.
    #[serde(rename = "type")]
    pub(crate) event_type: String,
    /// CloudEvents spec version.
    pub(crate) specversion: String,
    /// Content type of the user payload.
    pub(crate) datacontenttype: String,
    /// Destination topic.
    pub(crate) topic: String,
    /// Name of the pub/sub component the event was published through.
    pub(crate) pubsubname: String,
    /// W3C trace context, as received or refreshed by the gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) traceparent: Option<String>,
    /// W3C trace state accompanying `traceparent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tracestate: Option<String>,
    /// The user payload.
    #[serde(flatten)]
    pub(crate) data: EnvelopePayload,
    /// Extension attributes carried through from request metadata.
    #[serde(flatten, skip_serializing_if = "HashMap::is_empty", default)]
    pub(crate) extensions: HashMap<String, String>,
}

/// Internal wrapper so `data` / `data_base64` serialize under the right key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum EnvelopePayload {
    /// Structured payload.
    #[serde(rename = "data")]
    Json(serde_json::Value),
    /// Opaque payload, base64 encoded.
    #[serde(rename = "data_base64")]
    Binary(String),
}

impl Envelope {
    /// The event id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The publishing application id.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The destination topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The pub/sub component name.
    pub fn pubsub_name(&self) -> &str {
        &self.pubsubname
    }

    /// The content type of the user payload.
    pub fn data_content_type(&self) -> &str {
        &self.datacontenttype
    }

    /// The trace parent header value, if one was propagated.
    pub fn traceparent(&self) -> Option<&str> {
        self.traceparent.as_deref()
    }

    /// The trace state header value, if one was propagated.
    pub fn tracestate(&self) -> Option<&str> {
        self.tracestate.as_deref()
    }

    /// Serializes the envelope to its canonical JSON wire form.
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

/// Assembles an [`Envelope`] from the pieces the gateway has on hand.
#[derive(Debug, Default)]
pub struct EnvelopeBuilder {
    source: String,
    topic: String,
    pubsub_name: String,
    data_content_type: Option<String>,
    traceparent: Option<String>,
    tracestate: Option<String>,
    extensions: HashMap<String, String>,
}

impl EnvelopeBuilder {
    /// Starts a builder for an event published by `app_id` to `topic` on
    /// the pub/sub component `pubsub_name`.
    pub fn new(app_id: &str, pubsub_name: &str, topic: &str) -> Self {
        Self {
            source: app_id.to_string(),
            topic: topic.to_string(),
            pubsub_name: pubsub_name.to_string(),
            ..Self::default()
        }
    }

    /// Sets the payload content type. Defaults to `text/plain`.
    pub fn content_type(mut self, content_type: &str) -> Self {
        if !content_type.is_empty() {
            self.data_content_type = Some(content_type.to_string());
        }
        self
    }

    /// Attaches W3C trace context to the envelope.
    pub fn trace(mut self, traceparent: Option<String>, tracestate: Option<String>) -> Self {
        self.traceparent = traceparent;
        self.tracestate = tracestate;
        self
    }

    /// Adds an extension attribute. Reserved CloudEvents attribute names are
    /// ignored so callers cannot shadow envelope fields.
    pub fn extension(mut self, key: &str, value: &str) -> Self {
        const RESERVED: &[&str] = &[
            "id",
            "source",
            "type",
            "specversion",
            "datacontenttype",
            "topic",
            "pubsubname",
            "traceparent",
            "tracestate",
            "data",
            "data_base64",
        ];
        if !RESERVED.contains(&key) {
            self.extensions.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Builds the envelope around `data`, assigning a fresh event id.
    ///
    /// JSON content types embed the payload structurally; if the payload
    /// fails to parse as JSON despite its declared content type, the
    /// builder reports a serialization failure rather than silently
    /// switching representation.
    pub fn build(self, data: &[u8]) -> Result<Envelope, serde_json::Error> {
        let content_type = self
            .data_content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let payload = if is_json_content_type(&content_type) {
            EnvelopePayload::Json(serde_json::from_slice(data)?)
        } else if content_type.starts_with("text/") {
            EnvelopePayload::Json(serde_json::Value::String(
                String::from_utf8_lossy(data).into_owned(),
            ))
        } else {
            EnvelopePayload::Binary(base64_encode(data))
        };

        Ok(Envelope {
            id: Uuid::new_v4().to_string(),
            source: self.source,
            event_type: EVENT_TYPE.to_string(),
            specversion: SPEC_VERSION.to_string(),
            datacontenttype: content_type,
            topic: self.topic,
            pubsubname: self.pubsub_name,
            traceparent: self.traceparent,
            tracestate: self.tracestate,
            data: payload,
            extensions: self.extensions,
        })
    }
}

/// Whether a content type denotes JSON (`application/json`,
/// `application/cloudevents+json`, and friends).
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn base64_encode(data: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    STANDARD.encode(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_payload_embeds_structurally() {
        let envelope = EnvelopeBuilder::new("app1", "ps1", "orders")
            .content_type("application/json")
            .build(br#"{"n":1}"#)
            .unwrap();

        let wire = envelope.to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&wire).unwrap();
        assert_eq!(value["data"]["n"], 1);
        assert_eq!(value["specversion"], SPEC_VERSION);
        assert_eq!(value["pubsubname"], "ps1");
        assert_eq!(value["topic"], "orders");
        assert!(value.get("data_base64").is_none());
    }

    #[test]
    fn binary_payload_is_base64() {
        let envelope = EnvelopeBuilder::new("app1", "ps1", "t")
            .content_type("application/octet-stream")
            .build(&[0xde, 0xad])
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&envelope.to_bytes().unwrap()).unwrap();
        assert_eq!(value["data_base64"], "3q0=");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn invalid_json_payload_is_an_error() {
        let result = EnvelopeBuilder::new("app1", "ps1", "t")
            .content_type("application/json")
            .build(b"not json");
        assert!(result.is_err());
    }

    #[test]
    fn ids_are_unique_per_build() {
        let a = EnvelopeBuilder::new("a", "p", "t").build(b"x").unwrap();
        let b = EnvelopeBuilder::new("a", "p", "t").build(b"x").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn reserved_extensions_are_dropped() {
        let envelope = EnvelopeBuilder::new("a", "p", "t")
            .extension("id", "override")
            .extension("priority", "high")
            .build(b"x")
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&envelope.to_bytes().unwrap()).unwrap();
        assert_ne!(value["id"], "override");
        assert_eq!(value["priority"], "high");
    }

    #[test]
    fn trace_fields_round_trip() {
        let tp = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";
        let envelope = EnvelopeBuilder::new("a", "p", "t")
            .trace(Some(tp.to_string()), Some("congo=t61rcWkgMzE".to_string()))
            .build(b"x")
            .unwrap();
        assert_eq!(envelope.traceparent(), Some(tp));
        assert_eq!(envelope.tracestate(), Some("congo=t61rcWkgMzE"));
    }
}
