// Path: crates/runtime/src/propagation.rs
//! W3C trace context and baggage propagation across transport boundaries.
//!
//! The propagator extracts `traceparent`, `tracestate`, and `baggage` from
//! inbound request metadata and injects them into outgoing envelopes and
//! driver-bound metadata. Injection is idempotent for `baggage` (a driver-
//! provided value wins) while the trace pair is always refreshed to the
//! current call. Baggage is parsed strictly; a malformed value fails the
//! call before any side effect.

use portico_types::error::MetadataError;
use portico_types::metadata::{BAGGAGE_HEADER, TRACEPARENT_HEADER, TRACESTATE_HEADER};
use std::collections::HashMap;

/// The trace fields of one call, as extracted from request metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    /// The W3C `traceparent`, when present and well-formed.
    pub traceparent: Option<String>,
    /// The W3C `tracestate`, carried only alongside a valid `traceparent`.
    pub tracestate: Option<String>,
    /// Parsed baggage entries in submission order.
    pub baggage: Option<Baggage>,
}

/// A parsed W3C baggage list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baggage {
    entries: Vec<(String, String)>,
}

impl Baggage {
    /// Parses a `baggage` header value strictly.
    ///
    /// Every list member must be `key=value`, with a non-empty token key.
    /// Member properties (after `;`) are preserved verbatim in the value.
    pub fn parse(header: &str) -> Result<Self, MetadataError> {
        let mut entries = Vec::new();
        for member in header.split(',') {
            let member = member.trim();
            if member.is_empty() {
                return Err(MetadataError::MalformedBaggage(
                    "empty list member".to_string(),
                ));
            }
            let (key, value) = member.split_once('=').ok_or_else(|| {
                MetadataError::MalformedBaggage(format!("member without '=': {member}"))
            })?;
            let key = key.trim();
            if key.is_empty() || !is_token(key) {
                return Err(MetadataError::MalformedBaggage(format!(
                    "invalid key: {member}"
                )));
            }
            entries.push((key.to_string(), value.trim().to_string()));
        }
        Ok(Self { entries })
    }

    /// The parsed entries, in submission order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Re-serializes the baggage to its header form.
    pub fn to_header(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Extracts the trace fields from inbound request metadata.
///
/// A malformed `traceparent` is dropped (the call proceeds untraced); a
/// malformed `baggage` is a caller error and fails the call.
pub fn extract(metadata: &HashMap<String, String>) -> Result<TraceContext, MetadataError> {
    let traceparent = metadata
        .get(TRACEPARENT_HEADER)
        .filter(|value| {
            let ok = is_valid_traceparent(value);
            if !ok {
                tracing::debug!(traceparent = %value, "dropping malformed traceparent");
            }
            ok
        })
        .cloned();
    let tracestate = if traceparent.is_some() {
        metadata.get(TRACESTATE_HEADER).cloned()
    } else {
        None
    };
    let baggage = match metadata.get(BAGGAGE_HEADER) {
        Some(header) => Some(Baggage::parse(header)?),
        None => None,
    };
    Ok(TraceContext {
        traceparent,
        tracestate,
        baggage,
    })
}

/// Injects the trace fields into driver-bound metadata.
///
/// `traceparent`/`tracestate` are always refreshed to this call's values;
/// any other field (the baggage included) never overwrites a value the
/// driver pipeline already set.
pub fn inject(ctx: &TraceContext, metadata: &mut HashMap<String, String>) {
    match &ctx.traceparent {
        Some(traceparent) => {
            metadata.insert(TRACEPARENT_HEADER.to_string(), traceparent.clone());
            match &ctx.tracestate {
                Some(tracestate) => {
                    metadata.insert(TRACESTATE_HEADER.to_string(), tracestate.clone());
                }
                None => {
                    metadata.remove(TRACESTATE_HEADER);
                }
            }
        }
        None => {
            metadata.remove(TRACEPARENT_HEADER);
            metadata.remove(TRACESTATE_HEADER);
        }
    }
    if let Some(baggage) = &ctx.baggage {
        metadata
            .entry(BAGGAGE_HEADER.to_string())
            .or_insert_with(|| baggage.to_header());
    }
}

/// Validates a W3C version-00 `traceparent`:
/// `2 hex - 32 hex - 16 hex - 2 hex`, with non-zero trace and parent ids.
fn is_valid_traceparent(value: &str) -> bool {
    let mut parts = value.split('-');
    let (Some(version), Some(trace_id), Some(parent_id), Some(flags), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    is_lower_hex(version, 2)
        && version != "ff"
        && is_lower_hex(trace_id, 32)
        && trace_id.bytes().any(|b| b != b'0')
        && is_lower_hex(parent_id, 16)
        && parent_id.bytes().any(|b| b != b'0')
        && is_lower_hex(flags, 2)
}

fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len
        && s.bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

fn is_token(s: &str) -> bool {
    s.bytes().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                    | b'_' | b'`' | b'|' | b'~'
            )
    })
}
