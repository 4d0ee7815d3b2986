// Path: crates/types/src/metadata.rs
//! Request-metadata conventions shared across the request plane.
//!
//! Metadata is a flat `string → string` map riding alongside every request.
//! A handful of keys are interpreted by the gateway itself; everything else
//! passes through to the driver untouched.

use crate::error::MetadataError;
use std::collections::HashMap;

/// Metadata key suppressing envelope construction on publish.
pub const RAW_PAYLOAD_KEY: &str = "rawPayload";
/// Metadata key by which a caller marks a write as safely replayable.
pub const IDEMPOTENCY_KEY: &str = "Idempotency-Key";
/// W3C trace context header.
pub const TRACEPARENT_HEADER: &str = "traceparent";
/// W3C trace state header.
pub const TRACESTATE_HEADER: &str = "tracestate";
/// W3C baggage header.
pub const BAGGAGE_HEADER: &str = "baggage";

/// Stable prefix applied to reserved transport headers before they are
/// handed to a driver, so drivers observe a non-colliding namespace.
pub const RESERVED_PREFIX: &str = "portico-";

/// Transport header names that are remapped with [`RESERVED_PREFIX`] when
/// forwarded in driver-bound metadata. Trace headers are not in this list:
/// they are owned by the propagator, which refreshes them in place.
const RESERVED_HEADERS: &[&str] = &["grpc-trace-bin", "grpc-timeout", "content-type", ":authority"];

/// Reads the raw-payload flag from request metadata.
///
/// Absent means `false`. Any value other than `true`/`false`
/// (case-insensitive) is a caller error.
pub fn is_raw_payload(metadata: &HashMap<String, String>) -> Result<bool, MetadataError> {
    match metadata.get(RAW_PAYLOAD_KEY) {
        None => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(MetadataError::InvalidValue {
            key: RAW_PAYLOAD_KEY,
            value: v.clone(),
        }),
    }
}

/// Whether the caller signaled that a write is idempotent and therefore
/// replayable by the resiliency engine.
pub fn is_idempotent(metadata: &HashMap<String, String>) -> bool {
    metadata
        .get(IDEMPOTENCY_KEY)
        .is_some_and(|v| !v.is_empty())
}

/// Remaps reserved transport headers with [`RESERVED_PREFIX`] so the
/// driver-facing namespace cannot collide with transport internals. All
/// other keys pass through unchanged.
pub fn normalize_driver_metadata(metadata: &HashMap<String, String>) -> HashMap<String, String> {
    metadata
        .iter()
        .map(|(k, v)| {
            let key = if RESERVED_HEADERS.contains(&k.to_ascii_lowercase().as_str()) {
                format!("{RESERVED_PREFIX}{k}")
            } else {
                k.clone()
            };
            (key, v.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn raw_payload_parses_strictly() {
        assert!(!is_raw_payload(&md(&[])).unwrap());
        assert!(is_raw_payload(&md(&[(RAW_PAYLOAD_KEY, "true")])).unwrap());
        assert!(is_raw_payload(&md(&[(RAW_PAYLOAD_KEY, "TRUE")])).unwrap());
        assert!(!is_raw_payload(&md(&[(RAW_PAYLOAD_KEY, "false")])).unwrap());
        assert!(is_raw_payload(&md(&[(RAW_PAYLOAD_KEY, "yes")])).is_err());
    }

    #[test]
    fn reserved_headers_are_prefixed() {
        let normalized = normalize_driver_metadata(&md(&[
            ("grpc-timeout", "5s"),
            ("x-custom", "1"),
        ]));
        assert_eq!(normalized.get("portico-grpc-timeout").unwrap(), "5s");
        assert_eq!(normalized.get("x-custom").unwrap(), "1");
        assert!(!normalized.contains_key("grpc-timeout"));
    }

    #[test]
    fn idempotency_flag() {
        assert!(is_idempotent(&md(&[(IDEMPOTENCY_KEY, "abc")])));
        assert!(!is_idempotent(&md(&[(IDEMPOTENCY_KEY, "")])));
        assert!(!is_idempotent(&md(&[])));
    }
}
