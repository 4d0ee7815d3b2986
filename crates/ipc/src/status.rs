// Path: crates/ipc/src/status.rs
//! Mapping from the error taxonomy to transport status.
//!
//! The mapping is total and deterministic: every [`ErrorKind`] has exactly
//! one gRPC code, and the stable error code travels in response metadata so
//! callers on any transport can branch without parsing message text.

use portico_types::error::{Classified, ErrorCode, ErrorKind};
use tonic::metadata::MetadataValue;
use tonic::{Code, Status};

/// Metadata key carrying the stable taxonomy error code on error replies.
pub const ERROR_CODE_METADATA_KEY: &str = "portico-error-code";

/// The gRPC code for a taxonomy kind.
pub fn grpc_code(kind: ErrorKind) -> Code {
    match kind {
        ErrorKind::NotConfigured => Code::FailedPrecondition,
        ErrorKind::NotFound => Code::NotFound,
        ErrorKind::InvalidArgument => Code::InvalidArgument,
        ErrorKind::NotSupported => Code::Unimplemented,
        ErrorKind::Forbidden => Code::PermissionDenied,
        ErrorKind::ConditionFailed => Code::Aborted,
        ErrorKind::Serialization => Code::Internal,
        ErrorKind::Internal => Code::Internal,
        ErrorKind::Unavailable => Code::Unavailable,
        ErrorKind::DeadlineExceeded => Code::DeadlineExceeded,
        ErrorKind::Canceled => Code::Cancelled,
    }
}

/// Builds a rich `Status` from taxonomy parts.
pub fn from_parts(kind: ErrorKind, code: &'static str, message: String) -> Status {
    let mut status = Status::new(grpc_code(kind), message);
    if let Ok(value) = MetadataValue::try_from(code) {
        status
            .metadata_mut()
            .insert(ERROR_CODE_METADATA_KEY, value);
    }
    status
}

/// Builds a rich `Status` from any taxonomy error.
pub fn rich_status<E>(err: &E) -> Status
where
    E: Classified + ErrorCode + std::fmt::Display,
{
    from_parts(err.kind(), err.code(), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_types::error::StateError;

    #[test]
    fn mapping_is_total_and_stable() {
        assert_eq!(grpc_code(ErrorKind::NotConfigured), Code::FailedPrecondition);
        assert_eq!(grpc_code(ErrorKind::ConditionFailed), Code::Aborted);
        assert_eq!(grpc_code(ErrorKind::NotSupported), Code::Unimplemented);
        assert_eq!(grpc_code(ErrorKind::DeadlineExceeded), Code::DeadlineExceeded);
    }

    #[test]
    fn rich_status_carries_code_metadata() {
        let err = StateError::EtagMismatch {
            store: "s1".into(),
            message: "stored etag is 2".into(),
        };
        let status = rich_status(&err);
        assert_eq!(status.code(), Code::Aborted);
        assert_eq!(
            status
                .metadata()
                .get(ERROR_CODE_METADATA_KEY)
                .and_then(|v| v.to_str().ok()),
            Some("ERR_STATE_ETAG_MISMATCH")
        );
        assert!(status.message().contains("s1"));
    }
}
