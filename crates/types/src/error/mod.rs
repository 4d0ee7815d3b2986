// Path: crates/types/src/error/mod.rs
//! The stable error taxonomy for the Portico request plane.
//!
//! Every building block maps driver failures into one of a small set of
//! [`ErrorKind`]s at the gateway boundary, exactly once. The enums here are
//! the only error types that cross a crate boundary; their display strings
//! are the templated messages surfaced to callers, and their [`ErrorCode`]
//! strings are stable identifiers that never change once shipped.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// A trait classifying an error into the stable [`ErrorKind`] taxonomy.
pub trait Classified {
    /// The taxonomy kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// The transport-independent classification of a request-plane failure.
///
/// Kinds are deliberately coarse: callers branch on the kind, log the
/// message, and never parse message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The building block has no component registered at all.
    NotConfigured,
    /// The named component (or key, or subscription) does not exist.
    NotFound,
    /// The request itself is malformed; no side effect occurred.
    InvalidArgument,
    /// The component exists but lacks the required capability.
    NotSupported,
    /// The component rejected the call on authorization grounds.
    Forbidden,
    /// An optimistic-concurrency precondition (etag) did not hold.
    ConditionFailed,
    /// Payload serialization or deserialization failed.
    Serialization,
    /// An unclassified component failure.
    Internal,
    /// The component or the gateway is (temporarily) unable to serve.
    Unavailable,
    /// The per-call wall-clock budget elapsed.
    DeadlineExceeded,
    /// The caller abandoned the call.
    Canceled,
}

impl ErrorKind {
    /// A lowercase label used in metrics and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::NotSupported => "not_supported",
            Self::Forbidden => "forbidden",
            Self::ConditionFailed => "condition_failed",
            Self::Serialization => "serialization",
            Self::Internal => "internal",
            Self::Unavailable => "unavailable",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Canceled => "canceled",
        }
    }
}

/// A failure reported by a component driver, before gateway mapping.
///
/// Drivers return this type from every trait method. The resiliency engine
/// consults [`DriverError::is_retryable`] to decide whether an attempt may
/// be replayed; the gateway maps the final outcome into the per-building-
/// block enums below.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The requested entity does not exist in the component.
    #[error("not found: {0}")]
    NotFound(String),
    /// A compare-and-swap precondition failed: the stored etag differs.
    #[error("etag mismatch: {0}")]
    EtagMismatch(String),
    /// The supplied etag is not a token the component can interpret.
    #[error("invalid etag: {0}")]
    EtagInvalid(String),
    /// The component denied the operation (broker ACL, store policy).
    #[error("permission denied: {0}")]
    Forbidden(String),
    /// The component is temporarily unreachable or overloaded.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The driver-level call exceeded its own deadline.
    #[error("driver timed out")]
    Timeout,
    /// A failure the driver has explicitly marked as safe to retry.
    #[error("transient: {0}")]
    Transient(String),
    /// The payload could not be encoded or decoded by the driver.
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// The driver does not implement the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// The caller went away while the driver call was in flight.
    #[error("canceled")]
    Canceled,
    /// Any other driver failure. Never retried.
    #[error("{0}")]
    Internal(String),
}

impl DriverError {
    /// Whether the resiliency engine may replay an attempt after this
    /// failure. The set is finite and closed: transient network conditions,
    /// unavailability, and failures the driver itself marked retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Timeout | Self::Transient(_)
        )
    }

    /// The taxonomy kind this driver failure maps to when no call-site
    /// template applies.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::EtagMismatch(_) => ErrorKind::ConditionFailed,
            Self::EtagInvalid(_) => ErrorKind::InvalidArgument,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::Timeout => ErrorKind::DeadlineExceeded,
            Self::Transient(_) => ErrorKind::Unavailable,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Unsupported(_) => ErrorKind::NotSupported,
            Self::Canceled => ErrorKind::Canceled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl Classified for DriverError {
    fn kind(&self) -> ErrorKind {
        DriverError::kind(self)
    }
}

impl ErrorCode for DriverError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "DRIVER_NOT_FOUND",
            Self::EtagMismatch(_) => "DRIVER_ETAG_MISMATCH",
            Self::EtagInvalid(_) => "DRIVER_ETAG_INVALID",
            Self::Forbidden(_) => "DRIVER_FORBIDDEN",
            Self::Unavailable(_) => "DRIVER_UNAVAILABLE",
            Self::Timeout => "DRIVER_TIMEOUT",
            Self::Transient(_) => "DRIVER_TRANSIENT",
            Self::Serialization(_) => "DRIVER_SERIALIZATION",
            Self::Unsupported(_) => "DRIVER_UNSUPPORTED",
            Self::Canceled => "DRIVER_CANCELED",
            Self::Internal(_) => "DRIVER_INTERNAL",
        }
    }
}

/// Errors surfaced by the publish/subscribe building block.
#[derive(Debug, Error)]
pub enum PubSubError {
    /// No pub/sub component is registered in this process.
    #[error("no pubsub component is configured")]
    NotConfigured,
    /// The named pub/sub component is not registered.
    #[error("pubsub {0} not found")]
    NotFound(String),
    /// The request did not name a pub/sub component.
    #[error("pubsub name is empty")]
    NameEmpty,
    /// The request did not name a topic.
    #[error("topic is empty in pubsub {0}")]
    TopicEmpty(String),
    /// The broker denied publishing to the topic.
    #[error("topic {topic} is not allowed for app {app_id}")]
    Forbidden {
        /// The topic that was denied.
        topic: String,
        /// The application the denial applies to.
        app_id: String,
    },
    /// The event envelope could not be serialized.
    #[error("error when marshalling cloud event envelope for topic {topic}: {message}")]
    Serialization {
        /// The topic of the event that failed to serialize.
        topic: String,
        /// The serializer's message.
        message: String,
    },
    /// The broker rejected or failed the publish.
    #[error("error when publishing to topic {topic} in pubsub {pubsub}: {message}")]
    PublishFailed {
        /// The pub/sub component name.
        pubsub: String,
        /// The destination topic.
        topic: String,
        /// The upstream message.
        message: String,
    },
    /// The raw-payload flag was set for a broker that cannot take it.
    #[error("pubsub {0} does not support raw payloads")]
    RawPayloadNotSupported(String),
    /// Two entries in one bulk request share an entry id.
    #[error("duplicate entry id {0} in bulk publish request")]
    DuplicateEntryId(String),
    /// A bulk entry was submitted without an entry id.
    #[error("empty entry id in bulk publish request")]
    EmptyEntryId,
}

impl Classified for PubSubError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NameEmpty | Self::TopicEmpty(_) => ErrorKind::InvalidArgument,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::PublishFailed { .. } => ErrorKind::Internal,
            Self::RawPayloadNotSupported(_) => ErrorKind::NotSupported,
            Self::DuplicateEntryId(_) | Self::EmptyEntryId => ErrorKind::InvalidArgument,
        }
    }
}

impl ErrorCode for PubSubError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "ERR_PUBSUB_NOT_CONFIGURED",
            Self::NotFound(_) => "ERR_PUBSUB_NOT_FOUND",
            Self::NameEmpty => "ERR_PUBSUB_EMPTY",
            Self::TopicEmpty(_) => "ERR_TOPIC_EMPTY",
            Self::Forbidden { .. } => "ERR_PUBSUB_FORBIDDEN",
            Self::Serialization { .. } => "ERR_PUBSUB_CLOUD_EVENTS_SER",
            Self::PublishFailed { .. } => "ERR_PUBSUB_PUBLISH_MESSAGE",
            Self::RawPayloadNotSupported(_) => "ERR_PUBSUB_RAW_PAYLOAD_NOT_SUPPORTED",
            Self::DuplicateEntryId(_) | Self::EmptyEntryId => "ERR_PUBSUB_EVENTS_SER",
        }
    }
}

/// Errors surfaced by the state building block.
#[derive(Debug, Error)]
pub enum StateError {
    /// No state store component is registered in this process.
    #[error("state store is not configured")]
    NotConfigured,
    /// The named state store is not registered.
    #[error("state store {0} is not found")]
    NotFound(String),
    /// A state operation was submitted with an empty key.
    #[error("state key is empty")]
    KeyEmpty,
    /// The stored etag does not match the supplied one.
    #[error("possible etag mismatch. error from state store {store}: {message}")]
    EtagMismatch {
        /// The state store name.
        store: String,
        /// The upstream message.
        message: String,
    },
    /// The supplied etag could not be interpreted by the store.
    #[error("invalid etag value: {message}")]
    EtagInvalid {
        /// The upstream message.
        message: String,
    },
    /// The store does not advertise transactional capability.
    #[error("state store {0} doesn't support transactions")]
    TransactionsNotSupported(String),
    /// A transaction carried an operation type the gateway does not know.
    #[error("operation type {0} is not supported")]
    UnknownOperation(String),
    /// The transactional operation list exceeds the store's bound.
    #[error(
        "the transaction contains {count} operations, which is more than what the state store supports: {max}"
    )]
    TooManyTransactionalOps {
        /// Operations submitted by the caller.
        count: usize,
        /// The store's advertised maximum.
        max: usize,
    },
    /// A read failed in the store.
    #[error("fail to get {key} from state store {store}: {message}")]
    GetFailed {
        /// The state store name.
        store: String,
        /// The logical key.
        key: String,
        /// The upstream message.
        message: String,
    },
    /// A write failed in the store.
    #[error("failed saving state in state store {store}: {message}")]
    SaveFailed {
        /// The state store name.
        store: String,
        /// The upstream message.
        message: String,
    },
    /// A delete failed in the store.
    #[error("failed deleting state with key {key}: {message}")]
    DeleteFailed {
        /// The logical key.
        key: String,
        /// The upstream message.
        message: String,
    },
    /// A transactional commit failed in the store.
    #[error("error while executing state transaction: {message}")]
    TransactionFailed {
        /// The upstream message.
        message: String,
    },
}

impl Classified for StateError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::KeyEmpty => ErrorKind::InvalidArgument,
            Self::EtagMismatch { .. } => ErrorKind::ConditionFailed,
            Self::EtagInvalid { .. } => ErrorKind::InvalidArgument,
            Self::TransactionsNotSupported(_) => ErrorKind::NotSupported,
            Self::UnknownOperation(_) => ErrorKind::InvalidArgument,
            Self::TooManyTransactionalOps { .. } => ErrorKind::InvalidArgument,
            Self::GetFailed { .. }
            | Self::SaveFailed { .. }
            | Self::DeleteFailed { .. }
            | Self::TransactionFailed { .. } => ErrorKind::Internal,
        }
    }
}

impl StateError {
    /// Folds a driver failure into the state taxonomy for a single-key
    /// operation, applying the etag special cases.
    pub fn from_driver(store: &str, key: &str, err: DriverError) -> Self {
        match err {
            DriverError::EtagMismatch(message) => Self::EtagMismatch {
                store: store.to_string(),
                message,
            },
            DriverError::EtagInvalid(message) => Self::EtagInvalid { message },
            other => Self::GetFailed {
                store: store.to_string(),
                key: key.to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "ERR_STATE_STORE_NOT_CONFIGURED",
            Self::NotFound(_) => "ERR_STATE_STORE_NOT_FOUND",
            Self::KeyEmpty => "ERR_MALFORMED_REQUEST",
            Self::EtagMismatch { .. } => "ERR_STATE_ETAG_MISMATCH",
            Self::EtagInvalid { .. } => "ERR_STATE_ETAG_INVALID",
            Self::TransactionsNotSupported(_) => "ERR_STATE_STORE_NOT_SUPPORTED",
            Self::UnknownOperation(_) => "ERR_NOT_SUPPORTED_STATE_OPERATION",
            Self::TooManyTransactionalOps { .. } => "ERR_STATE_TRANSACTION_TOO_MANY_OPS",
            Self::GetFailed { .. } => "ERR_STATE_GET",
            Self::SaveFailed { .. } => "ERR_STATE_SAVE",
            Self::DeleteFailed { .. } => "ERR_STATE_DELETE",
            Self::TransactionFailed { .. } => "ERR_STATE_TRANSACTION",
        }
    }
}

/// Errors surfaced by the output-binding building block.
#[derive(Debug, Error)]
pub enum BindingError {
    /// No output binding is registered under the requested name.
    #[error("couldn't find output binding {0}")]
    NotFound(String),
    /// The binding driver failed the invocation.
    #[error("error invoking output binding {name}: {message}")]
    InvokeFailed {
        /// The binding name.
        name: String,
        /// The upstream message.
        message: String,
    },
}

impl Classified for BindingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvokeFailed { .. } => ErrorKind::Internal,
        }
    }
}

impl ErrorCode for BindingError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ERR_INVOKE_OUTPUT_BINDING",
            Self::InvokeFailed { .. } => "ERR_INVOKE_OUTPUT_BINDING",
        }
    }
}

/// Errors surfaced by the configuration building block.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No configuration store component is registered in this process.
    #[error("configuration store is not configured")]
    NotConfigured,
    /// The named configuration store is not registered.
    #[error("configuration store {0} not found")]
    NotFound(String),
    /// A one-shot read failed in the store.
    #[error("failed to get {keys:?} from configuration store {store}: {message}")]
    GetFailed {
        /// The configuration store name.
        store: String,
        /// The requested keys.
        keys: Vec<String>,
        /// The upstream message.
        message: String,
    },
    /// Establishing the subscription failed in the store.
    #[error("failed to subscribe {keys:?} from configuration store {store}: {message}")]
    SubscribeFailed {
        /// The configuration store name.
        store: String,
        /// The requested keys.
        keys: Vec<String>,
        /// The upstream message.
        message: String,
    },
    /// No live subscription carries the given id.
    #[error("subscription with id {0} does not exist")]
    SubscriptionNotFound(String),
    /// Driver-side unsubscribe failed.
    #[error("failed to unsubscribe from configuration store {store}: {message}")]
    UnsubscribeFailed {
        /// The configuration store name.
        store: String,
        /// The upstream message.
        message: String,
    },
}

impl Classified for ConfigurationError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::GetFailed { .. } => ErrorKind::Internal,
            Self::SubscribeFailed { .. } => ErrorKind::Internal,
            Self::SubscriptionNotFound(_) => ErrorKind::NotFound,
            Self::UnsubscribeFailed { .. } => ErrorKind::Internal,
        }
    }
}

impl ErrorCode for ConfigurationError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "ERR_CONFIGURATION_STORE_NOT_CONFIGURED",
            Self::NotFound(_) => "ERR_CONFIGURATION_STORE_NOT_FOUND",
            Self::GetFailed { .. } => "ERR_CONFIGURATION_GET",
            Self::SubscribeFailed { .. } => "ERR_CONFIGURATION_SUBSCRIBE",
            Self::SubscriptionNotFound(_) => "ERR_CONFIGURATION_UNSUBSCRIBE",
            Self::UnsubscribeFailed { .. } => "ERR_CONFIGURATION_UNSUBSCRIBE",
        }
    }
}

/// Errors surfaced by the secret building block.
#[derive(Debug, Error)]
pub enum SecretError {
    /// No secret store component is registered in this process.
    #[error("secret store is not configured")]
    NotConfigured,
    /// The named secret store is not registered.
    #[error("failed finding secret store with key {0}")]
    NotFound(String),
    /// Access to the secret was denied by scope configuration.
    #[error("access denied by policy to get {key} from {store}")]
    Forbidden {
        /// The secret store name.
        store: String,
        /// The secret key.
        key: String,
    },
    /// The store failed to produce the secret.
    #[error("failed getting secret with key {key} from secret store {store}: {message}")]
    GetFailed {
        /// The secret store name.
        store: String,
        /// The secret key.
        key: String,
        /// The upstream message.
        message: String,
    },
}

impl Classified for SecretError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::GetFailed { .. } => ErrorKind::Internal,
        }
    }
}

impl ErrorCode for SecretError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "ERR_SECRET_STORES_NOT_CONFIGURED",
            Self::NotFound(_) => "ERR_SECRET_STORE_NOT_FOUND",
            Self::Forbidden { .. } => "ERR_PERMISSION_DENIED",
            Self::GetFailed { .. } => "ERR_SECRET_GET",
        }
    }
}

/// Errors surfaced by the actor building block.
#[derive(Debug, Error)]
pub enum ActorError {
    /// No actor runtime collaborator was wired into the gateway.
    #[error("the actor runtime is not configured")]
    NotConfigured,
    /// Reading actor state failed.
    #[error("error getting actor state: {0}")]
    GetStateFailed(String),
    /// Committing an actor state transaction failed.
    #[error("error executing actor state transaction: {0}")]
    TransactionFailed(String),
    /// Invoking the actor failed.
    #[error("error invoke actor method: {0}")]
    InvokeFailed(String),
    /// The actor transaction contained an operation the runtime does not know.
    #[error("unsupported actor transaction operation: {0}")]
    UnsupportedOperation(String),
}

impl Classified for ActorError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::GetStateFailed(_) | Self::TransactionFailed(_) | Self::InvokeFailed(_) => {
                ErrorKind::Internal
            }
            Self::UnsupportedOperation(_) => ErrorKind::InvalidArgument,
        }
    }
}

impl ErrorCode for ActorError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "ERR_ACTOR_RUNTIME_NOT_FOUND",
            Self::GetStateFailed(_) => "ERR_ACTOR_STATE_GET",
            Self::TransactionFailed(_) => "ERR_ACTOR_STATE_TRANSACTION_SAVE",
            Self::InvokeFailed(_) => "ERR_ACTOR_INVOKE_METHOD",
            Self::UnsupportedOperation(_) => "ERR_MALFORMED_REQUEST",
        }
    }
}

/// Errors surfaced by the legacy direct-invocation building block.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// No direct invoker collaborator was wired into the gateway.
    #[error("direct invocation is not configured")]
    NotConfigured,
    /// The request did not name a target application.
    #[error("missing remote app id in request")]
    AppIdEmpty,
    /// The upstream application failed the call.
    #[error("fail to invoke, id: {id}, err: {message}")]
    InvokeFailed {
        /// The target application id.
        id: String,
        /// The upstream message.
        message: String,
    },
}

impl Classified for InvocationError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::AppIdEmpty => ErrorKind::InvalidArgument,
            Self::InvokeFailed { .. } => ErrorKind::Internal,
        }
    }
}

impl ErrorCode for InvocationError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "ERR_DIRECT_INVOKE",
            Self::AppIdEmpty => "ERR_MALFORMED_REQUEST",
            Self::InvokeFailed { .. } => "ERR_DIRECT_INVOKE",
        }
    }
}

/// Errors raised by request-metadata parsing, before any side effect.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The `baggage` header did not parse as a W3C baggage list.
    #[error("invalid baggage header: {0}")]
    MalformedBaggage(String),
    /// The `traceparent` header did not parse as W3C version 00.
    #[error("invalid traceparent header: {0}")]
    MalformedTraceparent(String),
    /// A gateway-interpreted metadata key carried an unparseable value.
    #[error("invalid value {value} for metadata key {key}")]
    InvalidValue {
        /// The metadata key.
        key: &'static str,
        /// The offending value.
        value: String,
    },
}

impl Classified for MetadataError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

impl ErrorCode for MetadataError {
    fn code(&self) -> &'static str {
        match self {
            Self::MalformedBaggage(_) => "ERR_MALFORMED_BAGGAGE",
            Self::MalformedTraceparent(_) => "ERR_MALFORMED_TRACEPARENT",
            Self::InvalidValue { .. } => "ERR_MALFORMED_REQUEST",
        }
    }
}

/// Errors raised by the gateway lifecycle itself.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The gateway has been closed; all in-flight calls drain with this.
    #[error("the runtime is shutting down")]
    Closed,
}

impl Classified for RuntimeError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Unavailable
    }
}

impl ErrorCode for RuntimeError {
    fn code(&self) -> &'static str {
        "ERR_RUNTIME_CLOSED"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_set_is_closed() {
        assert!(DriverError::Unavailable("down".into()).is_retryable());
        assert!(DriverError::Timeout.is_retryable());
        assert!(DriverError::Transient("flake".into()).is_retryable());

        assert!(!DriverError::EtagMismatch("v2".into()).is_retryable());
        assert!(!DriverError::EtagInvalid("bad".into()).is_retryable());
        assert!(!DriverError::NotFound("k".into()).is_retryable());
        assert!(!DriverError::Forbidden("no".into()).is_retryable());
        assert!(!DriverError::Canceled.is_retryable());
        assert!(!DriverError::Internal("boom".into()).is_retryable());
    }

    #[test]
    fn etag_mapping_is_deterministic() {
        let err = StateError::from_driver("store", "k", DriverError::EtagMismatch("v2".into()));
        assert_eq!(err.kind(), ErrorKind::ConditionFailed);
        assert_eq!(err.code(), "ERR_STATE_ETAG_MISMATCH");

        let err = StateError::from_driver("store", "k", DriverError::EtagInvalid("junk".into()));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = StateError::from_driver("store", "k", DriverError::Internal("io".into()));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(PubSubError::NotConfigured.code(), "ERR_PUBSUB_NOT_CONFIGURED");
        assert_eq!(
            StateError::NotConfigured.code(),
            "ERR_STATE_STORE_NOT_CONFIGURED"
        );
        assert_eq!(
            ConfigurationError::NotFound("cs".into()).code(),
            "ERR_CONFIGURATION_STORE_NOT_FOUND"
        );
    }
}
