//! Configuration and transport error types.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::request::GraphqlError;

/// Invalid or missing provider configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("provider list is empty")]
    EmptyPool,

    #[error("provider #{index} has no HTTP endpoint")]
    MissingHttpEndpoint { index: usize },

    #[error("provider #{index} has an unusable HTTP endpoint '{url}': {reason}")]
    InvalidEndpoint {
        index: usize,
        url: String,
        reason: String,
    },

    #[error("provider index {index} out of bounds for a pool of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid provider index '{0}': expected a number or \"random\"")]
    InvalidSelection(String),

    #[error("invalid retry setting '{field}': {reason}")]
    InvalidRetry { field: &'static str, reason: String },

    #[error("useTestnet is set but no testnet providers are configured")]
    MissingTestnet,

    #[error("a client named '{name}' is already registered")]
    DuplicateClient { name: String },

    #[error("default client already set to '{existing}'")]
    DuplicateDefault { existing: String },

    #[error("no default client registered")]
    MissingDefaultClient,

    #[error("failed to read settings from {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Low-level connectivity failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Dns,
    ConnectionRefused,
    Timeout,
    ConnectionReset,
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dns => write!(f, "dns"),
            Self::ConnectionRefused => write!(f, "connection refused"),
            Self::Timeout => write!(f, "timeout"),
            Self::ConnectionReset => write!(f, "connection reset"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A connectivity failure with the context needed to diagnose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
    pub endpoint: String,
    pub kind: FailureKind,
    pub message: String,
    pub operation: String,
    pub at: SystemTime,
}

impl NetworkError {
    /// Milliseconds since the unix epoch at which the failure was classified.
    pub fn timestamp_ms(&self) -> u128 {
        self.at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }
}

/// Coarse error class used by the retry link and by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Endpoint unreachable, timed out, or the connection dropped.
    Network,
    /// 5xx response.
    Server,
    /// 4xx response, GraphQL errors or an unreadable body.
    Request,
}

/// Errors that can occur while an operation travels through a link chain.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Unclassified connectivity failure straight from the HTTP layer.
    #[error("transport failure ({kind}): {message}")]
    Transport { kind: FailureKind, message: String },

    /// Connectivity failure classified by the network-error link.
    #[error(
        "network error ({}) reaching {} during '{}': {}",
        .0.kind,
        .0.endpoint,
        .0.operation,
        .0.message
    )]
    Network(NetworkError),

    /// 5xx-class response.
    #[error("server error HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// 4xx-class response.
    #[error("request rejected with HTTP {status}: {body}")]
    Request { status: u16, body: String },

    /// The provider answered with a GraphQL `errors` array.
    #[error("GraphQL errors: {}", join_messages(.0))]
    Graphql(Vec<GraphqlError>),

    /// Response body could not be deserialized.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Chain misuse or a response that violates the GraphQL-over-HTTP contract.
    #[error("protocol error: {0}")]
    Protocol(String),
}

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TransportError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Transport { .. } | Self::Network(_) => ErrorClass::Network,
            Self::Server { .. } => ErrorClass::Server,
            Self::Request { .. }
            | Self::Graphql(_)
            | Self::Deserialization(_)
            | Self::Protocol(_) => ErrorClass::Request,
        }
    }

    /// Returns `true` if a retry may succeed (network or 5xx).
    pub fn is_transient(&self) -> bool {
        matches!(self.class(), ErrorClass::Network | ErrorClass::Server)
    }

    /// Returns `true` for failures that never reached a GraphQL executor.
    pub fn is_network(&self) -> bool {
        self.class() == ErrorClass::Network
    }
}
