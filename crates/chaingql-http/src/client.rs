//! Terminal GraphQL-over-HTTP link backed by `reqwest`.
//!
//! Outcome mapping:
//! - connect / DNS / timeout / reset → [`TransportError::Transport`]
//! - HTTP 5xx → [`TransportError::Server`]
//! - HTTP 4xx → [`TransportError::Request`]
//! - 2xx with a non-empty `errors` array → [`TransportError::Graphql`]
//! - 2xx with an unreadable body → [`TransportError::Deserialization`]

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use chaingql_core::error::{ConfigError, FailureKind, TransportError};
use chaingql_core::link::{Link, Next};
use chaingql_core::request::{GraphqlRequest, GraphqlResponse, Operation};

const MAX_BODY_LEN: usize = 2048;

/// Configuration for [`HttpLink`].
#[derive(Debug, Clone)]
pub struct HttpLinkConfig {
    /// Per-attempt timeout, covering connect and body.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpLinkConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("chaingql/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// POSTs operations to one GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct HttpLink {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpLink {
    /// Create a link for the given GraphQL endpoint URL.
    pub fn new(endpoint: impl Into<String>, config: HttpLinkConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    /// Create with default configuration.
    pub fn default_for(endpoint: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(endpoint, HttpLinkConfig::default())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one request, without any retry.
    pub async fn send(&self, req: &GraphqlRequest) -> Result<GraphqlResponse, TransportError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(req)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(transport_failure)?;

        if status.is_server_error() {
            return Err(TransportError::Server {
                status: status.as_u16(),
                body: truncate_body(&bytes),
            });
        }
        if !status.is_success() {
            return Err(TransportError::Request {
                status: status.as_u16(),
                body: truncate_body(&bytes),
            });
        }

        let body: GraphqlResponse = serde_json::from_slice(&bytes)?;
        if !body.errors.is_empty() {
            return Err(TransportError::Graphql(body.errors));
        }
        if body.data.is_none() {
            return Err(TransportError::Protocol(
                "response carries neither data nor errors".into(),
            ));
        }
        Ok(body)
    }
}

#[async_trait]
impl Link for HttpLink {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn request(
        &self,
        op: Operation,
        _next: Next<'_>,
    ) -> Result<GraphqlResponse, TransportError> {
        tracing::debug!(
            id = op.id,
            kind = %op.kind,
            operation = op.name(),
            url = %self.endpoint,
            "sending"
        );
        self.send(&op.request).await
    }
}

fn transport_failure(err: reqwest::Error) -> TransportError {
    TransportError::Transport {
        kind: failure_kind(&err),
        message: error_chain(&err),
    }
}

/// Map a reqwest error to the failure kind of its innermost cause.
pub(crate) fn failure_kind(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        return FailureKind::Timeout;
    }
    let chain = error_chain(err).to_ascii_lowercase();
    if chain.contains("dns") || chain.contains("lookup address") {
        return FailureKind::Dns;
    }
    match io_kind(err) {
        Some(std::io::ErrorKind::ConnectionRefused) => FailureKind::ConnectionRefused,
        Some(std::io::ErrorKind::TimedOut) => FailureKind::Timeout,
        Some(
            std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof,
        ) => FailureKind::ConnectionReset,
        _ if err.is_connect() => FailureKind::ConnectionRefused,
        _ if err.is_body() || err.is_request() => FailureKind::ConnectionReset,
        _ => FailureKind::Other,
    }
}

fn io_kind(err: &(dyn StdError + 'static)) -> Option<std::io::ErrorKind> {
    let mut source = err.source();
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = e.source();
    }
    None
}

/// `outer: inner: innermost`, the way reqwest errors read best in logs.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        text.push_str(": ");
        text.push_str(&e.to_string());
        source = e.source();
    }
    text
}

fn truncate_body(bytes: &[u8]) -> String {
    let mut body = String::from_utf8_lossy(bytes).into_owned();
    if body.len() > MAX_BODY_LEN {
        let mut cut = MAX_BODY_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}
