//! Outermost link: turns raw connectivity failures into [`NetworkError`]s.

use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::{NetworkError, TransportError};
use crate::link::{Link, Next};
use crate::request::{GraphqlResponse, Operation};

/// Classifies low-level transport failures escaping the chain below it,
/// stamping them with the endpoint, operation name and time of failure.
///
/// Every other outcome passes through untouched.
#[derive(Debug, Clone)]
pub struct NetErrorLink {
    endpoint: String,
}

impl NetErrorLink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Link for NetErrorLink {
    fn name(&self) -> &'static str {
        "net-error"
    }

    async fn request(
        &self,
        op: Operation,
        next: Next<'_>,
    ) -> Result<GraphqlResponse, TransportError> {
        let operation = op.name().to_string();
        let id = op.id;
        match next.run(op).await {
            Err(TransportError::Transport { kind, message }) => {
                let err = NetworkError {
                    endpoint: self.endpoint.clone(),
                    kind,
                    message,
                    operation,
                    at: SystemTime::now(),
                };
                tracing::warn!(
                    id,
                    endpoint = %err.endpoint,
                    kind = %err.kind,
                    operation = %err.operation,
                    timestamp_ms = err.timestamp_ms() as u64,
                    "network error: {}",
                    err.message
                );
                Err(TransportError::Network(err))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::link::LinkChain;
    use crate::links::testing::Scripted;
    use crate::request::GraphqlRequest;
    use std::sync::Arc;

    fn chain(terminal: Scripted) -> LinkChain {
        LinkChain::from_links(vec![
            Arc::new(NetErrorLink::new("https://xapi.example/")),
            Arc::new(terminal),
        ])
    }

    #[tokio::test]
    async fn classifies_transport_failures() {
        let terminal = Scripted::new(vec![Err(TransportError::Transport {
            kind: FailureKind::ConnectionRefused,
            message: "tcp connect error".into(),
        })]);
        let op = Operation::query(
            GraphqlRequest::new("{ block { number } }").with_operation_name("Head"),
        );
        let err = chain(terminal).execute(op).await.unwrap_err();
        match err {
            TransportError::Network(net) => {
                assert_eq!(net.endpoint, "https://xapi.example/");
                assert_eq!(net.kind, FailureKind::ConnectionRefused);
                assert_eq!(net.operation, "Head");
                assert!(net.timestamp_ms() > 0);
            }
            other => panic!("expected Network, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn leaves_other_errors_alone() {
        let terminal = Scripted::new(vec![Err(TransportError::Request {
            status: 400,
            body: "bad".into(),
        })]);
        let err = chain(terminal)
            .execute(Operation::query(GraphqlRequest::new("{ x }")))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request { status: 400, .. }));
    }
}
