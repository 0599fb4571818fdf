//! Error-reporting link: hands every failure that survived retry to an
//! observer, then propagates it unchanged.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::link::{Link, Next};
use crate::request::{GraphqlResponse, Operation, OperationKind};

/// What the observer learns about the failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    pub id: u64,
    pub kind: OperationKind,
    pub name: String,
}

impl From<&Operation> for OperationInfo {
    fn from(op: &Operation) -> Self {
        Self {
            id: op.id,
            kind: op.kind,
            name: op.name().to_string(),
        }
    }
}

/// Sink for failed operations (telemetry, UI notifications, tests).
pub trait ErrorObserver: Send + Sync + 'static {
    fn on_error(&self, op: &OperationInfo, error: &TransportError);
}

impl<F> ErrorObserver for F
where
    F: Fn(&OperationInfo, &TransportError) + Send + Sync + 'static,
{
    fn on_error(&self, op: &OperationInfo, error: &TransportError) {
        self(op, error)
    }
}

/// Default observer: one `tracing` error event per failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ErrorObserver for TracingObserver {
    fn on_error(&self, op: &OperationInfo, error: &TransportError) {
        match error {
            TransportError::Graphql(errors) => {
                for e in errors {
                    tracing::error!(id = op.id, operation = %op.name, "[GraphQL error]: {e}");
                }
            }
            other => {
                tracing::error!(
                    id = op.id,
                    kind = %op.kind,
                    operation = %op.name,
                    class = ?other.class(),
                    "request failed: {other}"
                );
            }
        }
    }
}

/// Reports errors to an [`ErrorObserver`] without altering them.
#[derive(Clone)]
pub struct ErrorLink {
    observer: Arc<dyn ErrorObserver>,
}

impl ErrorLink {
    pub fn new(observer: Arc<dyn ErrorObserver>) -> Self {
        Self { observer }
    }
}

impl Default for ErrorLink {
    fn default() -> Self {
        Self::new(Arc::new(TracingObserver))
    }
}

impl std::fmt::Debug for ErrorLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLink").finish_non_exhaustive()
    }
}

#[async_trait]
impl Link for ErrorLink {
    fn name(&self) -> &'static str {
        "error"
    }

    async fn request(
        &self,
        op: Operation,
        next: Next<'_>,
    ) -> Result<GraphqlResponse, TransportError> {
        let info = OperationInfo::from(&op);
        let final_attempt = op.final_attempt;
        let result = next.run(op).await;
        if let Err(ref e) = result {
            // a retry link above will try again; only the surviving error is reported
            if final_attempt || !e.is_transient() {
                self.observer.on_error(&info, e);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkChain;
    use crate::links::testing::{ok, CollectingObserver, Scripted};
    use crate::request::GraphqlRequest;

    #[tokio::test]
    async fn reports_failures_once() {
        let observer = Arc::new(CollectingObserver::default());
        let chain = LinkChain::from_links(vec![
            Arc::new(ErrorLink::new(observer.clone())),
            Arc::new(Scripted::new(vec![Err(TransportError::Request {
                status: 404,
                body: "not found".into(),
            })])),
        ]);
        let op = Operation::query(GraphqlRequest::new("{ x }").with_operation_name("X"));
        let err = chain.execute(op).await.unwrap_err();
        assert!(matches!(err, TransportError::Request { status: 404, .. }));

        let reports = observer.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0.name, "X");
        assert!(reports[0].1.contains("404"));
    }

    #[tokio::test]
    async fn success_is_not_reported() {
        let observer = Arc::new(CollectingObserver::default());
        let chain = LinkChain::from_links(vec![
            Arc::new(ErrorLink::new(observer.clone())),
            Arc::new(Scripted::new(vec![ok()])),
        ]);
        chain
            .execute(Operation::query(GraphqlRequest::new("{ x }")))
            .await
            .unwrap();
        assert!(observer.reports().is_empty());
    }

    #[tokio::test]
    async fn transient_failure_before_the_final_attempt_is_not_reported() {
        let observer = Arc::new(CollectingObserver::default());
        let chain = LinkChain::from_links(vec![
            Arc::new(ErrorLink::new(observer.clone())),
            Arc::new(Scripted::new(vec![
                Err(TransportError::Server { status: 503, body: "busy".into() }),
                Err(TransportError::Request { status: 400, body: "bad".into() }),
            ])),
        ]);

        let mut op = Operation::query(GraphqlRequest::new("{ x }"));
        op.final_attempt = false;
        assert!(chain.execute(op.clone()).await.is_err());
        assert!(observer.reports().is_empty());

        // permanent errors are reported whatever the attempt
        assert!(chain.execute(op).await.is_err());
        assert_eq!(observer.reports().len(), 1);
    }

    #[test]
    fn closures_are_observers() {
        let seen = Arc::new(std::sync::Mutex::new(0));
        let counter = seen.clone();
        let observer: Arc<dyn ErrorObserver> =
            Arc::new(move |_: &OperationInfo, _: &TransportError| {
                *counter.lock().unwrap() += 1;
            });
        let op = Operation::query(GraphqlRequest::new("{ x }"));
        observer.on_error(&OperationInfo::from(&op), &TransportError::Protocol("x".into()));
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
