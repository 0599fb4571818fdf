//! The three non-terminal links of the explorer's transport pipeline.
//!
//! Assembled outermost-first, ahead of a terminal HTTP link:
//! ```text
//! Operation → [NetErrorLink] → [RetryLink] → [ErrorLink] → [HttpLink]
//! ```
//! Errors flow back out in reverse: the error link reports what the HTTP
//! link produced, the retry link decides whether to try again, and the
//! network-error link classifies connectivity failures that are left over.

pub mod error;
pub mod net_error;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ErrorLink, ErrorObserver, OperationInfo, TracingObserver};
pub use net_error::NetErrorLink;
pub use retry::RetryLink;

#[cfg(test)]
mod tests {
    use super::testing::{ok, CollectingObserver, Scripted};
    use super::*;
    use crate::error::FailureKind;
    use crate::link::{Link, LinkChain};
    use crate::policy::RetryConfig;
    use crate::request::{GraphqlRequest, Operation};
    use crate::TransportError;
    use std::sync::Arc;
    use std::time::Duration;

    fn retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            multiplier: 2.0,
            jitter_fraction: 0.0,
        }
    }

    fn refused() -> Result<crate::GraphqlResponse, TransportError> {
        Err(TransportError::Transport {
            kind: FailureKind::ConnectionRefused,
            message: "connection refused".into(),
        })
    }

    fn full_chain(
        terminal: Arc<dyn Link>,
        observer: Arc<CollectingObserver>,
        max_attempts: u32,
    ) -> LinkChain {
        LinkChain::from_links(vec![
            Arc::new(NetErrorLink::new("https://xapi.example/")),
            Arc::new(RetryLink::new(retry(max_attempts))),
            Arc::new(ErrorLink::new(observer)),
            terminal,
        ])
    }

    fn op() -> Operation {
        Operation::query(
            GraphqlRequest::new("{ blocks { totalCount } }").with_operation_name("Blocks"),
        )
    }

    #[tokio::test]
    async fn recovered_request_is_not_reported() {
        let observer = Arc::new(CollectingObserver::default());
        let terminal = Arc::new(Scripted::new(vec![refused(), refused(), ok()]));
        let chain = full_chain(terminal.clone(), observer.clone(), 3);

        assert!(chain.execute(op()).await.is_ok());
        assert_eq!(terminal.calls(), 3);
        assert!(observer.reports().is_empty());
    }

    #[tokio::test]
    async fn exhausted_request_is_reported_once_and_fails_classified() {
        let observer = Arc::new(CollectingObserver::default());
        let terminal = Arc::new(Scripted::new(vec![
            refused(),
            refused(),
            Err(TransportError::Transport {
                kind: FailureKind::Timeout,
                message: "last attempt timed out".into(),
            }),
        ]));
        let chain = full_chain(terminal.clone(), observer.clone(), 3);

        let err = chain.execute(op()).await.unwrap_err();
        match err {
            TransportError::Network(net) => {
                assert_eq!(net.kind, FailureKind::Timeout);
                assert_eq!(net.endpoint, "https://xapi.example/");
            }
            other => panic!("expected Network, got {other:?}"),
        }
        assert_eq!(terminal.calls(), 3);

        let reports = observer.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0.name, "Blocks");
        assert!(reports[0].1.contains("last attempt timed out"));
    }

    #[tokio::test]
    async fn non_retryable_error_is_reported_and_propagated_immediately() {
        let observer = Arc::new(CollectingObserver::default());
        let terminal = Arc::new(Scripted::new(vec![
            Err(TransportError::Request {
                status: 400,
                body: "Syntax Error".into(),
            }),
            ok(),
        ]));
        let chain = full_chain(terminal.clone(), observer.clone(), 5);

        let err = chain.execute(op()).await.unwrap_err();
        assert!(matches!(err, TransportError::Request { status: 400, .. }));
        assert_eq!(terminal.calls(), 1);
        assert_eq!(observer.reports().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_keep_separate_attempt_counters() {
        let observer = Arc::new(CollectingObserver::default());
        // two refusals shared between two requests; each must recover within
        // its own three attempts
        let terminal = Arc::new(Scripted::new(vec![
            refused(),
            refused(),
            ok(),
            ok(),
        ]));
        let chain = full_chain(terminal.clone(), observer.clone(), 3);

        let (a, b) = futures::future::join(chain.execute(op()), chain.execute(op())).await;
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(terminal.calls(), 4);
        assert!(observer.reports().is_empty());
    }
}
