//! Scripted terminal link and collecting observer for link tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::link::{Link, Next};
use crate::links::{ErrorObserver, OperationInfo};
use crate::request::{GraphqlResponse, Operation};

pub(crate) fn ok() -> Result<GraphqlResponse, TransportError> {
    Ok(GraphqlResponse::from_data(serde_json::json!({ "__typename": "Query" })))
}

/// Terminal link replaying a fixed list of outcomes.
pub(crate) struct Scripted {
    outcomes: Mutex<VecDeque<Result<GraphqlResponse, TransportError>>>,
    calls: AtomicUsize,
}

impl Scripted {
    pub(crate) fn new(outcomes: Vec<Result<GraphqlResponse, TransportError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Link for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn request(
        &self,
        _op: Operation,
        _next: Next<'_>,
    ) -> Result<GraphqlResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Protocol("script exhausted".into())))
    }
}

#[derive(Default)]
pub(crate) struct CollectingObserver {
    reports: Mutex<Vec<(OperationInfo, String)>>,
}

impl CollectingObserver {
    pub(crate) fn reports(&self) -> Vec<(OperationInfo, String)> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorObserver for CollectingObserver {
    fn on_error(&self, op: &OperationInfo, error: &TransportError) {
        self.reports.lock().unwrap().push((op.clone(), error.to_string()));
    }
}
