//! The `Link` trait: one composable stage of a GraphQL request pipeline.
//!
//! A [`LinkChain`] is an ordered list of links. Each non-terminal link gets a
//! [`Next`] handle for the rest of the chain and decides whether, when, and how
//! often to call it; the terminal link ignores `Next` and performs I/O.
//!
//! ```text
//! Operation → [NetErrorLink] → [RetryLink] → [ErrorLink] → [HttpLink]
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{GraphqlResponse, Operation};

/// A request-processing middleware stage.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn Link>`.
#[async_trait]
pub trait Link: Send + Sync + 'static {
    /// Short stage name used in logs.
    fn name(&self) -> &'static str;

    /// Process `op`, delegating to `next` for the remainder of the chain.
    async fn request(
        &self,
        op: Operation,
        next: Next<'_>,
    ) -> Result<GraphqlResponse, TransportError>;
}

/// The remainder of a chain below the current link.
///
/// `Next` is `Copy`, so a link may invoke it more than once (the retry link
/// does).
#[derive(Clone, Copy)]
pub struct Next<'a> {
    links: &'a [Arc<dyn Link>],
}

impl<'a> Next<'a> {
    /// Run `op` through the remaining links.
    pub async fn run(self, op: Operation) -> Result<GraphqlResponse, TransportError> {
        match self.links.split_first() {
            Some((head, rest)) => head.request(op, Next { links: rest }).await,
            None => Err(TransportError::Protocol(
                "link chain has no terminating link".into(),
            )),
        }
    }

    /// Number of links left below the caller.
    pub fn remaining(&self) -> usize {
        self.links.len()
    }
}

/// An ordered, immutable link pipeline.
#[derive(Clone, Default)]
pub struct LinkChain {
    links: Vec<Arc<dyn Link>>,
}

impl LinkChain {
    /// Compose links, outermost first.
    pub fn from_links(links: Vec<Arc<dyn Link>>) -> Self {
        Self { links }
    }

    /// Stage names, outermost first.
    pub fn names(&self) -> Vec<&'static str> {
        self.links.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Execute one operation through the whole chain.
    pub async fn execute(&self, op: Operation) -> Result<GraphqlResponse, TransportError> {
        Next { links: &self.links }.run(op).await
    }
}

impl std::fmt::Debug for LinkChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
