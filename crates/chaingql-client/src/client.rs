//! GraphQL client over an assembled link chain.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use chaingql_core::error::TransportError;
use chaingql_core::link::LinkChain;
use chaingql_core::request::{GraphqlRequest, GraphqlResponse, Operation};

use crate::cache::ResponseCache;

/// How a query consults the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Always hit the network; store the result.
    #[default]
    NetworkOnly,
    /// Serve from cache when present, otherwise fetch and store.
    CacheFirst,
    /// Always hit the network; never touch the cache.
    NoCache,
}

/// A named GraphQL client bound to one endpoint.
pub struct GraphqlClient {
    name: String,
    endpoint: String,
    chain: LinkChain,
    cache: Arc<ResponseCache>,
    default_fetch_policy: FetchPolicy,
}

impl GraphqlClient {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, chain: LinkChain) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            chain,
            cache: Arc::new(ResponseCache::new()),
            default_fetch_policy: FetchPolicy::default(),
        }
    }

    pub fn with_fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.default_fetch_policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// HTTP URL of the active endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn chain(&self) -> &LinkChain {
        &self.chain
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn default_fetch_policy(&self) -> FetchPolicy {
        self.default_fetch_policy
    }

    /// Run a query with the client's default fetch policy.
    pub async fn query(&self, request: GraphqlRequest) -> Result<GraphqlResponse, TransportError> {
        self.query_with_policy(request, self.default_fetch_policy).await
    }

    pub async fn query_with_policy(
        &self,
        request: GraphqlRequest,
        policy: FetchPolicy,
    ) -> Result<GraphqlResponse, TransportError> {
        if policy == FetchPolicy::CacheFirst {
            if let Some(hit) = self.cache.read(&request) {
                tracing::debug!(client = %self.name, "cache hit");
                return Ok(hit);
            }
        }

        let response = self.chain.execute(Operation::query(request.clone())).await?;
        if policy != FetchPolicy::NoCache {
            self.cache.write(&request, response.clone());
        }
        Ok(response)
    }

    /// Run a query and deserialize its `data` into `T`.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        request: GraphqlRequest,
    ) -> Result<T, TransportError> {
        let response = self.query(request).await?;
        let data = response
            .data
            .ok_or_else(|| TransportError::Protocol("response carries no data".into()))?;
        Ok(serde_json::from_value(data)?)
    }

    /// Run a mutation. Mutations always hit the network and are never cached.
    pub async fn mutate(&self, request: GraphqlRequest) -> Result<GraphqlResponse, TransportError> {
        self.chain.execute(Operation::mutation(request)).await
    }
}

impl std::fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("chain", &self.chain)
            .field("default_fetch_policy", &self.default_fetch_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chaingql_core::link::{Link, Next};
    use chaingql_core::request::OperationKind;
    use serde::Deserialize;
    use serde_json::json;

    /// Terminal link answering with a running counter.
    #[derive(Default)]
    struct Counter {
        calls: AtomicUsize,
        mutations: AtomicUsize,
    }

    #[async_trait]
    impl Link for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        async fn request(
            &self,
            op: Operation,
            _next: Next<'_>,
        ) -> Result<GraphqlResponse, TransportError> {
            if op.kind == OperationKind::Mutation {
                self.mutations.fetch_add(1, Ordering::SeqCst);
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(GraphqlResponse::from_data(json!({ "blocks": { "totalCount": n } })))
        }
    }

    fn client() -> (GraphqlClient, Arc<Counter>) {
        let counter = Arc::new(Counter::default());
        let chain = LinkChain::from_links(vec![counter.clone()]);
        (GraphqlClient::new("production", "https://xapi.example/", chain), counter)
    }

    fn blocks() -> GraphqlRequest {
        GraphqlRequest::new("{ blocks { totalCount } }")
    }

    #[tokio::test]
    async fn network_only_is_the_default_and_always_fetches() {
        let (client, counter) = client();
        assert_eq!(client.default_fetch_policy(), FetchPolicy::NetworkOnly);

        client.query(blocks()).await.unwrap();
        let second = client.query(blocks()).await.unwrap();
        assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
        assert_eq!(second.data.unwrap()["blocks"]["totalCount"], 2);
        assert_eq!(client.cache().len(), 1);
    }

    #[tokio::test]
    async fn cache_first_serves_stored_result() {
        let (client, counter) = client();
        client.query(blocks()).await.unwrap();

        let cached = client
            .query_with_policy(blocks(), FetchPolicy::CacheFirst)
            .await
            .unwrap();
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.data.unwrap()["blocks"]["totalCount"], 1);
    }

    #[tokio::test]
    async fn no_cache_leaves_cache_untouched() {
        let (client, _) = client();
        client
            .query_with_policy(blocks(), FetchPolicy::NoCache)
            .await
            .unwrap();
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn mutations_bypass_the_cache() {
        let (client, counter) = client();
        client.mutate(blocks()).await.unwrap();
        client.mutate(blocks()).await.unwrap();
        assert_eq!(counter.mutations.load(Ordering::SeqCst), 2);
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn query_as_deserializes_data() {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Blocks {
            total_count: u64,
        }
        #[derive(Deserialize)]
        struct Data {
            blocks: Blocks,
        }

        let (client, _) = client();
        let data: Data = client.query_as(blocks()).await.unwrap();
        assert_eq!(data.blocks.total_count, 1);
    }

    #[tokio::test]
    async fn query_as_rejects_mismatched_shape() {
        let (client, _) = client();
        let err = client.query_as::<Vec<u8>>(blocks()).await.unwrap_err();
        assert!(matches!(err, TransportError::Deserialization(_)));
    }
}
