//! Resilient client facade: one provider pool, one selected endpoint, and the
//! four links bound to it.

use std::sync::Arc;

use chaingql_core::config::{ExplorerConfig, SelectionPolicy};
use chaingql_core::error::ConfigError;
use chaingql_core::link::Link;
use chaingql_core::links::{ErrorLink, ErrorObserver, NetErrorLink, RetryLink, TracingObserver};
use chaingql_core::policy::RetryConfig;
use chaingql_core::pool::{ProviderDescriptor, ProviderPool};
use chaingql_core::selector::{select_endpoint, select_from_entropy, Selection};
use chaingql_http::{HttpLink, HttpLinkConfig};

/// Options shared by every link a facade builds.
#[derive(Clone)]
pub struct ClientOptions {
    pub retry: RetryConfig,
    pub http: HttpLinkConfig,
    pub observer: Arc<dyn ErrorObserver>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            http: HttpLinkConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }
}

impl ClientOptions {
    /// Options carrying the retry policy of a loaded configuration.
    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self {
            retry: config.retry.clone(),
            ..Self::default()
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ErrorObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_http(mut self, http: HttpLinkConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("retry", &self.retry)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

/// Binds a provider pool's selected endpoint to a set of links.
///
/// The endpoint is chosen once, here; retries always target it.
///
/// There is no automatic failover: if the selected provider becomes
/// unavailable, requests keep failing against it until a new facade is built.
/// [`Selection::next_candidate`] yields the next provider in the pool for
/// callers that want to rotate themselves (the CLI `probe` command walks the
/// pool this way).
pub struct ResilientClient {
    pool: ProviderPool,
    selection: Selection,
    net_error: Arc<NetErrorLink>,
    retry: Arc<RetryLink>,
    error: Arc<ErrorLink>,
    http: Arc<HttpLink>,
}

impl ResilientClient {
    /// Select from the pool (random policies draw from the thread RNG).
    pub fn new(
        pool: ProviderPool,
        policy: SelectionPolicy,
        options: ClientOptions,
    ) -> Result<Self, ConfigError> {
        let selection = select_from_entropy(&pool, policy)?;
        Self::from_selection(pool, selection, options)
    }

    /// Deterministic variant of [`ResilientClient::new`].
    pub fn with_seed(
        pool: ProviderPool,
        policy: SelectionPolicy,
        seed: u64,
        options: ClientOptions,
    ) -> Result<Self, ConfigError> {
        let selection = select_endpoint(&pool, policy, seed)?;
        Self::from_selection(pool, selection, options)
    }

    fn from_selection(
        pool: ProviderPool,
        selection: Selection,
        options: ClientOptions,
    ) -> Result<Self, ConfigError> {
        let endpoint = selection.endpoint().to_string();
        let http = HttpLink::new(endpoint.clone(), options.http)?;
        tracing::info!(
            endpoint = %endpoint,
            index = selection.index(),
            pool = pool.len(),
            "selected GraphQL provider"
        );
        Ok(Self {
            net_error: Arc::new(NetErrorLink::new(endpoint)),
            retry: Arc::new(RetryLink::new(options.retry)),
            error: Arc::new(ErrorLink::new(options.observer)),
            http: Arc::new(http),
            pool,
            selection,
        })
    }

    pub fn pool(&self) -> &ProviderPool {
        &self.pool
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn active_endpoint(&self) -> &ProviderDescriptor {
        self.selection.descriptor()
    }

    pub fn net_error_link(&self) -> Arc<dyn Link> {
        self.net_error.clone()
    }

    pub fn retry_link(&self) -> Arc<dyn Link> {
        self.retry.clone()
    }

    pub fn error_link(&self) -> Arc<dyn Link> {
        self.error.clone()
    }

    pub fn http_link(&self) -> Arc<dyn Link> {
        self.http.clone()
    }

    /// All four links, outermost first:
    /// network-error → retry → error-reporting → HTTP.
    pub fn links(&self) -> Vec<Arc<dyn Link>> {
        vec![
            self.net_error_link(),
            self.retry_link(),
            self.error_link(),
            self.http_link(),
        ]
    }
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("endpoint", &self.selection.endpoint())
            .field("index", &self.selection.index())
            .field("pool", &self.pool.len())
            .finish()
    }
}
