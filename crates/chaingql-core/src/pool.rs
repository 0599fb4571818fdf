//! Validated, ordered pool of GraphQL providers.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// One configured GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// GraphQL-over-HTTP endpoint.
    #[serde(default)]
    pub http: String,
    /// Streaming (subscriptions) endpoint. Carried but never connected.
    #[serde(default)]
    pub ws: String,
}

impl ProviderDescriptor {
    pub fn new(http: impl Into<String>) -> Self {
        Self {
            http: http.into(),
            ws: String::new(),
        }
    }

    pub fn with_ws(mut self, ws: impl Into<String>) -> Self {
        self.ws = ws.into();
        self
    }

    /// Streaming endpoint, `None` when the slot is empty.
    pub fn stream_endpoint(&self) -> Option<&str> {
        let ws = self.ws.trim();
        (!ws.is_empty()).then_some(ws)
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let http = self.http.trim();
        if http.is_empty() {
            return Err(ConfigError::MissingHttpEndpoint { index });
        }
        let url = Url::parse(http).map_err(|e| ConfigError::InvalidEndpoint {
            index,
            url: http.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                index,
                url: http.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidEndpoint {
                index,
                url: http.to_string(),
                reason: "missing host".into(),
            });
        }
        Ok(())
    }
}

/// Non-empty ordered list of providers whose HTTP endpoints all parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPool {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderPool {
    /// Validate and build a pool.
    pub fn new(mut providers: Vec<ProviderDescriptor>) -> Result<Self, ConfigError> {
        if providers.is_empty() {
            return Err(ConfigError::EmptyPool);
        }
        for (index, provider) in providers.iter_mut().enumerate() {
            provider.validate(index)?;
            provider.http = provider.http.trim().to_string();
        }
        Ok(Self { providers })
    }

    /// Number of providers in the pool.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Always `false` for a constructed pool.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProviderDescriptor> {
        self.providers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter()
    }
}
