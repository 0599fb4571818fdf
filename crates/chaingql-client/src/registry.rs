//! Named GraphQL clients with one designated default.

use std::collections::HashMap;
use std::sync::Arc;

use chaingql_core::error::ConfigError;

use crate::client::GraphqlClient;

/// Immutable map from network name to client.
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    clients: HashMap<String, Arc<GraphqlClient>>,
    default_name: String,
}

impl ClientRegistry {
    pub fn builder() -> ClientRegistryBuilder {
        ClientRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<GraphqlClient>> {
        self.clients.get(name).cloned()
    }

    pub fn default_client(&self) -> Arc<GraphqlClient> {
        // build() guarantees the default is present
        self.clients[&self.default_name].clone()
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Collects clients, rejecting duplicate names and a second default.
#[derive(Debug, Default)]
pub struct ClientRegistryBuilder {
    clients: HashMap<String, Arc<GraphqlClient>>,
    default_name: Option<String>,
}

impl ClientRegistryBuilder {
    /// Register a client under its own name.
    pub fn register(&mut self, client: GraphqlClient) -> Result<&mut Self, ConfigError> {
        let name = client.name().to_string();
        if self.clients.contains_key(&name) {
            return Err(ConfigError::DuplicateClient { name });
        }
        tracing::debug!(client = %name, endpoint = client.endpoint(), "registered client");
        self.clients.insert(name, Arc::new(client));
        Ok(self)
    }

    /// Register a client and make it the default.
    pub fn register_default(&mut self, client: GraphqlClient) -> Result<&mut Self, ConfigError> {
        if let Some(existing) = &self.default_name {
            return Err(ConfigError::DuplicateDefault {
                existing: existing.clone(),
            });
        }
        let name = client.name().to_string();
        self.register(client)?;
        self.default_name = Some(name);
        Ok(self)
    }

    pub fn build(self) -> Result<ClientRegistry, ConfigError> {
        let default_name = self.default_name.ok_or(ConfigError::MissingDefaultClient)?;
        Ok(ClientRegistry {
            clients: self.clients,
            default_name,
        })
    }
}
