//! Assemble facades into GraphQL clients and register them by network.

use chaingql_core::config::ExplorerConfig;
use chaingql_core::error::ConfigError;
use chaingql_core::link::LinkChain;

use crate::client::GraphqlClient;
use crate::facade::{ClientOptions, ResilientClient};
use crate::registry::{ClientRegistry, ClientRegistryBuilder};

/// Name of the default client.
pub const PRIMARY_NETWORK: &str = "production";

/// Name of the testnet client, registered when a testnet list is configured.
pub const TEST_NETWORK: &str = "test";

/// Build a named client from a facade's links.
pub fn assemble(name: impl Into<String>, facade: &ResilientClient) -> GraphqlClient {
    GraphqlClient::new(
        name,
        facade.selection().endpoint(),
        LinkChain::from_links(facade.links()),
    )
}

/// Assemble and register a facade's client under `name`.
pub fn bind(
    builder: &mut ClientRegistryBuilder,
    name: &str,
    facade: &ResilientClient,
    default: bool,
) -> Result<(), ConfigError> {
    let client = assemble(name, facade);
    if default {
        builder.register_default(client)?;
    } else {
        builder.register(client)?;
    }
    Ok(())
}

/// Build the registry for a loaded configuration.
///
/// The primary pool becomes the default client. A testnet pool, when present,
/// is registered as a second client.
pub fn build_registry(
    config: &ExplorerConfig,
    options: ClientOptions,
) -> Result<ClientRegistry, ConfigError> {
    let mut builder = ClientRegistry::builder();

    let primary =
        ResilientClient::new(config.providers.clone(), config.selection, options.clone())?;
    bind(&mut builder, PRIMARY_NETWORK, &primary, true)?;

    if let Some(pool) = &config.testnet {
        let test = ResilientClient::new(pool.clone(), config.testnet_selection, options)?;
        bind(&mut builder, TEST_NETWORK, &test, false)?;
    }

    let registry = builder.build()?;
    tracing::info!(
        clients = ?registry.names(),
        default = registry.default_name(),
        "client registry ready"
    );
    Ok(registry)
}
