//! chaingql-client — resilient GraphQL clients for the NCOG Earth Chain explorer.
//!
//! A [`ResilientClient`] selects one provider from a pool and binds the
//! network-error, retry, error-reporting and HTTP links to it. The bindings
//! turn facades into [`GraphqlClient`]s and collect them in a
//! [`ClientRegistry`] keyed by network name.
//!
//! # Quick start
//! ```rust,no_run
//! use chaingql_client::{build_registry, profiles, ClientOptions};
//! use chaingql_core::GraphqlRequest;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = profiles::default_settings().load()?;
//! let registry = build_registry(&config, ClientOptions::from_config(&config))?;
//! let resp = registry
//!     .default_client()
//!     .query(GraphqlRequest::new("{ __typename }"))
//!     .await?;
//! println!("{:?}", resp.data);
//! # Ok(())
//! # }
//! ```

pub mod bindings;
pub mod cache;
pub mod client;
pub mod facade;
pub mod profiles;
pub mod registry;

pub use bindings::{assemble, bind, build_registry, PRIMARY_NETWORK, TEST_NETWORK};
pub use cache::ResponseCache;
pub use client::{FetchPolicy, GraphqlClient};
pub use facade::{ClientOptions, ResilientClient};
pub use registry::{ClientRegistry, ClientRegistryBuilder};
