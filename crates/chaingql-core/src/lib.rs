//! chaingql-core — foundation types for the explorer's GraphQL transport.
//!
//! # Overview
//!
//! The explorer talks to its GraphQL API through a pool of redundant
//! providers. This crate defines:
//!
//! - [`Settings`] / [`load_config`] — settings document and the pure loader
//!   producing an immutable [`ExplorerConfig`]
//! - [`ProviderPool`] / [`ProviderDescriptor`] — validated provider list
//! - [`select_endpoint`] — resolves a [`SelectionPolicy`] to the active provider
//! - [`Link`] / [`LinkChain`] — the composable request pipeline
//! - [`links`] module — network-error, retry and error-reporting links
//! - [`TransportError`] / [`ConfigError`] — structured error types

pub mod config;
pub mod error;
pub mod link;
pub mod links;
pub mod policy;
pub mod pool;
pub mod request;
pub mod selector;

pub use config::{load_config, ExplorerConfig, RetrySettings, SelectionPolicy, Settings};
pub use error::{ConfigError, ErrorClass, FailureKind, NetworkError, TransportError};
pub use link::{Link, LinkChain, Next};
pub use links::{
    ErrorLink, ErrorObserver, NetErrorLink, OperationInfo, RetryLink, TracingObserver,
};
pub use pool::{ProviderDescriptor, ProviderPool};
pub use request::{GraphqlError, GraphqlRequest, GraphqlResponse, Operation, OperationKind};
pub use selector::{select_endpoint, select_from_entropy, select_with_rng, Selection};
