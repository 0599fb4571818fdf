//! chaingql-http — the terminal HTTP link of the transport pipeline.
//!
//! [`HttpLink`] performs the actual GraphQL-over-HTTP POST against the active
//! provider and maps each outcome onto the
//! [`TransportError`](chaingql_core::TransportError) taxonomy. It never
//! retries; place it last, below the retry link.

pub mod client;

pub use client::{HttpLink, HttpLinkConfig};
