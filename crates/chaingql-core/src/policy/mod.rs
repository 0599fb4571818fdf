//! Retry policy used by the retry link.

pub mod retry;

pub use retry::{RetryConfig, RetryPolicy};
