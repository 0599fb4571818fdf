//! Retry link: re-issues transient failures with exponential backoff.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::link::{Link, Next};
use crate::policy::{RetryConfig, RetryPolicy};
use crate::request::{GraphqlResponse, Operation};

/// Retries network and 5xx failures up to `max_attempts` times.
///
/// The attempt counter lives on the stack of each `request` call, so
/// concurrent operations never share retry state. Dropping the returned
/// future cancels any pending backoff sleep.
#[derive(Debug, Clone)]
pub struct RetryLink {
    policy: RetryPolicy,
}

impl RetryLink {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            policy: RetryPolicy::new(config),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl Default for RetryLink {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[async_trait]
impl Link for RetryLink {
    fn name(&self) -> &'static str {
        "retry"
    }

    async fn request(
        &self,
        op: Operation,
        next: Next<'_>,
    ) -> Result<GraphqlResponse, TransportError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let mut this_attempt = op.clone();
            this_attempt.attempt = attempt;
            this_attempt.final_attempt = !self.policy.should_retry(attempt);
            match next.run(this_attempt).await {
                Ok(resp) => {
                    if attempt > 1 {
                        tracing::debug!(id = op.id, attempt, "request recovered after retry");
                    }
                    return Ok(resp);
                }
                Err(e) if e.is_transient() => match self.policy.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            id = op.id,
                            operation = op.name(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            id = op.id,
                            operation = op.name(),
                            attempt,
                            error = %e,
                            "max attempts exceeded"
                        );
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }
}
