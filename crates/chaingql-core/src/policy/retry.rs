//! Exponential backoff retry policy with optional jitter.

use std::time::Duration;

use rand::Rng;

/// Configuration for the retry policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, counting the first try.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Maximum backoff delay (caps exponential growth).
    pub max_backoff: Duration,
    /// Multiplier applied to backoff on each retry.
    pub multiplier: f64,
    /// Add up to `jitter_fraction * backoff` random jitter (0.0 = no jitter).
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(300),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_fraction: 0.1,
        }
    }
}

/// Backoff schedule for one request; holds no per-request state.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the delay to wait after the `attempt`-th failed attempt
    /// (1-based), or `None` once `max_attempts` have been made.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if !self.should_retry(attempt) {
            return None;
        }
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base_ms =
            self.config.initial_backoff.as_millis() as f64 * self.config.multiplier.powi(exp);
        let cap_ms = self.config.max_backoff.as_millis() as f64;
        // f64::min ignores NaN, so a broken multiplier degrades to the cap
        let capped = base_ms.min(cap_ms);

        // jitter never exceeds the capped delay itself
        let fraction = if self.config.jitter_fraction.is_finite() {
            self.config.jitter_fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let jitter_max = capped * fraction;
        let jitter_ms = if jitter_max.is_finite() && jitter_max > 0.0 {
            rand::thread_rng().gen_range(0.0..=jitter_max)
        } else {
            0.0
        };

        Some(Duration::from_millis((capped + jitter_ms) as u64))
    }

    /// Returns `true` if another attempt is allowed after `attempt` failures.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.config.max_attempts
    }
}
