//! Explorer settings and the pure loader that turns them into a finalized
//! [`ExplorerConfig`].
//!
//! The settings document mirrors the explorer's app config:
//!
//! ```json
//! {
//!   "apollo": {
//!     "providers": [{ "http": "https://xapi.ncogchain.earth/", "ws": "" }],
//!     "defaultProviderIndex": "random"
//!   },
//!   "useTestnet": false,
//!   "testnet": {
//!     "providers": [{ "http": "https://xapi-test.ncogchain.earth/", "ws": "" }]
//!   }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::RetryConfig;
use crate::pool::{ProviderDescriptor, ProviderPool};

/// How the active provider is chosen from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSelection", into = "RawSelection")]
pub enum SelectionPolicy {
    /// Zero-based index into the provider list.
    Fixed(usize),
    /// Uniformly random pick, drawn once.
    Random,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::Random
    }
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(index) => write!(f, "fixed({index})"),
            Self::Random => write!(f, "random"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawSelection {
    Index(usize),
    Keyword(String),
}

impl TryFrom<RawSelection> for SelectionPolicy {
    type Error = ConfigError;

    fn try_from(raw: RawSelection) -> Result<Self, Self::Error> {
        match raw {
            RawSelection::Index(index) => Ok(Self::Fixed(index)),
            RawSelection::Keyword(word) if word.eq_ignore_ascii_case("random") => Ok(Self::Random),
            RawSelection::Keyword(word) => word
                .trim()
                .parse::<usize>()
                .map(Self::Fixed)
                .map_err(|_| ConfigError::InvalidSelection(word)),
        }
    }
}

impl From<SelectionPolicy> for RawSelection {
    fn from(policy: SelectionPolicy) -> Self {
        match policy {
            SelectionPolicy::Fixed(index) => Self::Index(index),
            SelectionPolicy::Random => Self::Keyword("random".into()),
        }
    }
}

/// `apollo` section: the production provider list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApolloSettings {
    #[serde(default)]
    pub providers: Vec<ProviderDescriptor>,
    #[serde(default)]
    pub default_provider_index: SelectionPolicy,
}

/// `testnet` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestnetSettings {
    #[serde(default)]
    pub providers: Vec<ProviderDescriptor>,
    /// Selection for the dedicated test client.
    #[serde(default)]
    pub default_provider_index: SelectionPolicy,
}

/// `retry` section, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    300
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.1
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl RetrySettings {
    /// Reject values that would make the backoff schedule meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(invalid_retry(
                "multiplier",
                format!("expected a finite value >= 1.0, got {}", self.multiplier),
            ));
        }
        if !self.jitter.is_finite() || !(0.0..=1.0).contains(&self.jitter) {
            return Err(invalid_retry(
                "jitter",
                format!("expected a fraction between 0.0 and 1.0, got {}", self.jitter),
            ));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(invalid_retry(
                "initialBackoffMs",
                format!(
                    "{}ms exceeds maxBackoffMs {}ms",
                    self.initial_backoff_ms, self.max_backoff_ms
                ),
            ));
        }
        Ok(())
    }
}

fn invalid_retry(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidRetry { field, reason }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(s: &RetrySettings) -> Self {
        RetryConfig {
            max_attempts: s.max_attempts.max(1),
            initial_backoff: Duration::from_millis(s.initial_backoff_ms),
            max_backoff: Duration::from_millis(s.max_backoff_ms),
            multiplier: s.multiplier,
            jitter_fraction: s.jitter,
        }
    }
}

/// Raw settings as read from disk. Never mutated after parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub apollo: ApolloSettings,
    #[serde(default)]
    pub use_testnet: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testnet: Option<TestnetSettings>,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Settings {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    /// Finalize using the document's own `useTestnet` flag.
    pub fn load(&self) -> Result<ExplorerConfig, ConfigError> {
        load_config(self, self.use_testnet)
    }
}

/// Validated, immutable configuration.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Pool the primary client selects from.
    pub providers: ProviderPool,
    pub selection: SelectionPolicy,
    /// Testnet pool, when the settings carry one.
    pub testnet: Option<ProviderPool>,
    pub testnet_selection: SelectionPolicy,
    pub retry: RetryConfig,
    pub use_testnet: bool,
}

/// Build the finalized configuration from raw settings.
///
/// With `use_testnet` the production provider list is replaced wholesale by
/// the testnet list.
pub fn load_config(settings: &Settings, use_testnet: bool) -> Result<ExplorerConfig, ConfigError> {
    settings.retry.validate()?;

    let testnet = settings
        .testnet
        .as_ref()
        .filter(|t| !t.providers.is_empty())
        .map(|t| ProviderPool::new(t.providers.clone()))
        .transpose()?;

    let providers = if use_testnet {
        testnet.clone().ok_or(ConfigError::MissingTestnet)?
    } else {
        ProviderPool::new(settings.apollo.providers.clone())?
    };

    let selection = settings.apollo.default_provider_index;
    check_bounds(selection, &providers)?;

    let testnet_selection = settings
        .testnet
        .as_ref()
        .map(|t| t.default_provider_index)
        .unwrap_or_default();
    if let Some(pool) = &testnet {
        check_bounds(testnet_selection, pool)?;
    }

    tracing::debug!(
        providers = providers.len(),
        %selection,
        use_testnet,
        "configuration loaded"
    );

    Ok(ExplorerConfig {
        providers,
        selection,
        testnet,
        testnet_selection,
        retry: RetryConfig::from(&settings.retry),
        use_testnet,
    })
}

fn check_bounds(policy: SelectionPolicy, pool: &ProviderPool) -> Result<(), ConfigError> {
    match policy {
        SelectionPolicy::Fixed(index) if index >= pool.len() => Err(ConfigError::IndexOutOfBounds {
            index,
            len: pool.len(),
        }),
        _ => Ok(()),
    }
}
