//! Built-in NCOG Earth Chain provider profiles.
//!
//! Used when no settings file is supplied. Each profile is a plain provider
//! list; wrap it in [`Settings`] to get the usual loading and validation.

use chaingql_core::config::{
    ApolloSettings, RetrySettings, SelectionPolicy, Settings, TestnetSettings,
};
use chaingql_core::pool::ProviderDescriptor;

/// Public mainnet GraphQL API.
pub const MAINNET_HTTP: &str = "https://xapi.ncogchain.earth/";

/// Public testnet GraphQL API.
pub const TESTNET_HTTP: &str = "https://xapi-test.ncogchain.earth/";

/// Mainnet provider list.
pub fn mainnet_providers() -> Vec<ProviderDescriptor> {
    vec![ProviderDescriptor::new(MAINNET_HTTP)]
}

/// Testnet provider list.
pub fn testnet_providers() -> Vec<ProviderDescriptor> {
    vec![ProviderDescriptor::new(TESTNET_HTTP)]
}

/// Settings equivalent to the explorer's shipped app config.
pub fn default_settings() -> Settings {
    Settings {
        apollo: ApolloSettings {
            providers: mainnet_providers(),
            default_provider_index: SelectionPolicy::Random,
        },
        use_testnet: false,
        testnet: Some(TestnetSettings {
            providers: testnet_providers(),
            default_provider_index: SelectionPolicy::Random,
        }),
        retry: RetrySettings::default(),
    }
}
