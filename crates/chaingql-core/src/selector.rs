//! Endpoint selection: resolve a [`SelectionPolicy`] against a
//! [`ProviderPool`] to one active provider.
//!
//! Selection happens once, when a client facade is built. The pure
//! [`select_endpoint`] takes an explicit seed so the random policy is
//! reproducible in tests; [`select_from_entropy`] draws from the thread RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SelectionPolicy;
use crate::error::ConfigError;
use crate::pool::{ProviderDescriptor, ProviderPool};

/// The active provider and its position in the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    index: usize,
    descriptor: ProviderDescriptor,
}

impl Selection {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    /// HTTP endpoint of the selected provider.
    pub fn endpoint(&self) -> &str {
        &self.descriptor.http
    }

    /// The provider after this one, wrapping at the end of the pool.
    ///
    /// `pool` must be the pool this selection was made from.
    pub fn next_candidate(&self, pool: &ProviderPool) -> Selection {
        let index = (self.index + 1) % pool.len();
        Selection {
            index,
            descriptor: pool.get(index).cloned().unwrap_or_else(|| self.descriptor.clone()),
        }
    }
}

/// Select with a caller-provided random source.
pub fn select_with_rng<R: Rng + ?Sized>(
    pool: &ProviderPool,
    policy: SelectionPolicy,
    rng: &mut R,
) -> Result<Selection, ConfigError> {
    let index = match policy {
        SelectionPolicy::Fixed(index) => index,
        SelectionPolicy::Random => rng.gen_range(0..pool.len()),
    };
    let descriptor = pool
        .get(index)
        .cloned()
        .ok_or(ConfigError::IndexOutOfBounds {
            index,
            len: pool.len(),
        })?;
    Ok(Selection { index, descriptor })
}

/// Deterministic selection: the same seed always yields the same provider.
pub fn select_endpoint(
    pool: &ProviderPool,
    policy: SelectionPolicy,
    seed: u64,
) -> Result<Selection, ConfigError> {
    select_with_rng(pool, policy, &mut StdRng::seed_from_u64(seed))
}

/// Selection seeded from the per-thread RNG.
pub fn select_from_entropy(
    pool: &ProviderPool,
    policy: SelectionPolicy,
) -> Result<Selection, ConfigError> {
    select_with_rng(pool, policy, &mut rand::thread_rng())
}
