//! Cache configuration.
//!
//! Controls the document snapshot cache via `docservice.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 15 * 60;
const DEFAULT_KEY_PREFIX: &str = "doc:";
const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When false, every lookup misses and nothing is stored.
    pub enabled: bool,
    /// Lifetime of a stored snapshot.
    pub ttl: Duration,
    /// Prepended to the document id to build a cache key.
    pub key_prefix: String,
    /// Maximum number of snapshots held in memory.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl: settings.ttl,
            key_prefix: settings.key_prefix.clone(),
            capacity: settings.capacity,
        }
    }
}

impl CacheConfig {
    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// The configured prefix, or the default when it is blank.
    pub fn key_prefix_or_default(&self) -> &str {
        if self.key_prefix.trim().is_empty() {
            DEFAULT_KEY_PREFIX
        } else {
            &self.key_prefix
        }
    }
}
