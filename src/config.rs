//! Configuration Module
//!
//! Immutable store configuration, loadable from environment variables and
//! validated before a store is built from it.

use std::env;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Store configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Period between background purge sweeps. Must be non-zero.
    pub purge_interval: Duration,
    /// TTL applied by `set`; zero means entries never expire.
    pub default_expiration: Duration,
}

impl StoreConfig {
    /// Creates a config with the given purge interval and no default expiration.
    pub fn new(purge_interval: Duration) -> Self {
        Self {
            purge_interval,
            default_expiration: Duration::ZERO,
        }
    }

    /// Creates a new StoreConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PURGE_INTERVAL_MS` - Purge sweep period in milliseconds (default: 1000)
    /// - `DEFAULT_EXPIRATION_MS` - Default TTL in milliseconds, 0 = none (default: 0)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from a variable lookup, falling back to defaults for
    /// absent or unparsable values.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |name: &str| {
            lookup(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
        };
        let defaults = Self::default();
        Self {
            purge_interval: millis("PURGE_INTERVAL_MS").unwrap_or(defaults.purge_interval),
            default_expiration: millis("DEFAULT_EXPIRATION_MS")
                .unwrap_or(defaults.default_expiration),
        }
    }

    /// Checks that the configuration can back a store.
    pub fn validate(&self) -> Result<()> {
        if self.purge_interval.is_zero() {
            return Err(StoreError::InvalidConfig(
                "purge interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            purge_interval: Duration::from_secs(1),
            default_expiration: Duration::ZERO,
        }
    }
}
