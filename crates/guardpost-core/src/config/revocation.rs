//! Revocation store configuration.

use serde::{Deserialize, Serialize};

/// Top-level revocation registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationConfig {
    /// Store provider type: `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Policy when the store backend is unreachable. `false` (the default)
    /// fails closed: revocation checks that cannot complete deny the
    /// request. `true` admits the request and logs the failure.
    #[serde(default)]
    pub fail_open: bool,
    /// Interval between prune sweeps in seconds.
    #[serde(default = "default_prune_interval")]
    pub prune_interval_seconds: u64,
    /// Redis-specific configuration.
    #[serde(default)]
    pub redis: RedisRevocationConfig,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            fail_open: false,
            prune_interval_seconds: default_prune_interval(),
            redis: RedisRevocationConfig::default(),
        }
    }
}

/// Redis revocation backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisRevocationConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all revocation entries.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisRevocationConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_prune_interval() -> u64 {
    300
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "guardpost:revoked:".to_string()
}
