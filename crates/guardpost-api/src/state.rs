//! Application state shared across middleware and extractors.

use std::sync::Arc;
use std::time::Duration;

use guardpost_auth::GuardRegistry;
use guardpost_auth::keys::KeyStore;
use guardpost_core::config::AppConfig;
use guardpost_core::result::AppResult;
use guardpost_revocation::{RevocationManager, RevocationSweeper};

/// Shared dependencies threaded through Axum via `State`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Key ring holder (rotation-safe).
    pub key_store: Arc<KeyStore>,
    /// Revocation registry.
    pub revocation: Arc<RevocationManager>,
    /// All configured guards.
    pub registry: Arc<GuardRegistry>,
}

impl AppState {
    /// Builds the full state from configuration.
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let key_store = Arc::new(KeyStore::from_config(&config.auth)?);
        let revocation = Arc::new(RevocationManager::new(&config.revocation).await?);
        let registry = Arc::new(GuardRegistry::from_config(
            &config.auth,
            key_store.clone(),
            revocation.clone(),
        )?);

        Ok(Self {
            config: Arc::new(config),
            key_store,
            revocation,
            registry,
        })
    }

    /// Spawns the periodic revocation prune task at the configured
    /// interval. Call once after startup; the handle may be aborted on
    /// shutdown.
    pub fn spawn_revocation_sweeper(&self) -> tokio::task::JoinHandle<()> {
        RevocationSweeper::new(
            self.revocation.clone(),
            Duration::from_secs(self.config.revocation.prune_interval_seconds),
        )
        .spawn()
    }

    /// Builds state around an already-assembled registry (for tests and
    /// hosts that wire guards manually).
    pub fn from_parts(
        config: AppConfig,
        key_store: Arc<KeyStore>,
        revocation: Arc<RevocationManager>,
        registry: Arc<GuardRegistry>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            key_store,
            revocation,
            registry,
        }
    }
}
