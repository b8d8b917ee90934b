//! Revocation manager: provider dispatch and the deny policy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use guardpost_core::config::revocation::RevocationConfig;
use guardpost_core::error::AppError;
use guardpost_core::result::AppResult;
use guardpost_core::traits::revocation::RevocationStore;

/// Revocation manager wrapping the configured store provider.
///
/// The provider is selected at construction time based on configuration.
/// The manager also owns the deny policy: [`check_active`](Self::check_active)
/// fails closed on backend errors unless the deployment opts into
/// `fail_open`.
#[derive(Debug, Clone)]
pub struct RevocationManager {
    /// The inner store provider.
    inner: Arc<dyn RevocationStore>,
    /// Whether backend failures admit the request instead of denying it.
    fail_open: bool,
}

impl RevocationManager {
    /// Create a new revocation manager from configuration.
    pub async fn new(config: &RevocationConfig) -> AppResult<Self> {
        let inner: Arc<dyn RevocationStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis revocation store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisRevocationStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory revocation store");
                Arc::new(crate::memory::MemoryRevocationStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown revocation provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self {
            inner,
            fail_open: config.fail_open,
        })
    }

    /// Create a manager from an existing store (for testing).
    pub fn from_store(store: Arc<dyn RevocationStore>, fail_open: bool) -> Self {
        Self {
            inner: store,
            fail_open,
        }
    }

    /// Record `token_id` as revoked until `expires_at`.
    ///
    /// Backend failures always propagate here: a revocation that cannot
    /// be recorded must not be reported as done.
    pub async fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> AppResult<()> {
        self.inner.revoke(token_id, expires_at).await
    }

    /// Whether `token_id` is currently revoked.
    pub async fn is_revoked(&self, token_id: Uuid) -> AppResult<bool> {
        self.inner.is_revoked(token_id).await
    }

    /// Deny-policy check used on the authentication path.
    ///
    /// Returns `Revoked` for denylisted ids. On backend errors the
    /// configured policy applies: fail-closed propagates the store error
    /// (the request is denied), fail-open logs and admits.
    pub async fn check_active(&self, token_id: Uuid) -> AppResult<()> {
        match self.inner.is_revoked(token_id).await {
            Ok(true) => Err(AppError::revoked(format!("token '{token_id}' is revoked"))),
            Ok(false) => Ok(()),
            Err(e) if self.fail_open => {
                warn!(
                    token_id = %token_id,
                    error = %e,
                    "Revocation store unreachable; admitting per fail-open policy"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Remove lapsed entries. Returns the number removed.
    pub async fn prune(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.inner.prune(now).await
    }

    /// Check that the store backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use guardpost_core::error::ErrorKind;

    /// Store whose backend is always down.
    #[derive(Debug)]
    struct DownStore;

    #[async_trait]
    impl RevocationStore for DownStore {
        async fn revoke(&self, _: Uuid, _: DateTime<Utc>) -> AppResult<()> {
            Err(AppError::store("backend unreachable"))
        }
        async fn is_revoked(&self, _: Uuid) -> AppResult<bool> {
            Err(AppError::store("backend unreachable"))
        }
        async fn prune(&self, _: DateTime<Utc>) -> AppResult<u64> {
            Err(AppError::store("backend unreachable"))
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn fail_closed_denies_on_backend_error() {
        let manager = RevocationManager::from_store(Arc::new(DownStore), false);
        let err = manager.check_active(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Store);
    }

    #[tokio::test]
    async fn fail_open_admits_on_backend_error() {
        let manager = RevocationManager::from_store(Arc::new(DownStore), true);
        assert!(manager.check_active(Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn revoke_errors_always_propagate() {
        let manager = RevocationManager::from_store(Arc::new(DownStore), true);
        assert!(
            manager
                .revoke(Uuid::new_v4(), Utc::now())
                .await
                .is_err()
        );
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn check_active_reports_revoked() {
        let manager = RevocationManager::from_store(
            Arc::new(crate::memory::MemoryRevocationStore::new()),
            false,
        );
        let id = Uuid::new_v4();
        assert!(manager.check_active(id).await.is_ok());

        manager
            .revoke(id, Utc::now() + chrono::Duration::minutes(5))
            .await
            .unwrap();
        let err = manager.check_active(id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Revoked);
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn unknown_provider_is_a_configuration_error() {
        let config = RevocationConfig {
            provider: "etcd".to_string(),
            ..RevocationConfig::default()
        };
        let err = RevocationManager::new(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
