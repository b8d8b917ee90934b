//! Redis revocation store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use uuid::Uuid;

use guardpost_core::error::{AppError, ErrorKind};
use guardpost_core::result::AppResult;
use guardpost_core::traits::revocation::RevocationStore;

use super::client::RedisClient;

/// Redis-backed revocation store.
///
/// Entries are written with a server-side TTL matching the revocation
/// expiry, so pruning is delegated to Redis entirely.
#[derive(Debug, Clone)]
pub struct RedisRevocationStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisRevocationStore {
    /// Create a new Redis revocation store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> AppResult<()> {
        let key = self.client.prefixed_key(&token_id.to_string());
        let remaining = (expires_at - Utc::now()).num_seconds();
        // Lapsed revocations still get a minimal TTL so concurrent
        // lookups racing the expiry observe the entry.
        let ttl = remaining.max(1) as u64;

        let mut conn = self.client.conn_mut();
        let _: () = conn.set_ex(&key, 1u8, ttl).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn is_revoked(&self, token_id: Uuid) -> AppResult<bool> {
        let key = self.client.prefixed_key(&token_id.to_string());
        let mut conn = self.client.conn_mut();
        let exists: bool = conn.exists(&key).await.map_err(Self::map_err)?;
        Ok(exists)
    }

    async fn prune(&self, _now: DateTime<Utc>) -> AppResult<u64> {
        // Server-side TTLs expire entries; nothing to do.
        Ok(0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
