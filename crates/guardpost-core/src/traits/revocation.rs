//! Revocation store trait for pluggable registry backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::result::AppResult;

/// Trait for revocation registry backends (in-memory or Redis).
///
/// Entries are keyed by token id (`jti`) and carry the expiry of the
/// revoked token: once that instant has passed, expiry alone rejects the
/// token and the entry may be dropped.
#[async_trait]
pub trait RevocationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Record `token_id` as revoked, at minimum until `expires_at`.
    ///
    /// Revoking an already-revoked id must keep the later expiry.
    async fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> AppResult<()>;

    /// Whether `token_id` is currently revoked.
    async fn is_revoked(&self, token_id: Uuid) -> AppResult<bool>;

    /// Remove entries whose expiry precedes `now`. Returns the number of
    /// entries removed.
    async fn prune(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Check that the store backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
