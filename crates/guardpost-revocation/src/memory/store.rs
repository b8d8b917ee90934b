//! In-memory revocation store backed by a concurrent map.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use guardpost_core::result::AppResult;
use guardpost_core::traits::revocation::RevocationStore;

/// Concurrent-map revocation store for single-node deployments.
///
/// Entries map token id to the revocation expiry. Lookups treat lapsed
/// entries as not revoked, so correctness does not depend on prune
/// cadence; pruning only reclaims memory.
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    entries: DashMap<Uuid, DateTime<Utc>>,
}

impl MemoryRevocationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked entries, including lapsed ones not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store tracks no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> AppResult<()> {
        // Double-revoke keeps the later expiry.
        self.entries
            .entry(token_id)
            .and_modify(|existing| {
                if *existing < expires_at {
                    *existing = expires_at;
                }
            })
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token_id: Uuid) -> AppResult<bool> {
        match self.entries.get(&token_id) {
            Some(entry) => Ok(*entry.value() > Utc::now()),
            None => Ok(false),
        }
    }

    async fn prune(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at >= now);
        let removed = (before - self.entries.len()) as u64;
        if removed > 0 {
            debug!(removed, "Pruned lapsed revocation entries");
        }
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
