//! Periodic pruning of lapsed revocation entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use guardpost_core::result::AppResult;

use crate::provider::RevocationManager;

/// Handles periodic cleanup of lapsed revocation entries.
///
/// Lookups already ignore lapsed entries, so the sweeper is purely a
/// memory-reclamation concern; a missed cycle never changes behavior.
#[derive(Clone)]
pub struct RevocationSweeper {
    /// Revocation manager to prune through.
    manager: Arc<RevocationManager>,
    /// Interval between sweeps.
    interval: Duration,
}

impl std::fmt::Debug for RevocationSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationSweeper")
            .field("interval", &self.interval)
            .finish()
    }
}

impl RevocationSweeper {
    /// Creates a new sweeper.
    pub fn new(manager: Arc<RevocationManager>, interval: Duration) -> Self {
        Self { manager, interval }
    }

    /// Runs a single prune cycle. Returns the number of entries removed.
    pub async fn run_once(&self) -> AppResult<u64> {
        let removed = self.manager.prune(Utc::now()).await?;
        debug!(removed, "Revocation prune cycle completed");
        Ok(removed)
    }

    /// Spawns the sweep loop on the current runtime.
    ///
    /// The task runs until the handle is aborted or the runtime shuts
    /// down; individual cycle failures are logged and do not stop the
    /// loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The immediate first tick would prune an empty registry.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "Revocation prune cycle failed");
                }
            }
        })
    }
}
