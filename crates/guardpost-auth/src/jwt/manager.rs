//! Token lifecycle facade: issue, verify, refresh, revoke.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use guardpost_core::config::auth::GuardConfig;
use guardpost_core::error::AppError;
use guardpost_core::result::AppResult;
use guardpost_revocation::RevocationManager;

use crate::keys::KeyStore;

use super::claims::Claims;
use super::decoder::TokenDecoder;
use super::encoder::{IssuedToken, TokenEncoder};

/// Manages the full token lifecycle for one guard's policy (TTL, refresh
/// window, signing key), against the shared key ring and revocation
/// registry.
#[derive(Debug, Clone)]
pub struct TokenManager {
    /// Token creation.
    encoder: TokenEncoder,
    /// Token validation.
    decoder: TokenDecoder,
    /// Shared revocation registry.
    revocation: Arc<RevocationManager>,
    /// Grace window after expiry during which refresh still succeeds.
    refresh_window_seconds: i64,
}

impl TokenManager {
    /// Creates a manager for one guard's configuration.
    pub fn new(
        key_store: Arc<KeyStore>,
        revocation: Arc<RevocationManager>,
        config: &GuardConfig,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            encoder: TokenEncoder::new(key_store.clone(), config),
            decoder: TokenDecoder::new(key_store, leeway_seconds),
            revocation,
            refresh_window_seconds: config.refresh_window_seconds as i64,
        }
    }

    /// Issues a signed token for `subject` carrying `custom` claims.
    pub fn issue(
        &self,
        subject: &str,
        custom: serde_json::Map<String, serde_json::Value>,
    ) -> AppResult<IssuedToken> {
        self.encoder.issue(subject, custom)
    }

    /// Verifies a token's structure, signature, and temporal validity.
    ///
    /// Does not consult the revocation registry; callers that need that
    /// guarantee follow up with [`check_revoked`](Self::check_revoked).
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        self.decoder.verify(token)
    }

    /// Rejects claims whose token id is in the revocation registry,
    /// applying the configured fail-open/fail-closed policy.
    pub async fn check_revoked(&self, claims: &Claims) -> AppResult<()> {
        self.revocation.check_active(claims.jti).await
    }

    /// Exchanges a still-refreshable token for a freshly issued one.
    ///
    /// The input must carry a valid signature; expiry is tolerated up to
    /// the refresh window. The old token id is revoked through the end of
    /// its own refresh window, so a refreshed-away token can be neither
    /// verified nor refreshed again.
    pub async fn refresh(&self, token: &str) -> AppResult<IssuedToken> {
        let claims = self.decoder.decode_signed(token)?;
        let now = Utc::now().timestamp();
        let leeway = self.decoder.leeway_seconds();

        if claims.iat - leeway > now {
            return Err(AppError::expired("token issued in the future"));
        }
        if now - leeway > claims.exp + self.refresh_window_seconds {
            return Err(AppError::expired("refresh window exceeded"));
        }

        self.revocation.check_active(claims.jti).await?;

        let issued = self.encoder.issue(&claims.sub, claims.custom.clone())?;
        self.revocation
            .revoke(claims.jti, self.revocation_deadline(&claims))
            .await?;

        debug!(
            old_jti = %claims.jti,
            new_jti = %issued.claims.jti,
            sub = %claims.sub,
            "Refreshed token"
        );
        Ok(issued)
    }

    /// Explicitly revokes a token by its claims.
    pub async fn revoke(&self, claims: &Claims) -> AppResult<()> {
        self.revocation
            .revoke(claims.jti, self.revocation_deadline(claims))
            .await?;
        debug!(jti = %claims.jti, sub = %claims.sub, "Revoked token");
        Ok(())
    }

    /// Revocation entries outlive the token's own refresh window; past
    /// that point both verification and refresh reject it on expiry
    /// grounds alone.
    fn revocation_deadline(&self, claims: &Claims) -> DateTime<Utc> {
        DateTime::from_timestamp(claims.exp + self.refresh_window_seconds, 0)
            .unwrap_or_else(Utc::now)
    }
}
