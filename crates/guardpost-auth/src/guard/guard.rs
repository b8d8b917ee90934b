//! A single authentication strategy: token extraction, verification, and
//! revocation checking behind one operation.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use guardpost_core::config::auth::TokenLocation;
use guardpost_core::error::AppError;
use guardpost_core::result::AppResult;
use guardpost_core::traits::request::TokenSource;

use crate::jwt::{Claims, TokenManager};

/// The authenticated caller a guard hands to request handlers.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Subject claim, identifying the principal.
    pub subject: String,
    /// Token id the principal authenticated with.
    pub token_id: Uuid,
    /// When the presented token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the presented token expires.
    pub expires_at: DateTime<Utc>,
    /// Name of the guard that performed authentication.
    pub guard: String,
    /// Custom claims carried by the token.
    pub claims: serde_json::Map<String, serde_json::Value>,
}

/// A named authentication strategy.
///
/// Guards hold only configuration plus references to the shared key ring
/// and revocation registry; they keep no per-request state and are safe
/// to share across request-handling tasks without locking.
#[derive(Debug)]
pub struct Guard {
    /// Guard name as registered.
    name: String,
    /// Token lifecycle manager configured for this guard.
    tokens: TokenManager,
    /// Recognized token locations, in priority order.
    locations: Vec<TokenLocation>,
}

impl Guard {
    /// Creates a guard.
    pub fn new(name: impl Into<String>, tokens: TokenManager, locations: Vec<TokenLocation>) -> Self {
        Self {
            name: name.into(),
            tokens,
            locations,
        }
    }

    /// The guard's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The guard's token lifecycle manager, for issuing and refreshing
    /// tokens under this guard's policy.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Authenticates the current request.
    ///
    /// Extracts the token from the first configured location that carries
    /// one, verifies it, rejects revoked token ids, and maps the claims
    /// into a [`Principal`].
    pub async fn authenticate(&self, source: &dyn TokenSource) -> AppResult<Principal> {
        let token = self
            .extract_token(source)
            .ok_or_else(|| AppError::unauthenticated("no token presented"))?;

        let claims = self.tokens.verify(&token)?;
        self.tokens.check_revoked(&claims).await?;

        debug!(guard = %self.name, sub = %claims.sub, "Request authenticated");
        Ok(self.principal(claims))
    }

    /// First token found across the configured locations, in order.
    fn extract_token(&self, source: &dyn TokenSource) -> Option<String> {
        self.locations.iter().find_map(|location| {
            let token = match location {
                TokenLocation::Bearer => source.bearer(),
                TokenLocation::Header { name } => source.header(name),
                TokenLocation::Cookie { name } => source.cookie(name),
            };
            token.map(str::to_string)
        })
    }

    fn principal(&self, claims: Claims) -> Principal {
        Principal {
            subject: claims.sub.clone(),
            token_id: claims.jti,
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
            guard: self.name.clone(),
            claims: claims.custom,
        }
    }
}
