//! Token creation with configurable signing key and TTL.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{Algorithm, Header, encode};
use uuid::Uuid;

use guardpost_core::config::auth::GuardConfig;
use guardpost_core::error::AppError;
use guardpost_core::result::AppResult;

use crate::keys::KeyStore;

use super::claims::{Claims, RESERVED_CLAIMS};

/// Result of a successful issuance: the serialized token plus the claims
/// that were signed into it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed, serialized token.
    pub token: String,
    /// The claims embedded in the token.
    pub claims: Claims,
}

/// Creates signed tokens against the shared key ring.
#[derive(Debug, Clone)]
pub struct TokenEncoder {
    /// Shared key ring holder.
    key_store: Arc<KeyStore>,
    /// Optional kid pinning the signing key for this encoder.
    key_ref: Option<String>,
    /// Token lifetime in seconds.
    ttl_seconds: i64,
}

impl TokenEncoder {
    /// Creates a new encoder from guard configuration.
    pub fn new(key_store: Arc<KeyStore>, config: &GuardConfig) -> Self {
        Self {
            key_store,
            key_ref: config.key_ref.clone(),
            ttl_seconds: config.ttl_seconds as i64,
        }
    }

    /// Issues a signed token for `subject` carrying `custom` claims.
    ///
    /// Stamps `iat = now`, `exp = now + ttl`, and a fresh `jti`. Custom
    /// claims shadowing reserved names are dropped.
    pub fn issue(
        &self,
        subject: &str,
        mut custom: serde_json::Map<String, serde_json::Value>,
    ) -> AppResult<IssuedToken> {
        for reserved in RESERVED_CLAIMS {
            custom.remove(reserved);
        }

        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.ttl_seconds,
            jti: Uuid::new_v4(),
            custom,
        };

        let ring = self.key_store.current();
        let (kid, key) = ring.signing_key(self.key_ref.as_deref())?;

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(kid.to_string());

        let token = encode(&header, &claims, key)
            .map_err(|e| AppError::with_source(
                guardpost_core::error::ErrorKind::Internal,
                format!("Failed to encode token: {e}"),
                e,
            ))?;

        Ok(IssuedToken { token, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardpost_core::config::auth::KeyRole;

    use crate::keys::{KeyMaterial, KeyRing};

    fn encoder(ttl_seconds: u64) -> TokenEncoder {
        let ring = KeyRing::from_materials(vec![KeyMaterial {
            kid: "k1".to_string(),
            secret: b"0123456789abcdef0123456789abcdef".to_vec(),
            role: KeyRole::Signing,
        }])
        .unwrap();
        TokenEncoder::new(
            Arc::new(KeyStore::new(ring)),
            &GuardConfig {
                ttl_seconds,
                ..GuardConfig::default()
            },
        )
    }

    #[test]
    fn stamps_lifetime_and_fresh_jti() {
        let encoder = encoder(900);
        let a = encoder.issue("user-1", serde_json::Map::new()).unwrap();
        let b = encoder.issue("user-1", serde_json::Map::new()).unwrap();

        assert_eq!(a.claims.exp - a.claims.iat, 900);
        assert!(a.claims.exp > a.claims.iat);
        assert_ne!(a.claims.jti, b.claims.jti);
    }

    #[test]
    fn reserved_custom_claims_are_dropped() {
        let encoder = encoder(900);
        let mut custom = serde_json::Map::new();
        custom.insert("sub".to_string(), serde_json::json!("spoofed"));
        custom.insert("tenant".to_string(), serde_json::json!("acme"));

        let issued = encoder.issue("user-1", custom).unwrap();
        assert_eq!(issued.claims.sub, "user-1");
        assert!(issued.claims.custom_claim("sub").is_none());
        assert_eq!(
            issued.claims.custom_claim("tenant"),
            Some(&serde_json::json!("acme"))
        );
    }

    #[test]
    fn token_has_three_segments() {
        let issued = encoder(900).issue("user-1", serde_json::Map::new()).unwrap();
        assert_eq!(issued.token.split('.').count(), 3);
    }
}
