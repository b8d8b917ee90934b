//! JWT claims structure carried by every issued token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claim names reserved by the token layer. Caller-supplied custom claims
/// under these names are discarded at issuance so the flattened encoding
/// cannot produce duplicate JSON keys.
pub const RESERVED_CLAIMS: [&str; 4] = ["sub", "iat", "exp", "jti"];

/// Claims payload embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, identifying the authenticated principal.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Token ID, unique per issuance, used for revocation lookups.
    pub jti: Uuid,
    /// Caller-supplied custom claims.
    #[serde(flatten)]
    pub custom: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Returns the issued-at as a `DateTime<Utc>`.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_else(Utc::now)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired (no leeway applied).
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Returns the remaining lifetime in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = self.exp - Utc::now().timestamp();
        if remaining > 0 { remaining as u64 } else { 0 }
    }

    /// Returns a custom claim by name.
    pub fn custom_claim(&self, name: &str) -> Option<&serde_json::Value> {
        self.custom.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_claims_flatten_into_top_level_json() {
        let mut custom = serde_json::Map::new();
        custom.insert("tenant".to_string(), serde_json::json!("acme"));
        let claims = Claims {
            sub: "user-1".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_000_900,
            jti: Uuid::new_v4(),
            custom,
        };

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["tenant"], "acme");
        assert_eq!(value["sub"], "user-1");

        let parsed: Claims = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.custom_claim("tenant"), Some(&serde_json::json!("acme")));
    }

    #[test]
    fn remaining_ttl_is_zero_for_expired_token() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".to_string(),
            iat: now - 120,
            exp: now - 60,
            jti: Uuid::new_v4(),
            custom: serde_json::Map::new(),
        };
        assert!(claims.is_expired());
        assert_eq!(claims.remaining_ttl_seconds(), 0);
    }
}
