//! Token validation against the current key ring.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use tracing::warn;

use guardpost_core::error::{AppError, ErrorKind};
use guardpost_core::result::AppResult;

use crate::keys::KeyStore;

use super::claims::Claims;

/// Validates tokens: structure, signature, and temporal checks.
///
/// Revocation is deliberately not consulted here; callers that need it
/// perform the registry lookup as a separate, explicit step.
#[derive(Debug, Clone)]
pub struct TokenDecoder {
    /// Shared key ring holder.
    key_store: Arc<KeyStore>,
    /// Clock-skew leeway in seconds.
    leeway_seconds: i64,
    /// Signature validation settings.
    validation: Validation,
}

impl TokenDecoder {
    /// Creates a new decoder with the configured clock-skew leeway.
    pub fn new(key_store: Arc<KeyStore>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Temporal checks run on a single clock read in `verify` so the
        // leeway applies symmetrically; jsonwebtoken's own exp check is
        // disabled.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key_store,
            leeway_seconds: leeway_seconds as i64,
            validation,
        }
    }

    /// The configured leeway in seconds.
    pub fn leeway_seconds(&self) -> i64 {
        self.leeway_seconds
    }

    /// Decodes and fully validates a token: structure, signature against
    /// the current ring, and temporal validity.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decode_signed(token)?;
        self.check_temporal(&claims, Utc::now().timestamp())?;
        Ok(claims)
    }

    /// Decodes a token checking structure and signature only.
    ///
    /// Used by refresh, where an expired token is still acceptable within
    /// the refresh window.
    pub fn decode_signed(&self, token: &str) -> AppResult<Claims> {
        // Structure first: reject malformed input before any crypto.
        let header = decode_header(token)
            .map_err(|e| AppError::malformed(format!("invalid token structure: {e}")))?;

        if header.alg != Algorithm::HS256 {
            warn!(alg = ?header.alg, "token presented with unexpected signing algorithm");
            return Err(AppError::invalid_signature("unexpected signing algorithm"));
        }

        let ring = self.key_store.current();
        match header.kid.as_deref() {
            Some(kid) => match ring.decoding_key(kid) {
                Some(key) => self.try_decode(token, key),
                None => {
                    warn!(kid = %kid, "token references a key id not in the ring");
                    Err(AppError::invalid_signature(format!(
                        "unknown key id '{kid}'"
                    )))
                }
            },
            None => {
                // No kid: the token may predate kid stamping. Try every
                // verification key in the current ring.
                let mut last: Option<AppError> = None;
                for (_, key) in ring.verification_keys() {
                    match self.try_decode(token, key) {
                        Ok(claims) => return Ok(claims),
                        Err(e) if e.kind == ErrorKind::InvalidSignature => last = Some(e),
                        Err(e) => return Err(e),
                    }
                }
                warn!("token signature did not verify against any ring key");
                Err(last
                    .unwrap_or_else(|| AppError::invalid_signature("no verification keys in ring")))
            }
        }
    }

    /// Temporal validity on a single clock reading, leeway applied
    /// symmetrically to expiry-in-past and issued-at-in-future.
    pub(crate) fn check_temporal(&self, claims: &Claims, now: i64) -> AppResult<()> {
        if claims.iat - self.leeway_seconds > now {
            return Err(AppError::expired("token issued in the future"));
        }
        if now - self.leeway_seconds >= claims.exp {
            return Err(AppError::expired("token has expired"));
        }
        Ok(())
    }

    fn try_decode(&self, token: &str, key: &DecodingKey) -> AppResult<Claims> {
        let data = decode::<Claims>(token, key, &self.validation).map_err(map_jwt_error)?;
        Ok(data.claims)
    }
}

/// Maps jsonwebtoken errors into the workspace taxonomy.
fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AppError {
    use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

    match e.kind() {
        JwtErrorKind::InvalidSignature => {
            warn!("token signature verification failed");
            AppError::invalid_signature("token signature does not verify")
        }
        JwtErrorKind::ExpiredSignature => AppError::expired("token has expired"),
        _ => AppError::malformed(format!("invalid token structure: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    use guardpost_core::config::auth::{GuardConfig, KeyRole};

    use crate::jwt::encoder::TokenEncoder;
    use crate::keys::{KeyMaterial, KeyRing};

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn material(kid: &str, secret: &[u8], role: KeyRole) -> KeyMaterial {
        KeyMaterial {
            kid: kid.to_string(),
            secret: secret.to_vec(),
            role,
        }
    }

    fn store() -> Arc<KeyStore> {
        Arc::new(KeyStore::new(
            KeyRing::from_materials(vec![material("k1", SECRET, KeyRole::Signing)]).unwrap(),
        ))
    }

    fn encoder(store: &Arc<KeyStore>) -> TokenEncoder {
        TokenEncoder::new(store.clone(), &GuardConfig::default())
    }

    fn raw_token(kid: Option<&str>, secret: &[u8], iat: i64, exp: i64) -> String {
        let claims = Claims {
            sub: "user-1".to_string(),
            iat,
            exp,
            jti: Uuid::new_v4(),
            custom: serde_json::Map::new(),
        };
        let mut header = Header::new(Algorithm::HS256);
        header.kid = kid.map(String::from);
        encode(&header, &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn roundtrip_preserves_claims() {
        let store = store();
        let decoder = TokenDecoder::new(store.clone(), 0);

        let mut custom = serde_json::Map::new();
        custom.insert("tenant".to_string(), serde_json::json!("acme"));
        let issued = encoder(&store).issue("user-1", custom).unwrap();

        let claims = decoder.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.jti, issued.claims.jti);
        assert_eq!(claims.custom_claim("tenant"), Some(&serde_json::json!("acme")));
    }

    #[test]
    fn tampering_never_verifies() {
        let store = store();
        let decoder = TokenDecoder::new(store.clone(), 0);
        let issued = encoder(&store).issue("user-1", serde_json::Map::new()).unwrap();

        // Flip one character in every position of the token.
        for i in 0..issued.token.len() {
            let mut bytes = issued.token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let Ok(tampered) = String::from_utf8(bytes) else {
                continue;
            };
            if tampered == issued.token {
                continue;
            }
            let err = decoder.verify(&tampered).unwrap_err();
            assert!(
                matches!(
                    err.kind,
                    ErrorKind::InvalidSignature | ErrorKind::MalformedToken
                ),
                "position {i} produced {:?}",
                err.kind
            );
        }
    }

    #[test]
    fn garbage_input_is_malformed() {
        let decoder = TokenDecoder::new(store(), 0);
        for input in ["", "not-a-token", "a.b", "a.b.c.d"] {
            let err = decoder.verify(input).unwrap_err();
            assert_eq!(err.kind, ErrorKind::MalformedToken, "input {input:?}");
        }
    }

    #[test]
    fn expiry_boundary_without_leeway() {
        let decoder = TokenDecoder::new(store(), 0);
        let now = Utc::now().timestamp();

        let expired = raw_token(Some("k1"), SECRET, now - 60, now - 1);
        assert_eq!(decoder.verify(&expired).unwrap_err().kind, ErrorKind::Expired);

        // Two seconds out keeps the assertion stable across a tick of the
        // wall clock between issuance and verification.
        let live = raw_token(Some("k1"), SECRET, now - 60, now + 2);
        assert!(decoder.verify(&live).is_ok());
    }

    #[test]
    fn leeway_admits_recently_expired_token() {
        let decoder = TokenDecoder::new(store(), 30);
        let now = Utc::now().timestamp();
        let token = raw_token(Some("k1"), SECRET, now - 60, now - 5);
        assert!(decoder.verify(&token).is_ok());
    }

    #[test]
    fn issued_in_future_is_rejected_symmetrically() {
        let decoder = TokenDecoder::new(store(), 0);
        let now = Utc::now().timestamp();
        let token = raw_token(Some("k1"), SECRET, now + 120, now + 900);
        assert_eq!(decoder.verify(&token).unwrap_err().kind, ErrorKind::Expired);

        // Within leeway the same token is admitted.
        let lenient = TokenDecoder::new(store(), 300);
        assert!(lenient.verify(&token).is_ok());
    }

    #[test]
    fn token_survives_rotation_while_old_key_verifies() {
        let store = store();
        let decoder = TokenDecoder::new(store.clone(), 0);
        let issued = encoder(&store).issue("user-1", serde_json::Map::new()).unwrap();

        store
            .rotate(vec![
                material("k2", b"fedcba9876543210fedcba9876543210", KeyRole::Signing),
                material("k1", SECRET, KeyRole::VerifyOnly),
            ])
            .unwrap();
        assert!(decoder.verify(&issued.token).is_ok());

        // Once k1 leaves the ring, the old token no longer verifies.
        store
            .rotate(vec![material(
                "k2",
                b"fedcba9876543210fedcba9876543210",
                KeyRole::Signing,
            )])
            .unwrap();
        assert_eq!(
            decoder.verify(&issued.token).unwrap_err().kind,
            ErrorKind::InvalidSignature
        );
    }

    #[test]
    fn kid_less_token_is_tried_against_every_key() {
        let store = Arc::new(KeyStore::new(
            KeyRing::from_materials(vec![
                material("k2", b"fedcba9876543210fedcba9876543210", KeyRole::Signing),
                material("k1", SECRET, KeyRole::VerifyOnly),
            ])
            .unwrap(),
        ));
        let decoder = TokenDecoder::new(store, 0);
        let now = Utc::now().timestamp();

        let token = raw_token(None, SECRET, now - 60, now + 900);
        assert!(decoder.verify(&token).is_ok());
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let decoder = TokenDecoder::new(store(), 0);
        let now = Utc::now().timestamp();
        let token = raw_token(Some("k1"), b"another-secret-another-secret!!", now, now + 900);
        assert_eq!(
            decoder.verify(&token).unwrap_err().kind,
            ErrorKind::InvalidSignature
        );
    }

    #[test]
    fn unexpected_algorithm_is_rejected_before_verification() {
        let decoder = TokenDecoder::new(store(), 0);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".to_string(),
            iat: now,
            exp: now + 900,
            jti: Uuid::new_v4(),
            custom: serde_json::Map::new(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(
            decoder.verify(&token).unwrap_err().kind,
            ErrorKind::InvalidSignature
        );
    }
}
