//! Immutable key-ring snapshots with atomic rotation.
//!
//! Verification during rotation is race-free because a [`KeyRing`] is
//! never mutated: readers hold an `Arc` to the snapshot they started
//! with, and [`KeyStore::rotate`] swaps in a freshly built ring.

use std::sync::{Arc, PoisonError, RwLock};

use jsonwebtoken::{DecodingKey, EncodingKey};
use tracing::info;

use guardpost_core::config::auth::{AuthConfig, KeyRole};
use guardpost_core::error::AppError;
use guardpost_core::result::AppResult;

use super::material::KeyMaterial;

/// One key in the ring with its prepared jsonwebtoken key forms.
struct KeyEntry {
    material: KeyMaterial,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// An immutable snapshot of all currently valid keys.
///
/// Every listed key verifies; exactly one (the first `signing`-role key,
/// unless a guard overrides by kid) signs new tokens.
pub struct KeyRing {
    entries: Vec<KeyEntry>,
    signing_kid: String,
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing")
            .field("kids", &self.kids())
            .field("signing_kid", &self.signing_kid)
            .finish()
    }
}

impl KeyRing {
    /// Build a ring from decoded key material.
    ///
    /// Fails when the list is empty, contains duplicate kids, or has no
    /// signing-role key. These are startup-time configuration errors.
    pub fn from_materials(materials: Vec<KeyMaterial>) -> AppResult<Self> {
        if materials.is_empty() {
            return Err(AppError::configuration("key ring cannot be empty"));
        }

        let mut seen = std::collections::HashSet::new();
        for material in &materials {
            if !seen.insert(material.kid.clone()) {
                return Err(AppError::configuration(format!(
                    "duplicate key id '{}' in ring",
                    material.kid
                )));
            }
        }

        let signing_kid = materials
            .iter()
            .find(|m| m.role == KeyRole::Signing)
            .map(|m| m.kid.clone())
            .ok_or_else(|| AppError::configuration("key ring has no signing-role key"))?;

        let entries = materials
            .into_iter()
            .map(|material| KeyEntry {
                encoding: EncodingKey::from_secret(&material.secret),
                decoding: DecodingKey::from_secret(&material.secret),
                material,
            })
            .collect();

        Ok(Self {
            entries,
            signing_kid,
        })
    }

    /// The signing key and its kid.
    ///
    /// `kid_override` pins a specific key (guards may issue under a
    /// non-default key); overriding to a verify-only or unknown kid is a
    /// configuration error.
    pub fn signing_key(&self, kid_override: Option<&str>) -> AppResult<(&str, &EncodingKey)> {
        let kid = kid_override.unwrap_or(&self.signing_kid);
        let entry = self
            .entries
            .iter()
            .find(|e| e.material.kid == kid)
            .ok_or_else(|| {
                AppError::configuration(format!("signing key '{kid}' is not in the ring"))
            })?;
        if entry.material.role != KeyRole::Signing {
            return Err(AppError::configuration(format!(
                "key '{kid}' is verify-only and cannot sign"
            )));
        }
        Ok((&entry.material.kid, &entry.encoding))
    }

    /// The verification key for a specific kid, if present.
    pub fn decoding_key(&self, kid: &str) -> Option<&DecodingKey> {
        self.entries
            .iter()
            .find(|e| e.material.kid == kid)
            .map(|e| &e.decoding)
    }

    /// All verification keys in configured order.
    pub fn verification_keys(&self) -> impl Iterator<Item = (&str, &DecodingKey)> {
        self.entries
            .iter()
            .map(|e| (e.material.kid.as_str(), &e.decoding))
    }

    /// Kids present in the ring, in configured order.
    pub fn kids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.material.kid.as_str()).collect()
    }
}

/// Process-wide holder of the current [`KeyRing`] snapshot.
///
/// Reads are lock-held only long enough to clone the `Arc`; rotation
/// builds the new ring outside the lock and swaps it in.
pub struct KeyStore {
    ring: RwLock<Arc<KeyRing>>,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore").field("ring", &self.current()).finish()
    }
}

impl KeyStore {
    /// Create a store holding the given initial ring.
    pub fn new(ring: KeyRing) -> Self {
        Self {
            ring: RwLock::new(Arc::new(ring)),
        }
    }

    /// Build a store from the configured key list.
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        let materials = KeyMaterial::from_config_list(&config.keys)?;
        Ok(Self::new(KeyRing::from_materials(materials)?))
    }

    /// The current ring snapshot.
    pub fn current(&self) -> Arc<KeyRing> {
        self.ring
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the ring with a freshly built snapshot.
    ///
    /// In-flight verifications keep the snapshot they already hold; new
    /// operations observe the rotated ring.
    pub fn rotate(&self, materials: Vec<KeyMaterial>) -> AppResult<()> {
        let ring = Arc::new(KeyRing::from_materials(materials)?);
        info!(kids = ?ring.kids(), signing_kid = %ring.signing_kid, "Rotated key ring");
        *self.ring.write().unwrap_or_else(PoisonError::into_inner) = ring;
        Ok(())
    }
}
