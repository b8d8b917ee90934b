//! Authentication configuration: key material, guards, clock leeway.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Clock-skew leeway in seconds, applied symmetrically to
    /// expiry-in-past and issued-at-in-future checks.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Name of the guard used when a route carries no guard metadata.
    #[serde(default)]
    pub default_guard: Option<String>,
    /// Ordered list of key material. The first `signing`-role key is the
    /// active signing key; all listed keys are valid for verification.
    #[serde(default)]
    pub keys: Vec<KeyConfig>,
    /// Guards by name.
    #[serde(default)]
    pub guards: HashMap<String, GuardConfig>,
}

/// A single configured key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Key identifier, written into the token header for rotation-aware
    /// verification.
    pub kid: String,
    /// Base64-encoded HMAC secret.
    pub secret: String,
    /// Role of this key.
    #[serde(default)]
    pub role: KeyRole,
}

/// Whether a key may sign new tokens or only verify existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyRole {
    /// May sign new tokens and verify.
    #[default]
    Signing,
    /// Retained for verification only (rotation grace).
    VerifyOnly,
}

/// Per-guard authentication policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Optional kid override for the signing key this guard issues with.
    /// Defaults to the ring's active signing key.
    #[serde(default)]
    pub key_ref: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Grace window after expiry during which a token may still be refreshed.
    #[serde(default = "default_refresh_window")]
    pub refresh_window_seconds: u64,
    /// Recognized token locations, checked in order; first present wins.
    #[serde(default = "default_locations")]
    pub locations: Vec<TokenLocation>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            key_ref: None,
            ttl_seconds: default_ttl(),
            refresh_window_seconds: default_refresh_window(),
            locations: default_locations(),
        }
    }
}

/// Where a guard looks for the token on an incoming request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenLocation {
    /// `Authorization: Bearer <token>` header.
    Bearer,
    /// An arbitrary request header carrying the bare token.
    Header {
        /// Header name.
        name: String,
    },
    /// A request cookie carrying the bare token.
    Cookie {
        /// Cookie name.
        name: String,
    },
}

impl AuthConfig {
    /// Validate cross-field invariants at startup.
    ///
    /// Converts misconfiguration (duplicate kids, dangling `key_ref` or
    /// `default_guard`, zero TTLs) into startup errors instead of
    /// dispatch-time surprises.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.keys.is_empty() {
            return Err(AppError::configuration("no keys configured"));
        }

        let mut seen = std::collections::HashSet::new();
        for key in &self.keys {
            if !seen.insert(key.kid.as_str()) {
                return Err(AppError::configuration(format!(
                    "duplicate key id '{}'",
                    key.kid
                )));
            }
        }

        if !self.keys.iter().any(|k| k.role == KeyRole::Signing) {
            return Err(AppError::configuration(
                "no signing-role key configured; at least one key must be able to sign",
            ));
        }

        for (name, guard) in &self.guards {
            if guard.ttl_seconds == 0 {
                return Err(AppError::configuration(format!(
                    "guard '{name}' has a zero ttl_seconds"
                )));
            }
            if guard.locations.is_empty() {
                return Err(AppError::configuration(format!(
                    "guard '{name}' has no token locations"
                )));
            }
            if let Some(key_ref) = &guard.key_ref {
                let key = self
                    .keys
                    .iter()
                    .find(|k| &k.kid == key_ref)
                    .ok_or_else(|| {
                        AppError::configuration(format!(
                            "guard '{name}' references unknown key '{key_ref}'"
                        ))
                    })?;
                if key.role != KeyRole::Signing {
                    return Err(AppError::configuration(format!(
                        "guard '{name}' references verify-only key '{key_ref}' for signing"
                    )));
                }
            }
        }

        if let Some(default) = &self.default_guard {
            if !self.guards.contains_key(default) {
                return Err(AppError::configuration(format!(
                    "default_guard '{default}' is not a configured guard"
                )));
            }
        }

        Ok(())
    }
}

fn default_leeway() -> u64 {
    5
}

fn default_ttl() -> u64 {
    900
}

fn default_refresh_window() -> u64 {
    300
}

fn default_locations() -> Vec<TokenLocation> {
    vec![TokenLocation::Bearer]
}
