//! Raw key material decoded from configuration.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use guardpost_core::config::auth::{KeyConfig, KeyRole};
use guardpost_core::error::AppError;

/// A single key: identifier, decoded HMAC secret, and role.
#[derive(Clone)]
pub struct KeyMaterial {
    /// Key identifier, written into token headers.
    pub kid: String,
    /// Decoded HMAC secret bytes.
    pub secret: Vec<u8>,
    /// Whether this key may sign or only verify.
    pub role: KeyRole,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secret bytes are never printed.
        f.debug_struct("KeyMaterial")
            .field("kid", &self.kid)
            .field("role", &self.role)
            .finish()
    }
}

impl KeyMaterial {
    /// Decode a configured key.
    pub fn from_config(config: &KeyConfig) -> Result<Self, AppError> {
        let secret = STANDARD.decode(&config.secret).map_err(|e| {
            AppError::configuration(format!("key '{}' has invalid base64 secret: {e}", config.kid))
        })?;

        if secret.is_empty() {
            return Err(AppError::configuration(format!(
                "key '{}' has an empty secret",
                config.kid
            )));
        }

        Ok(Self {
            kid: config.kid.clone(),
            secret,
            role: config.role,
        })
    }

    /// Decode the full ordered key list from configuration.
    pub fn from_config_list(configs: &[KeyConfig]) -> Result<Vec<Self>, AppError> {
        configs.iter().map(Self::from_config).collect()
    }
}
