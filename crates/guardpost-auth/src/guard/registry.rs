//! Registry of configured guards.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use guardpost_core::config::auth::AuthConfig;
use guardpost_core::error::AppError;
use guardpost_core::result::AppResult;
use guardpost_revocation::RevocationManager;

use crate::jwt::TokenManager;
use crate::keys::KeyStore;

use super::guard::Guard;

/// Holds all configured guards by name plus the optional default.
///
/// The registry is immutable after startup; which guard is *active* for a
/// given request is per-request state owned by the host integration, not
/// by the registry.
#[derive(Debug, Default)]
pub struct GuardRegistry {
    guards: HashMap<String, Arc<Guard>>,
    default_guard: Option<String>,
}

impl GuardRegistry {
    /// Creates an empty registry for manual assembly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from configuration, one guard per entry.
    ///
    /// All name references (guard `key_ref`s, `default_guard`) are
    /// resolved here so misconfiguration fails at startup rather than at
    /// dispatch time.
    pub fn from_config(
        config: &AuthConfig,
        key_store: Arc<KeyStore>,
        revocation: Arc<RevocationManager>,
    ) -> AppResult<Self> {
        config.validate()?;

        let mut registry = Self::new();
        for (name, guard_config) in &config.guards {
            let tokens = TokenManager::new(
                key_store.clone(),
                revocation.clone(),
                guard_config,
                config.leeway_seconds,
            );
            registry.register(
                name,
                Guard::new(name.clone(), tokens, guard_config.locations.clone()),
            );
        }
        registry.default_guard = config.default_guard.clone();

        info!(
            guards = ?registry.names(),
            default = ?registry.default_guard,
            "Guard registry initialized"
        );
        Ok(registry)
    }

    /// Registers a guard under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, guard: Guard) {
        self.guards.insert(name.into(), Arc::new(guard));
    }

    /// Sets the default guard used when a route carries no metadata.
    pub fn set_default(&mut self, name: impl Into<String>) -> AppResult<()> {
        let name = name.into();
        self.ensure_registered(&name)?;
        self.default_guard = Some(name);
        Ok(())
    }

    /// Looks up a guard by name.
    pub fn get(&self, name: &str) -> AppResult<Arc<Guard>> {
        self.guards
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::unknown_guard(name))
    }

    /// The configured default guard.
    pub fn default_guard(&self) -> AppResult<Arc<Guard>> {
        match &self.default_guard {
            Some(name) => self.get(name),
            None => Err(AppError::no_active_guard()),
        }
    }

    /// Fails with `UnknownGuard` unless `name` is registered. Intended
    /// for route-registration-time validation.
    pub fn ensure_registered(&self, name: &str) -> AppResult<()> {
        if self.guards.contains_key(name) {
            Ok(())
        } else {
            Err(AppError::unknown_guard(name))
        }
    }

    /// Registered guard names, unordered.
    pub fn names(&self) -> Vec<&str> {
        self.guards.keys().map(String::as_str).collect()
    }
}
