//! Unified error types for Guardpost.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The kind set distinguishes
//! authentication failures (client behavior) from configuration errors
//! (deployment bugs) so the two are never conflated in logs or metrics.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The token is structurally invalid (bad segments, bad base64, bad JSON).
    MalformedToken,
    /// The token signature does not verify against any currently valid key.
    InvalidSignature,
    /// The token is outside its temporal validity window.
    Expired,
    /// The token has been explicitly denylisted by its identifier.
    Revoked,
    /// No token was presented, or authentication failed generically.
    Unauthenticated,
    /// A route references a guard name that was never registered.
    UnknownGuard,
    /// A request reached authentication with no guard selected and no default configured.
    NoActiveGuard,
    /// A configuration error occurred (bad key material, invalid TTL, etc.).
    Configuration,
    /// The revocation store backend failed.
    Store,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind is an authentication failure caused by the client.
    ///
    /// Authentication failures surface uniformly to callers; configuration
    /// errors (`UnknownGuard`, `NoActiveGuard`, `Configuration`) indicate a
    /// deployment bug and are surfaced as server-side errors instead.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken
                | Self::InvalidSignature
                | Self::Expired
                | Self::Revoked
                | Self::Unauthenticated
        )
    }

    /// Whether this kind indicates a server-side misconfiguration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownGuard | Self::NoActiveGuard | Self::Configuration
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedToken => write!(f, "MALFORMED_TOKEN"),
            Self::InvalidSignature => write!(f, "INVALID_SIGNATURE"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Revoked => write!(f, "REVOKED"),
            Self::Unauthenticated => write!(f, "UNAUTHENTICATED"),
            Self::UnknownGuard => write!(f, "UNKNOWN_GUARD"),
            Self::NoActiveGuard => write!(f, "NO_ACTIVE_GUARD"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Store => write!(f, "STORE"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Guardpost.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire workspace boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a malformed-token error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedToken, message)
    }

    /// Create an invalid-signature error.
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSignature, message)
    }

    /// Create an expired-token error.
    pub fn expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Expired, message)
    }

    /// Create a revoked-token error.
    pub fn revoked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Revoked, message)
    }

    /// Create an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Create an unknown-guard error.
    pub fn unknown_guard(name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownGuard,
            format!("guard '{name}' is not registered"),
        )
    }

    /// Create a no-active-guard error.
    pub fn no_active_guard() -> Self {
        Self::new(
            ErrorKind::NoActiveGuard,
            "no guard selected for this request and no default guard configured",
        )
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
