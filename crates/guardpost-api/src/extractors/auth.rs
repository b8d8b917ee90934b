//! `AuthPrincipal` extractor: authenticates the request with the active
//! guard and injects the resulting principal.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;

use guardpost_auth::Principal;
use guardpost_core::traits::request::TokenSource;

use crate::error::ApiError;
use crate::middleware::guard::ActiveGuard;
use crate::state::AppState;

/// Extracted authenticated principal available in handlers.
///
/// Authentication uses the guard activated for this request by the
/// resolver middleware, falling back to the registry default when the
/// resolver did not run for this route.
#[derive(Debug, Clone)]
pub struct AuthPrincipal(pub Principal);

impl AuthPrincipal {
    /// Returns the inner [`Principal`].
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl std::ops::Deref for AuthPrincipal {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let guard = match parts.extensions.get::<ActiveGuard>() {
            Some(active) => active.0.clone(),
            None => state.registry.default_guard()?,
        };

        let source = HeaderTokenSource {
            headers: &parts.headers,
        };
        let principal = guard.authenticate(&source).await?;

        Ok(AuthPrincipal(principal))
    }
}

/// `TokenSource` view over the request headers.
pub(crate) struct HeaderTokenSource<'a> {
    pub(crate) headers: &'a HeaderMap,
}

impl TokenSource for HeaderTokenSource<'_> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}
