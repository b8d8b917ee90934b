//! Route-guard resolution: matches a request's route metadata to the
//! guard that will authenticate it.
//!
//! The active guard is request-scoped state carried in the request's own
//! extensions, never a process-wide field, so concurrent requests with
//! different guard names cannot interfere.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use axum::{Extension, Router};
use tracing::debug;

use guardpost_auth::Guard;
use guardpost_auth::GuardRegistry;
use guardpost_core::result::AppResult;

use crate::error::ApiError;
use crate::state::AppState;

/// Route metadata naming the guard that protects the route.
///
/// Attach with a per-route `Extension` layer:
///
/// ```ignore
/// Router::new()
///     .route("/admin/users", get(handler))
///     .route_layer(Extension(RouteGuard::new("admin")))
/// ```
#[derive(Debug, Clone)]
pub struct RouteGuard(pub String);

impl RouteGuard {
    /// Creates route metadata referencing `name`.
    ///
    /// The name is checked at dispatch time. Prefer
    /// [`validated`](Self::validated) where the registry is in scope, so
    /// a dangling name fails at route registration instead.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates route metadata, failing immediately if `name` is not
    /// registered.
    pub fn validated(name: impl Into<String>, registry: &GuardRegistry) -> AppResult<Self> {
        let name = name.into();
        registry.ensure_registered(&name)?;
        Ok(Self(name))
    }

    /// The referenced guard name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// The guard activated for the current request.
///
/// Inserted into request extensions by [`resolve_route_guard`]; read by
/// the `AuthPrincipal` extractor.
#[derive(Debug, Clone)]
pub struct ActiveGuard(pub Arc<Guard>);

/// Resolves the matched route's guard before the handler runs.
///
/// Runs once per matched request. Routes carrying [`RouteGuard`] metadata
/// get that guard activated; a name missing from the registry fails the
/// request as a configuration error and the handler never executes.
/// Routes without metadata fall back to the configured default guard, or
/// remain unresolved when none is configured (which only matters if the
/// handler actually authenticates).
pub async fn resolve_route_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let metadata = request.extensions().get::<RouteGuard>().cloned();

    match metadata {
        Some(route_guard) => {
            let guard = state.registry.get(route_guard.name())?;
            debug!(guard = %guard.name(), "Activated route guard");
            request.extensions_mut().insert(ActiveGuard(guard));
        }
        None => {
            if let Ok(guard) = state.registry.default_guard() {
                debug!(guard = %guard.name(), "Activated default guard");
                request.extensions_mut().insert(ActiveGuard(guard));
            }
        }
    }

    Ok(next.run(request).await)
}

/// Convenience for attaching a guard to a group of routes.
pub trait RouterGuardExt {
    /// Attaches `name` as guard metadata to the routes added so far and
    /// installs [`resolve_route_guard`] so resolution happens strictly
    /// before their handlers, and only for matched routes.
    fn with_guard(self, name: &str, state: AppState) -> Self;
}

impl RouterGuardExt for Router<AppState> {
    fn with_guard(self, name: &str, state: AppState) -> Self {
        // The metadata layer is added second so it sits outermost and the
        // resolver observes it on the way in.
        self.route_layer(from_fn_with_state(state, resolve_route_guard))
            .route_layer(Extension(RouteGuard::new(name)))
    }
}
