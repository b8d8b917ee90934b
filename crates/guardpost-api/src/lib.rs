//! # guardpost-api
//!
//! Axum integration layer for Guardpost.
//!
//! Attach a guard to a route with [`middleware::RouteGuard`] metadata,
//! install [`middleware::resolve_route_guard`] so the matched route's
//! guard is activated before the handler runs, and authenticate inside
//! handlers with the [`extractors::AuthPrincipal`] extractor.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod state;

pub use error::ApiError;
pub use extractors::AuthPrincipal;
pub use middleware::{ActiveGuard, RouteGuard, RouterGuardExt, resolve_route_guard};
pub use state::AppState;
