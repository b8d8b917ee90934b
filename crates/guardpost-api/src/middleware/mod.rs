//! Axum middleware for guard resolution and request logging.

pub mod guard;
pub mod logging;

pub use guard::{ActiveGuard, RouteGuard, RouterGuardExt, resolve_route_guard};
