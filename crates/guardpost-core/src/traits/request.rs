//! Request seam between the authentication core and the HTTP host.

/// Read-only view of an incoming request's token-bearing fields.
///
/// Guards consume this instead of a concrete request type so the core
/// stays independent of the host framework; the API crate implements it
/// over Axum request parts.
pub trait TokenSource: Sync {
    /// Value of the named header, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Value of the named cookie, if present.
    fn cookie(&self, name: &str) -> Option<&str>;

    /// Token from an `Authorization: Bearer <token>` header, if present.
    fn bearer(&self) -> Option<&str> {
        self.header("authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
