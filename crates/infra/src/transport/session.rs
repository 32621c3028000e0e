//! Session-cookie bearer derivation
//!
//! The backend authenticates with a bearer token derived from the httpOnly
//! session cookie. Derivation is shared between the proxy routes (per-request
//! cookie) and the backend clients (the gateway's own session).

/// Name of the session cookie the bearer token is derived from.
pub const SESSION_COOKIE_NAME: &str = "ca_session";

/// Extract the bearer token from a `Cookie` header value.
///
/// Returns `None` when the session cookie is absent or empty.
pub fn derive_bearer(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE_NAME)?.strip_prefix('='))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
