//! Identity resolution: opaque bearer token -> user. Absence of identity is
//! a normal outcome, never an error; callers decide whether that means
//! "anonymous" or "unauthorized".

use axum::http::{HeaderMap, header};
use tracing::warn;

use pulse_db::Database;
use pulse_db::models::UserRow;

/// Pull the raw credential out of the Authorization header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(strip_bearer(raw).to_string())
}

/// Tokens may arrive with or without the "Bearer " prefix.
pub fn strip_bearer(raw: &str) -> &str {
    raw.strip_prefix("Bearer ").unwrap_or(raw)
}

/// Exact-match token lookup; no expiry check. Storage trouble degrades to
/// "no identity" rather than failing the caller.
pub fn resolve(db: &Database, token: &str) -> Option<UserRow> {
    let token = strip_bearer(token);
    if token.is_empty() {
        return None;
    }
    match db.user_by_token(token) {
        Ok(user) => user,
        Err(e) => {
            warn!("Token lookup failed: {}", e);
            None
        }
    }
}
