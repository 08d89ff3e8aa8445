//! services/api/src/web/middleware.rs
//!
//! Session cookie helpers and the authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::web::{envelope::ErrorEnvelope, state::AppState};

pub const SESSION_COOKIE: &str = "session";

/// Finds the session id in the request's `Cookie` header.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            c.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|id| !id.is_empty())
}

/// Builds the `Set-Cookie` value for a session; `max_age_secs = 0` clears it.
pub fn session_cookie(session_id: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, session_id, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Middleware that validates the auth session cookie and resolves the user behind it.
///
/// If valid, inserts the `SessionUser` into request extensions for handlers to use.
/// If invalid or missing, answers 401 with the error envelope.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ErrorEnvelope> {
    let session_id = session_id_from_headers(req.headers()).map(str::to_string);
    let user = state
        .auth
        .current_user(session_id.as_deref())
        .await
        .ok_or_else(|| ErrorEnvelope::unauthorized("Login required").with_empty_flashcards())?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
