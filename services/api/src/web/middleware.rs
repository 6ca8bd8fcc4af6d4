//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::web::state::AppState;
use journal_core::ports::PortError;

/// Pulls the auth token from `Authorization: Bearer ...`, falling back to the
/// `session` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|t| !t.is_empty())
}

/// Middleware that validates the auth token and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract the token
    let token = extract_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Validate it against the session store, get user_id
    let user_id = state
        .db
        .validate_auth_session(token)
        .await
        .map_err(|e| {
            match e {
                PortError::Unauthorized => debug!("Rejected unknown or expired token"),
                other => error!("Failed to validate auth session: {:?}", other),
            }
            StatusCode::UNAUTHORIZED
        })?;

    // 3. Insert user_id into request extensions
    req.extensions_mut().insert(user_id);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session=xyz"));
        assert_eq!(extract_token(&headers), Some("abc"));

        headers.remove(header::AUTHORIZATION);
        assert_eq!(extract_token(&headers), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_tokens_are_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(extract_token(&headers), None);
    }
}
