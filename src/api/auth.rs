//! Token extraction and authentication middleware.
//!
//! Tokens arrive either as `Authorization: Bearer <token>` or in the
//! session cookie; the header wins when both are present. Every
//! authenticated request re-loads the user from storage, so a deleted
//! account is locked out immediately regardless of token expiry.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::db::User;

/// The authenticated user, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie_name = state.config.auth.cookie_name.clone();

    let Some(token) = extract_token(&request, &cookie_name) else {
        return Err(ApiError::unauthorized("Unauthorized. No token provided."));
    };

    let claims = state
        .tokens
        .verify(&token)
        .map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            ApiError::unauthorized("Unauthorized. Invalid token.")
        })?;

    let user_id: i32 = claims
        .sub
        .parse()
        .map_err(|_| ApiError::unauthorized("Unauthorized. Invalid token."))?;

    // Fresh load: privilege and existence come from storage, never from
    // the token claims.
    let Some(user) = state.store.get_user(user_id).await? else {
        return Err(ApiError::NotFound("User not found.".to_string()));
    };

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Gate for admin-only routes; runs after [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<CurrentUser>()
        .is_some_and(|u| u.0.is_admin);

    if !is_admin {
        return Err(ApiError::Forbidden("Access denied. Admins only.".to_string()));
    }

    Ok(next.run(request).await)
}

fn extract_token(request: &Request, cookie_name: &str) -> Option<String> {
    if let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        && let Some(token) = auth_header.strip_prefix("Bearer ")
    {
        return Some(token.to_string());
    }

    let cookies = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?;

    extract_cookie_value(cookies, cookie_name).map(str::to_string)
}

fn extract_cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Build the `Set-Cookie` value carrying a session token.
#[must_use]
pub fn session_cookie(name: &str, token: &str, max_age_seconds: i64, secure: bool) -> String {
    let secure_flag = if secure { " Secure;" } else { "" };
    format!(
        "{name}={token}; HttpOnly;{secure_flag} SameSite=Strict; Path=/; Max-Age={max_age_seconds}"
    )
}

/// Build the `Set-Cookie` value that clears the session cookie.
#[must_use]
pub fn clear_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_cookie_value() {
        let cookies = "theme=dark; jwt=abc.def.ghi; lang=en";

        assert_eq!(extract_cookie_value(cookies, "jwt"), Some("abc.def.ghi"));
        assert_eq!(extract_cookie_value(cookies, "theme"), Some("dark"));
        assert_eq!(extract_cookie_value(cookies, "missing"), None);
        assert_eq!(extract_cookie_value("", "jwt"), None);
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("jwt", "tok", 604_800, false);
        assert_eq!(
            cookie,
            "jwt=tok; HttpOnly; SameSite=Strict; Path=/; Max-Age=604800"
        );

        let secure = session_cookie("jwt", "tok", 604_800, true);
        assert!(secure.contains("Secure;"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_cookie("jwt", false);
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("jwt=;"));
    }
}
