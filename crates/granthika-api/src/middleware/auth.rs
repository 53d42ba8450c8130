//! Session extractor
//!
//! Protected handlers take [`CurrentAdmin`]. The token comes from the session
//! cookie, or from an `Authorization: Bearer` header for non-browser clients.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use granthika_core::domain::AdminIdentity;
use granthika_core::error::ErrorKind;
use granthika_shared::constants::SESSION_COOKIE_NAME;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::routes::paths;
use crate::state::AppState;

/// The signed-in administrator.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub AdminIdentity);

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(admin) = parts.extensions.get::<CurrentAdmin>() {
            return Ok(admin.clone());
        }

        let token = match session_token(&parts.headers) {
            Some(token) => token,
            None => {
                debug!("No session on {}", parts.uri);
                return Err(ApiError::Unauthorized);
            }
        };

        match state.auth.authenticate_token(&token).await {
            Ok(identity) => {
                let admin = CurrentAdmin(identity);
                parts.extensions.insert(admin.clone());
                Ok(admin)
            }
            Err(e) if e.kind() == ErrorKind::Unauthorized => {
                warn!("Session rejected on {}", parts.uri);
                Err(ApiError::Unauthorized)
            }
            Err(e) => Err(ApiError::from_domain(e, paths::SIGN_IN)),
        }
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.to_string());

    from_cookie.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// `Set-Cookie` value for a new session. Without `max_age` the cookie ends
/// with the browser session.
pub fn session_cookie(token: &str, max_age: Option<i64>, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE_NAME, token);
    if let Some(seconds) = max_age {
        cookie.push_str(&format!("; Max-Age={}", seconds));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", Some(0), secure)
}
