//! Request session: who is asking
//!
//! The bearer token comes from the `Authorization` header or, for plain
//! browser navigation, the session cookie. A missing or unknown token makes
//! the request a guest request rather than an error.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::Response,
};
use tracing::warn;

use super::{error_response, AppState};
use crate::profile::UserSettings;

/// Cookie carrying the bearer token
pub const SESSION_COOKIE: &str = "themetog_token";

/// The current viewer
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// None for guests
    pub user: Option<UserSettings>,
}

impl Session {
    pub fn is_guest(&self) -> bool {
        self.user.is_none()
    }
}

/// Extract the bearer token from a request's headers
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let from_auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    if let Some(token) = from_auth.filter(|t| !t.is_empty()) {
        return Some(token);
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Session::default());
        };

        let member = state.accounts.validate_token(token).await.map_err(|e| {
            warn!("Session lookup failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        })?;
        let Some(member) = member else {
            return Ok(Session::default());
        };

        // Served from the user settings cache, like every other page load
        let user = state.profiles.user_settings(member.id).await.map_err(|e| {
            warn!("Loading user settings for {} failed: {}", member.id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        })?;

        Ok(Session { user })
    }
}
