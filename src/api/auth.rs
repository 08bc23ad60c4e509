//! Authentication API endpoints

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::session::{session_token, SESSION_COOKIE};
use super::{error_response, AppState};
use crate::auth::accounts::{AuthError, Member};
use crate::toggle::ThemeId;

/// Build auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Username/password request (register and login)
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Authentication response (for register and login)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub member_id: i64,
    pub username: String,
    pub theme: ThemeId,
    pub is_admin: bool,
}

/// Respond with the token in the body and as the session cookie
fn authenticated(status: StatusCode, member: Member, token: String) -> Response {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token
    );
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            member_id: member.id,
            username: member.username,
            theme: member.theme,
            is_admin: member.is_admin,
        }),
    )
        .into_response()
}

/// Register a new member on the guest theme
async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    let guest_theme = match state.settings.load().await {
        Ok(settings) => settings.guest_theme.unwrap_or(ThemeId::NONE),
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    match state
        .accounts
        .create_account(&req.username, &req.password, guest_theme)
        .await
    {
        Ok((member, token)) => {
            info!("Registered member {} ({})", member.username, member.id);
            authenticated(StatusCode::CREATED, member, token)
        }
        Err(AuthError::UsernameExists) => {
            error_response(StatusCode::CONFLICT, "username already exists")
        }
        Err(e @ AuthError::InvalidUsername) => error_response(StatusCode::BAD_REQUEST, e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Login with username and password
async fn login(State(state): State<AppState>, Json(req): Json<CredentialsRequest>) -> Response {
    match state.accounts.login(&req.username, &req.password).await {
        Ok((member, token)) => authenticated(StatusCode::OK, member, token),
        Err(AuthError::InvalidCredentials) => {
            error_response(StatusCode::UNAUTHORIZED, "invalid credentials")
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Logout the session's token and clear the cookie
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = session_token(&headers) else {
        return Json(LogoutResponse { success: false }).into_response();
    };

    match state.accounts.logout(token).await {
        Ok(success) => {
            let cookie = format!("{}=; Path=/; Max-Age=0", SESSION_COOKIE);
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(LogoutResponse { success }),
            )
                .into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
