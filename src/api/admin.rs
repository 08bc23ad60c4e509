//! Admin settings endpoints
//!
//! GET /admin/themetog  - candidate themes and the current selection
//! POST /admin/themetog - save the second theme and menu placement

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::{error_response, AppState, Session};
use crate::admin::{AdminError, SecondThemeUpdate};

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/themetog", get(show).post(save))
}

/// Reject anyone who is not a logged-in administrator
fn require_admin(session: &Session) -> Result<(), Response> {
    match &session.user {
        Some(user) if user.is_admin => Ok(()),
        Some(_) => Err(error_response(StatusCode::FORBIDDEN, "admin access required")),
        None => Err(error_response(StatusCode::UNAUTHORIZED, "not logged in")),
    }
}

async fn show(State(state): State<AppState>, session: Session) -> Response {
    if let Err(response) = require_admin(&session) {
        return response;
    }

    match state.admin.second_theme_form().await {
        Ok(form) => Json(form).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn save(
    State(state): State<AppState>,
    session: Session,
    Json(update): Json<SecondThemeUpdate>,
) -> Response {
    if let Err(response) = require_admin(&session) {
        return response;
    }

    match state.admin.save(update).await {
        Ok(settings) => Json(settings).into_response(),
        Err(e @ AdminError::NotACandidate(_)) => error_response(StatusCode::BAD_REQUEST, e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
