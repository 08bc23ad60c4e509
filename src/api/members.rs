//! Member views
//!
//! GET /me            - the caller's user settings
//! GET /profile/{id}  - a member's public profile
//! GET /menu          - the caller's menus, including the toggle button

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{error_response, AppState, Session};
use crate::menu::{build_menus, MenuContext};
use crate::toggle::UserId;

/// Build the member views router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/profile/{id}", get(profile))
        .route("/menu", get(menu))
}

async fn me(session: Session) -> Response {
    match session.user {
        Some(user) => Json(user).into_response(),
        None => error_response(StatusCode::UNAUTHORIZED, "not logged in"),
    }
}

async fn profile(State(state): State<AppState>, Path(id): Path<UserId>) -> Response {
    match state.profiles.member_profile(id).await {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "member not found"),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Menu query params
#[derive(Debug, Deserialize)]
struct MenuQuery {
    area: Option<String>,
}

async fn menu(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MenuQuery>,
) -> Response {
    let settings = match state.settings.load().await {
        Ok(settings) => settings,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let ctx = MenuContext {
        is_guest: session.is_guest(),
        area: query.area.as_deref(),
    };
    Json(build_menus(&settings, &ctx, &state.board_url)).into_response()
}
