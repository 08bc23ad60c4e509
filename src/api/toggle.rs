//! Theme toggle entry points
//!
//! GET /themetog                 - toggle, then redirect back (full page)
//! GET|POST /xmlhttp/themetog    - toggle, then `{"status": "OK"}` (scripted)
//!
//! Scripted callers are recognised by `X-Requested-With: XMLHttpRequest` or an
//! `X-Themetog-Ajax` header. A plain browser request that reaches the scripted
//! endpoint is still redirected so it never lands on a bare status body.

use axum::{
    extract::State,
    http::{header, uri::Authority, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

use super::{error_response, AppState, Session};
use crate::toggle::{ThemeId, ToggleRequest};

/// Header set by the toggle script
const AJAX_HEADER: &str = "x-themetog-ajax";

/// Build the toggle router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/themetog", get(navigate))
        .route("/xmlhttp/themetog", get(status).post(status))
}

/// Status response for scripted callers
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Whether the request came from a script rather than a page navigation
pub fn is_async_request(headers: &HeaderMap) -> bool {
    let requested_with = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
    requested_with || headers.contains_key(AJAX_HEADER)
}

fn default_port(scheme: &str) -> u16 {
    if scheme == "http" {
        80
    } else {
        443
    }
}

/// Same scheme, host and port; a missing scheme counts as https
fn is_same_origin(a: &Uri, b: &Uri) -> bool {
    let a_scheme = a.scheme_str().unwrap_or("https");
    let b_scheme = b.scheme_str().unwrap_or("https");
    let same_host = match (a.host(), b.host()) {
        (Some(a_host), Some(b_host)) => a_host.eq_ignore_ascii_case(b_host),
        _ => false,
    };

    a_scheme == b_scheme
        && same_host
        && a.port_u16().unwrap_or_else(|| default_port(a_scheme))
            == b.port_u16().unwrap_or_else(|| default_port(b_scheme))
}

/// Whether an absolute referer names the host this request was sent to
fn is_request_host(referer: &Uri, host: Option<&str>) -> bool {
    let Some(authority) = host.and_then(|h| h.parse::<Authority>().ok()) else {
        return false;
    };
    let scheme = referer.scheme_str().unwrap_or("https");

    referer
        .host()
        .is_some_and(|h| h.eq_ignore_ascii_case(authority.host()))
        && referer.port_u16().unwrap_or_else(|| default_port(scheme))
            == authority.port_u16().unwrap_or_else(|| default_port(scheme))
}

/// Parsed referer when it points back at this site, None for foreign or
/// malformed ones
fn local_referer(referer: &str, host: Option<&str>, board: Option<&Uri>) -> Option<Uri> {
    // Browsers read `\` as `/`, so `/\host` is protocol-relative too
    if referer.contains('\\') || referer.starts_with("//") {
        return None;
    }
    let uri: Uri = referer.parse().ok()?;

    match uri.scheme_str() {
        None => (uri.authority().is_none() && referer.starts_with('/')).then_some(uri),
        Some("http" | "https") => {
            let on_board = board.is_some_and(|b| is_same_origin(b, &uri));
            (on_board || is_request_host(&uri, host)).then_some(uri)
        }
        Some(_) => None,
    }
}

/// Where to send the member after a full-page toggle: the referring page when
/// it is on this site, otherwise the board root
pub fn return_location(headers: &HeaderMap, board_url: &str) -> String {
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|r| !r.is_empty());

    let Some(referer) = referer else {
        return board_url.to_string();
    };

    let board = board_url
        .parse::<Uri>()
        .ok()
        .filter(|b| b.scheme().is_some());

    match local_referer(referer, host, board.as_ref()) {
        // Going back to a toggle URL would flip the theme again
        Some(uri) if !is_toggle_path(uri.path()) => referer.to_string(),
        _ => board_url.to_string(),
    }
}

fn is_toggle_path(path: &str) -> bool {
    path.trim_end_matches('/').ends_with("/themetog")
}

/// Toggle the session's theme with the current settings
async fn run_toggle(state: &AppState, session: &Session) -> Result<ThemeId, Response> {
    let settings = state.settings.load().await.map_err(|e| {
        warn!("Loading settings failed: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;

    let request = match &session.user {
        Some(user) => ToggleRequest {
            user_id: user.id,
            is_guest: false,
            current_theme: user.theme,
            allow_theme_choice: settings.allow_theme_choice,
        },
        None => ToggleRequest {
            user_id: 0,
            is_guest: true,
            current_theme: settings.guest_theme.unwrap_or(ThemeId::NONE),
            allow_theme_choice: settings.allow_theme_choice,
        },
    };

    state
        .toggler
        .toggle(&request, &settings.toggle_config())
        .await
        .map_err(|e| {
            warn!("Theme toggle for {} failed: {}", request.user_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        })
}

/// Full-page toggle: always answers with a redirect
async fn navigate(State(state): State<AppState>, session: Session, headers: HeaderMap) -> Response {
    if let Err(response) = run_toggle(&state, &session).await {
        return response;
    }
    Redirect::to(&return_location(&headers, &state.board_url)).into_response()
}

/// Scripted toggle: status body, redirecting non-scripted callers
async fn status(State(state): State<AppState>, session: Session, headers: HeaderMap) -> Response {
    if let Err(response) = run_toggle(&state, &session).await {
        return response;
    }

    let body = Json(StatusResponse { status: "OK" });
    if is_async_request(&headers) {
        return body.into_response();
    }

    let location = return_location(&headers, &state.board_url);
    (StatusCode::SEE_OTHER, [(header::LOCATION, location)], body).into_response()
}
