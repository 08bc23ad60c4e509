//! HTTP API module - toggle entry points, member views and admin settings

mod admin;
mod auth;
mod members;
mod session;
mod toggle;

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::admin::AdminService;
use crate::auth::accounts::AccountService;
use crate::cache::SettingsCache;
use crate::db::Database;
use crate::profile::ProfileReader;
use crate::settings::SettingsStore;
use crate::theme::ThemeCatalog;
use crate::toggle::ThemeToggleService;
use crate::Config;
pub use session::Session;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub board_url: Arc<str>,
    pub accounts: AccountService,
    pub settings: SettingsStore,
    pub profiles: ProfileReader,
    pub admin: AdminService,
    pub toggler: Arc<ThemeToggleService>,
}

/// Build the API router
pub fn router(db: Arc<Database>, config: &Config) -> Router {
    let pool = db.pool().clone();
    let accounts = AccountService::new(pool.clone());
    let settings = SettingsStore::new(pool.clone());
    let themes = ThemeCatalog::new(pool);
    let cache = Arc::new(SettingsCache::new(
        config.cache_enabled,
        Duration::from_secs(config.cache_ttl_secs),
    ));

    let toggler = Arc::new(ThemeToggleService::new(
        Arc::new(accounts.clone()),
        cache.clone(),
    ));
    let profiles = ProfileReader::new(accounts.clone(), themes.clone(), cache);
    let admin = AdminService::new(settings.clone(), themes);

    let state = AppState {
        db,
        board_url: Arc::from(config.board_url.as_str()),
        accounts,
        settings,
        profiles,
        admin,
        toggler,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(auth::router())
        .merge(toggle::router())
        .merge(members::router())
        .merge(admin::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON error body with a status code
pub(crate) fn error_response(status: StatusCode, error: impl ToString) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "themetog",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "ok",
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database: "error",
            }),
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}
