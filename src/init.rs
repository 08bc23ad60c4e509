//! Database initialization module
//!
//! Provides one-time database setup for the themetog_init tool.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::admin::AdminService;
use crate::auth::accounts::AccountService;
use crate::db::Database;
use crate::settings::{SettingsStore, KNOWN_THEMES, THEME_ALLOW, THEME_GUESTS};
use crate::theme::ThemeCatalog;

/// Name of the theme installed first, which becomes the guest theme
pub const DEFAULT_THEME_NAME: &str = "Default";

/// Initialize a new forum database
///
/// # Arguments
/// * `path` - Path to the SQLite database file (must not exist)
/// * `admin_username` - Username for the admin account
/// * `admin_password` - Password for the admin account (must be >= 8 chars)
/// * `extra_themes` - Names of themes to install after the default theme
///
/// # Errors
/// * Database file already exists
/// * Password too short
/// * Database creation fails
pub async fn init_database(
    path: &Path,
    admin_username: &str,
    admin_password: &str,
    extra_themes: &[String],
) -> Result<()> {
    if path.exists() {
        bail!(
            "Database file already exists: {}. Remove it first or use a different path.",
            path.display()
        );
    }

    if admin_password.len() < 8 {
        bail!("Admin password must be at least 8 characters");
    }

    let path_str = path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", path.display()))?;

    info!("Creating new database at {}", path.display());
    let db = Database::new(Some(path_str)).await?;
    let pool = db.pool().clone();

    // Install themes; the first one is the guest theme
    let catalog = ThemeCatalog::new(pool.clone());
    let default = catalog.add(DEFAULT_THEME_NAME).await?;
    let mut known = vec![default.id.to_string()];
    for name in extra_themes {
        let theme = catalog.add(name).await?;
        info!("Installed theme '{}' ({})", theme.name, theme.id);
        known.push(theme.id.to_string());
    }

    let settings = SettingsStore::new(pool.clone());
    settings
        .update(&[
            (THEME_GUESTS, default.id.to_string()),
            (THEME_ALLOW, "1".to_string()),
            (KNOWN_THEMES, known.join(",")),
        ])
        .await?;

    // Picks the lowest non-guest theme when there is one
    let form = AdminService::new(settings, catalog)
        .second_theme_form()
        .await?;
    match form.selected {
        Some(second) => info!("Second theme: {}", second),
        None => info!("Only one theme installed; toggling stays disabled until another is added"),
    }

    let accounts = AccountService::new(pool);
    let (admin, _) = accounts
        .create_account(admin_username, admin_password, default.id)
        .await?;
    accounts.set_admin(admin.id, true).await?;
    info!("Created admin account '{}' ({})", admin_username, admin.id);

    info!("Database initialization complete");
    Ok(())
}
