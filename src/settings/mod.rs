//! Forum-wide mod settings
//!
//! Settings are stored as plain `variable`/`value` strings. Missing, empty,
//! unparseable and sentinel (`0`) theme values all read as unset.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::toggle::{ThemeId, ToggleConfig};

/// Guest theme, also the forum default
pub const THEME_GUESTS: &str = "theme_guests";
/// Admin-selected second theme
pub const SECOND_THEME: &str = "themetog_second_theme";
/// Whether members may pick their own theme
pub const THEME_ALLOW: &str = "theme_allow";
/// Show the toggle in the profile popup instead of the main menu
pub const PROFILE_MENU: &str = "themetog_profile_menu";
/// Comma-separated ids of installed themes members may use
pub const KNOWN_THEMES: &str = "known_themes";

/// Snapshot of the settings the toggle depends on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModSettings {
    pub guest_theme: Option<ThemeId>,
    pub second_theme: Option<ThemeId>,
    pub allow_theme_choice: bool,
    pub profile_menu: bool,
    pub known_themes: Vec<ThemeId>,
}

impl ModSettings {
    fn from_values(values: &HashMap<String, String>) -> Self {
        Self {
            guest_theme: parse_theme(raw(values, THEME_GUESTS)),
            second_theme: parse_theme(raw(values, SECOND_THEME)),
            allow_theme_choice: parse_flag(raw(values, THEME_ALLOW)),
            profile_menu: parse_flag(raw(values, PROFILE_MENU)),
            known_themes: parse_theme_list(raw(values, KNOWN_THEMES)),
        }
    }

    /// The pair of themes the toggle moves between
    pub fn toggle_config(&self) -> ToggleConfig {
        ToggleConfig {
            default_theme: self.guest_theme,
            second_theme: self.second_theme,
        }
    }
}

fn raw<'a>(values: &'a HashMap<String, String>, variable: &str) -> &'a str {
    values.get(variable).map(String::as_str).unwrap_or("")
}

fn parse_theme(value: &str) -> Option<ThemeId> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .map(ThemeId)
        .filter(|id| !id.is_none())
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0"
}

fn parse_theme_list(value: &str) -> Vec<ThemeId> {
    value
        .split(',')
        .filter_map(|s| s.trim().parse::<i64>().ok())
        .map(ThemeId)
        .collect()
}

/// Read/write access to the settings table
#[derive(Clone)]
pub struct SettingsStore {
    pool: SqlitePool,
}

impl SettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a single raw value
    pub async fn get(&self, variable: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM settings WHERE variable = ?")
                .bind(variable)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(value,)| value))
    }

    /// Write several values in one transaction
    pub async fn update(&self, values: &[(&str, String)]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for (variable, value) in values {
            sqlx::query(
                "INSERT INTO settings (variable, value) VALUES (?, ?)
                 ON CONFLICT(variable) DO UPDATE SET value = excluded.value",
            )
            .bind(*variable)
            .bind(value.as_str())
            .execute(&mut *tx)
            .await?;
            debug!("Setting {} = {}", variable, value);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Load the current settings snapshot
    pub async fn load(&self) -> Result<ModSettings, sqlx::Error> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT variable, value FROM settings")
            .fetch_all(&self.pool)
            .await?;
        let values: HashMap<String, String> = rows.into_iter().collect();
        Ok(ModSettings::from_values(&values))
    }
}
