//! Admin selection of the second theme
//!
//! Candidates are the known themes other than the guest theme and the
//! "no theme" sentinel. The first time the form is opened with nothing
//! selected, the lowest candidate is picked so the toggle works out of the box.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::settings::{ModSettings, SettingsStore, PROFILE_MENU, SECOND_THEME};
use crate::theme::{Theme, ThemeCatalog};
use crate::toggle::ThemeId;

/// Admin errors
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("theme {0} cannot be selected as the second theme")]
    NotACandidate(ThemeId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Themes eligible as second theme, ascending and without duplicates
pub fn candidate_ids(known: &[ThemeId], guest_theme: Option<ThemeId>) -> Vec<ThemeId> {
    let mut ids: Vec<ThemeId> = known
        .iter()
        .copied()
        .filter(|id| !id.is_none() && Some(*id) != guest_theme)
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Current state of the selection form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondThemeForm {
    pub candidates: Vec<Theme>,
    pub selected: Option<ThemeId>,
    pub profile_menu: bool,
}

/// Submitted selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SecondThemeUpdate {
    pub second_theme: ThemeId,
    #[serde(default)]
    pub profile_menu: bool,
}

/// Maintains the second theme and menu placement settings
#[derive(Clone)]
pub struct AdminService {
    settings: SettingsStore,
    themes: ThemeCatalog,
}

impl AdminService {
    pub fn new(settings: SettingsStore, themes: ThemeCatalog) -> Self {
        Self { settings, themes }
    }

    async fn candidates(&self, settings: &ModSettings) -> Result<Vec<Theme>, sqlx::Error> {
        let ids = candidate_ids(&settings.known_themes, settings.guest_theme);
        self.themes.find_many(&ids).await
    }

    /// Load the form, picking an initial second theme if none is set yet
    pub async fn second_theme_form(&self) -> Result<SecondThemeForm, AdminError> {
        let settings = self.settings.load().await?;
        let mut selected = settings.second_theme;

        if selected.is_none() {
            let ids = candidate_ids(&settings.known_themes, settings.guest_theme);
            if let Some(&first) = ids.first() {
                self.settings
                    .update(&[(SECOND_THEME, first.to_string())])
                    .await?;
                info!("Second theme initialised to {}", first);
                selected = Some(first);
            }
        }

        Ok(SecondThemeForm {
            candidates: self.candidates(&settings).await?,
            selected,
            profile_menu: settings.profile_menu,
        })
    }

    /// Save a new selection; it must be an installed candidate theme
    pub async fn save(&self, update: SecondThemeUpdate) -> Result<ModSettings, AdminError> {
        let settings = self.settings.load().await?;
        let candidates = self.candidates(&settings).await?;

        if !candidates.iter().any(|t| t.id == update.second_theme) {
            return Err(AdminError::NotACandidate(update.second_theme));
        }

        let profile_menu = if update.profile_menu { "1" } else { "0" };
        self.settings
            .update(&[
                (SECOND_THEME, update.second_theme.to_string()),
                (PROFILE_MENU, profile_menu.to_string()),
            ])
            .await?;
        info!(
            "Second theme set to {} (profile menu: {})",
            update.second_theme, update.profile_menu
        );

        Ok(self.settings.load().await?)
    }
}
