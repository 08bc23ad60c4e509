//! Cached member reads
//!
//! Both views embed the member's theme, which is why a theme toggle drops
//! their cache entries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::accounts::{AccountService, AuthError};
use crate::cache::{CacheKey, SettingsCache};
use crate::theme::ThemeCatalog;
use crate::toggle::{ThemeId, UserId};

/// What the forum needs about the current member on every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub id: UserId,
    pub username: String,
    pub theme: ThemeId,
    pub is_admin: bool,
}

/// A member as shown on their profile page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: UserId,
    pub username: String,
    pub theme: ThemeId,
    /// Name of `theme`, absent for the sentinel or an uninstalled theme
    pub theme_name: Option<String>,
    pub member_since: String,
}

/// Read-through access to member views
#[derive(Clone)]
pub struct ProfileReader {
    accounts: AccountService,
    themes: ThemeCatalog,
    cache: Arc<SettingsCache>,
}

impl ProfileReader {
    pub fn new(accounts: AccountService, themes: ThemeCatalog, cache: Arc<SettingsCache>) -> Self {
        Self {
            accounts,
            themes,
            cache,
        }
    }

    /// Load a member's settings, from cache when possible
    pub async fn user_settings(&self, id: UserId) -> Result<Option<UserSettings>, AuthError> {
        let key = CacheKey::UserSettings(id);
        if let Some(settings) = self.cache.get(&key) {
            return Ok(Some(settings));
        }

        let Some(member) = self.accounts.get_member(id).await? else {
            return Ok(None);
        };
        let settings = UserSettings {
            id: member.id,
            username: member.username,
            theme: member.theme,
            is_admin: member.is_admin,
        };
        self.cache.put(&key, &settings);
        Ok(Some(settings))
    }

    /// Load a member's public profile, from cache when possible
    pub async fn member_profile(&self, id: UserId) -> Result<Option<MemberProfile>, AuthError> {
        let key = CacheKey::MemberProfile(id);
        if let Some(profile) = self.cache.get(&key) {
            return Ok(Some(profile));
        }

        let Some(member) = self.accounts.get_member(id).await? else {
            return Ok(None);
        };
        let theme_name = self.themes.get(member.theme).await?.map(|t| t.name);
        let profile = MemberProfile {
            id: member.id,
            username: member.username,
            theme: member.theme,
            theme_name,
            member_since: member.created_at,
        };
        self.cache.put(&key, &profile);
        Ok(Some(profile))
    }

    /// Grant or revoke administration and drop the cached user settings,
    /// which carry the flag
    pub async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<(), AuthError> {
        self.accounts.set_admin(id, is_admin).await?;
        self.cache.remove(&CacheKey::UserSettings(id));
        Ok(())
    }
}
