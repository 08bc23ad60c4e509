//! Theme toggle decision logic
//!
//! The toggle flips a member between the guest (default) theme and the
//! admin-selected second theme. Deciding *whether* and *to what* is pure and
//! lives here; persisting the result and dropping stale cache entries is done
//! by [`ThemeToggleService`].
//!
//! The selection is deliberately asymmetric: only the exact second theme maps
//! back to the default theme. Every other theme, including one the member
//! picked through some other mechanism, converges to the second theme.

mod service;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;

pub use service::{ProfileCache, StoreError, ThemeStore, ThemeToggleService, ToggleError};

/// Member identifier
pub type UserId = i64;

/// Identifier of a theme known to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeId(pub i64);

impl ThemeId {
    /// Sentinel for "no theme selected"
    pub const NONE: ThemeId = ThemeId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two themes the toggle moves between
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleConfig {
    /// Guest theme, which doubles as the forum default
    pub default_theme: Option<ThemeId>,
    /// Admin-selected alternative
    pub second_theme: Option<ThemeId>,
}

impl ToggleConfig {
    pub fn new(default_theme: ThemeId, second_theme: ThemeId) -> Self {
        Self {
            default_theme: Some(default_theme),
            second_theme: Some(second_theme),
        }
    }
}

/// Pick the theme a member on `current` should switch to.
///
/// Returns `current` unchanged when either theme is unset or the sentinel.
pub fn toggle(current: ThemeId, config: &ToggleConfig) -> ThemeId {
    let configured = |theme: Option<ThemeId>| theme.filter(|t| !t.is_none());
    match (configured(config.default_theme), configured(config.second_theme)) {
        (Some(default), Some(second)) => {
            if current == second {
                default
            } else {
                second
            }
        }
        _ => current,
    }
}

/// Caller context for a single toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleRequest {
    pub user_id: UserId,
    pub is_guest: bool,
    pub current_theme: ThemeId,
    /// Forum-wide "members may choose their own theme" flag
    pub allow_theme_choice: bool,
}

/// Why a toggle did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Guest,
    ThemeChoiceDisabled,
    SecondThemeUnset,
    DefaultThemeUnset,
    SameThemes,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::Guest => "guest user",
            SkipReason::ThemeChoiceDisabled => "theme choice disabled",
            SkipReason::SecondThemeUnset => "second theme not configured",
            SkipReason::DefaultThemeUnset => "default theme not configured",
            SkipReason::SameThemes => "default and second theme are the same",
        };
        f.write_str(reason)
    }
}

/// A preference change to persist, plus the cache entries it makes stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeChange {
    pub user_id: UserId,
    pub from: ThemeId,
    pub to: ThemeId,
    /// Entries to drop once `to` has been written
    pub invalidate: [CacheKey; 2],
}

/// Outcome of planning a toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Change(ThemeChange),
}

/// Decide what a toggle request should do, without touching any storage.
pub fn plan(request: &ToggleRequest, config: &ToggleConfig) -> Decision {
    if request.is_guest {
        return Decision::Skip(SkipReason::Guest);
    }
    if !request.allow_theme_choice {
        return Decision::Skip(SkipReason::ThemeChoiceDisabled);
    }
    let Some(second) = config.second_theme.filter(|t| !t.is_none()) else {
        return Decision::Skip(SkipReason::SecondThemeUnset);
    };
    let Some(default) = config.default_theme.filter(|t| !t.is_none()) else {
        return Decision::Skip(SkipReason::DefaultThemeUnset);
    };
    if default == second {
        return Decision::Skip(SkipReason::SameThemes);
    }

    let user_id = request.user_id;
    Decision::Change(ThemeChange {
        user_id,
        from: request.current_theme,
        to: toggle(request.current_theme, config),
        invalidate: [
            CacheKey::UserSettings(user_id),
            CacheKey::MemberProfile(user_id),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ToggleConfig {
        ToggleConfig::new(ThemeId(1), ThemeId(2))
    }

    fn member(current: i64) -> ToggleRequest {
        ToggleRequest {
            user_id: 42,
            is_guest: false,
            current_theme: ThemeId(current),
            allow_theme_choice: true,
        }
    }

    #[test]
    fn test_default_goes_to_second() {
        assert_eq!(toggle(ThemeId(1), &config()), ThemeId(2));
    }

    #[test]
    fn test_second_goes_to_default() {
        assert_eq!(toggle(ThemeId(2), &config()), ThemeId(1));
    }

    #[test]
    fn test_unrelated_theme_converges_to_second() {
        // Deliberate: a third theme never maps back to itself or to default
        assert_eq!(toggle(ThemeId(5), &config()), ThemeId(2));
        assert_eq!(toggle(ThemeId::NONE, &config()), ThemeId(2));
    }

    #[test]
    fn test_double_toggle_returns_only_from_configured_themes() {
        let cfg = config();
        assert_eq!(toggle(toggle(ThemeId(1), &cfg), &cfg), ThemeId(1));
        assert_eq!(toggle(toggle(ThemeId(2), &cfg), &cfg), ThemeId(2));

        // Starting from a third theme lands on default after two flips
        assert_eq!(toggle(toggle(ThemeId(5), &cfg), &cfg), ThemeId(1));
    }

    #[test]
    fn test_equal_themes_is_noop() {
        let cfg = ToggleConfig::new(ThemeId(3), ThemeId(3));
        for current in [1, 3, 7] {
            assert_eq!(toggle(ThemeId(current), &cfg), ThemeId(3));
        }
        assert_eq!(
            plan(&member(3), &cfg),
            Decision::Skip(SkipReason::SameThemes)
        );
    }

    #[test]
    fn test_incomplete_config_keeps_current() {
        let cfg = ToggleConfig {
            default_theme: Some(ThemeId(1)),
            second_theme: None,
        };
        assert_eq!(toggle(ThemeId(4), &cfg), ThemeId(4));
    }

    #[test]
    fn test_sentinel_theme_keeps_current() {
        let cfg = ToggleConfig::new(ThemeId(1), ThemeId::NONE);
        assert_eq!(toggle(ThemeId(1), &cfg), ThemeId(1));

        let cfg = ToggleConfig::new(ThemeId::NONE, ThemeId(2));
        assert_eq!(toggle(ThemeId(2), &cfg), ThemeId(2));
    }

    #[test]
    fn test_plan_change_lists_both_cache_keys() {
        let decision = plan(&member(1), &config());
        assert_eq!(
            decision,
            Decision::Change(ThemeChange {
                user_id: 42,
                from: ThemeId(1),
                to: ThemeId(2),
                invalidate: [CacheKey::UserSettings(42), CacheKey::MemberProfile(42)],
            })
        );
    }

    #[test]
    fn test_plan_guards() {
        let mut guest = member(1);
        guest.is_guest = true;
        assert_eq!(plan(&guest, &config()), Decision::Skip(SkipReason::Guest));

        let mut locked = member(1);
        locked.allow_theme_choice = false;
        assert_eq!(
            plan(&locked, &config()),
            Decision::Skip(SkipReason::ThemeChoiceDisabled)
        );

        let no_second = ToggleConfig {
            default_theme: Some(ThemeId(1)),
            second_theme: None,
        };
        assert_eq!(
            plan(&member(1), &no_second),
            Decision::Skip(SkipReason::SecondThemeUnset)
        );

        let no_default = ToggleConfig {
            default_theme: None,
            second_theme: Some(ThemeId(2)),
        };
        assert_eq!(
            plan(&member(1), &no_default),
            Decision::Skip(SkipReason::DefaultThemeUnset)
        );
    }

    #[test]
    fn test_plan_treats_sentinel_as_unset() {
        let cfg = ToggleConfig::new(ThemeId(1), ThemeId::NONE);
        assert_eq!(
            plan(&member(1), &cfg),
            Decision::Skip(SkipReason::SecondThemeUnset)
        );
    }
}
