//! Menu button placement for the theme toggle
//!
//! The toggle appears either at the end of the main menu or in the profile
//! popup, second to last so that "Log out" stays at the bottom. It is hidden
//! whenever a toggle would be a no-op for the viewer.

use serde::Serialize;

use crate::settings::ModSettings;

/// Popup area whose requests never carry menus
pub const ALERTS_POPUP_AREA: &str = "alerts_popup";

/// Short label on the toggle button
const TOGGLE_TITLE: &str = "Theme";

/// A clickable menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuButton {
    pub id: String,
    pub title: String,
    /// Full-page target, used when scripting is unavailable
    pub href: String,
    /// Endpoint a script calls instead of following `href`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub async_href: Option<String>,
    pub icon: String,
}

impl MenuButton {
    fn link(id: &str, title: &str, href: String, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            href,
            async_href: None,
            icon: icon.to_string(),
        }
    }
}

/// Where the toggle button goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    MainMenu,
    ProfilePopup,
}

/// The viewer and the page being rendered
#[derive(Debug, Clone, Copy)]
pub struct MenuContext<'a> {
    pub is_guest: bool,
    pub area: Option<&'a str>,
}

/// Rendered menus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menus {
    pub main: Vec<MenuButton>,
    pub profile_popup: Vec<MenuButton>,
}

/// Join a path onto the board URL
pub fn board_link(board_url: &str, path: &str) -> String {
    format!("{}/{}", board_url.trim_end_matches('/'), path)
}

/// Decide whether, and where, the toggle button is shown
pub fn toggle_placement(settings: &ModSettings, ctx: &MenuContext<'_>) -> Option<Placement> {
    if ctx.area == Some(ALERTS_POPUP_AREA) {
        return None;
    }
    let second = settings.second_theme?;
    if ctx.is_guest {
        return None;
    }
    if settings.guest_theme == Some(second) {
        return None;
    }
    if !settings.allow_theme_choice {
        return None;
    }

    Some(if settings.profile_menu {
        Placement::ProfilePopup
    } else {
        Placement::MainMenu
    })
}

/// The toggle button for a given placement
pub fn toggle_button(placement: Placement, board_url: &str) -> MenuButton {
    let href = board_link(board_url, "themetog");
    match placement {
        Placement::MainMenu => MenuButton {
            async_href: Some(board_link(board_url, "xmlhttp/themetog")),
            ..MenuButton::link("themetog", TOGGLE_TITLE, href, "tt_sun_moon.png")
        },
        Placement::ProfilePopup => MenuButton::link("themetog", TOGGLE_TITLE, href, "switch"),
    }
}

/// Build the viewer's menus, with the toggle placed where settings ask
pub fn build_menus(settings: &ModSettings, ctx: &MenuContext<'_>, board_url: &str) -> Menus {
    let mut main = vec![MenuButton::link("home", "Home", board_url.to_string(), "home")];
    let mut profile_popup = Vec::new();

    if !ctx.is_guest {
        main.push(MenuButton::link(
            "profile",
            "Profile",
            board_link(board_url, "me"),
            "profile",
        ));
        profile_popup.push(MenuButton::link(
            "summary",
            "Summary",
            board_link(board_url, "me"),
            "members",
        ));
        profile_popup.push(MenuButton::link(
            "logout",
            "Log out",
            board_link(board_url, "auth/logout"),
            "logout",
        ));
    }

    match toggle_placement(settings, ctx) {
        Some(Placement::MainMenu) => main.push(toggle_button(Placement::MainMenu, board_url)),
        Some(Placement::ProfilePopup) => {
            let at = profile_popup.len().saturating_sub(1);
            profile_popup.insert(at, toggle_button(Placement::ProfilePopup, board_url));
        }
        None => {}
    }

    Menus {
        main,
        profile_popup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toggle::ThemeId;

    fn settings() -> ModSettings {
        ModSettings {
            guest_theme: Some(ThemeId(1)),
            second_theme: Some(ThemeId(2)),
            allow_theme_choice: true,
            profile_menu: false,
            known_themes: vec![ThemeId(1), ThemeId(2)],
        }
    }

    fn member() -> MenuContext<'static> {
        MenuContext {
            is_guest: false,
            area: None,
        }
    }

    #[test]
    fn test_board_link() {
        assert_eq!(board_link("/", "themetog"), "/themetog");
        assert_eq!(
            board_link("https://forum.example/", "themetog"),
            "https://forum.example/themetog"
        );
        assert_eq!(
            board_link("https://forum.example/board", "themetog"),
            "https://forum.example/board/themetog"
        );
    }

    #[test]
    fn test_placement_main_menu_by_default() {
        assert_eq!(
            toggle_placement(&settings(), &member()),
            Some(Placement::MainMenu)
        );

        let mut popup = settings();
        popup.profile_menu = true;
        assert_eq!(
            toggle_placement(&popup, &member()),
            Some(Placement::ProfilePopup)
        );
    }

    #[test]
    fn test_placement_hidden_cases() {
        let guest = MenuContext {
            is_guest: true,
            area: None,
        };
        assert_eq!(toggle_placement(&settings(), &guest), None);

        let alerts = MenuContext {
            is_guest: false,
            area: Some(ALERTS_POPUP_AREA),
        };
        assert_eq!(toggle_placement(&settings(), &alerts), None);

        let mut unset = settings();
        unset.second_theme = None;
        assert_eq!(toggle_placement(&unset, &member()), None);

        let mut same = settings();
        same.second_theme = Some(ThemeId(1));
        assert_eq!(toggle_placement(&same, &member()), None);

        let mut locked = settings();
        locked.allow_theme_choice = false;
        assert_eq!(toggle_placement(&locked, &member()), None);
    }

    #[test]
    fn test_main_menu_button_offers_async_endpoint() {
        let menus = build_menus(&settings(), &member(), "/");

        let button = menus.main.last().unwrap();
        assert_eq!(button.id, "themetog");
        assert_eq!(button.href, "/themetog");
        assert_eq!(button.async_href.as_deref(), Some("/xmlhttp/themetog"));
        assert!(menus.profile_popup.iter().all(|b| b.id != "themetog"));
    }

    #[test]
    fn test_popup_button_is_second_to_last() {
        let mut popup = settings();
        popup.profile_menu = true;

        let menus = build_menus(&popup, &member(), "/");

        let ids: Vec<_> = menus.profile_popup.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["summary", "themetog", "logout"]);
        assert!(menus.main.iter().all(|b| b.id != "themetog"));
        assert_eq!(menus.profile_popup[1].async_href, None);
    }

    #[test]
    fn test_guest_menus() {
        let guest = MenuContext {
            is_guest: true,
            area: None,
        };
        let menus = build_menus(&settings(), &guest, "/");

        assert_eq!(menus.main.len(), 1);
        assert!(menus.profile_popup.is_empty());
    }
}
