//! Menu topology and the navigation stack.
//!
//! The menu tree is fixed:
//!
//! ```text
//! Main ─┬─ Melodies  (Mario, Twinkle, Jingle, Back)
//!       └─ Settings ─┬─ (Reset Vol)
//!                    ├─ Backlight (ON, OFF, Back)
//!                    └─ (Back)
//! ```
//!
//! [`MENUS`] holds the titles and labels; [`MenuId::action`] maps a
//! `(menu, item)` pair to a [`MenuAction`]. [`Navigator`] owns the stack of
//! visited menus and the selected item.

use heapless::Vec;

/// Deepest possible stack: Main → Settings → Backlight, plus headroom.
pub const MENU_DEPTH: usize = 4;

/// One of the four menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MenuId {
    Main = 0,
    Melodies = 1,
    Settings = 2,
    Backlight = 3,
}

/// Static description of a menu.
#[derive(Debug)]
pub struct MenuSpec {
    /// First display line.
    pub title: &'static str,
    /// Item labels in selection order.
    pub items: &'static [&'static str],
    /// Menu that "Back" returns to (`None` for the root).
    pub parent: Option<MenuId>,
}

/// Menu table indexed by `MenuId as usize`.
pub static MENUS: [MenuSpec; 4] = [
    MenuSpec {
        title: "Main Menu",
        items: &["1.Select Melody", "2.Settings"],
        parent: None,
    },
    MenuSpec {
        title: "Select Melody",
        items: &["1.1 Mario", "1.2 Twinkle", "1.3 Jingle", "1.4 Back"],
        parent: Some(MenuId::Main),
    },
    MenuSpec {
        title: "Settings",
        items: &["2.1 Reset Vol", "2.2 Backlight", "2.3 Back"],
        parent: Some(MenuId::Main),
    },
    MenuSpec {
        title: "Backlight",
        items: &["2.2.1 ON", "2.2.2 OFF", "2.2.3 Back"],
        parent: Some(MenuId::Settings),
    },
];

/// What activating a menu item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    /// Descend into a submenu.
    Open(MenuId),
    /// Return to the parent menu.
    Back,
    /// Start the melody with this catalog index.
    Play(usize),
    /// Restore the default volume and persist it.
    ResetVolume,
    /// Switch the display backlight.
    Backlight(bool),
}

/// Cursor movement within a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
}

impl MenuId {
    /// Decode a published menu id. Unknown values map to [`MenuId::Main`].
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => MenuId::Melodies,
            2 => MenuId::Settings,
            3 => MenuId::Backlight,
            _ => MenuId::Main,
        }
    }

    /// Static description of this menu.
    pub fn definition(self) -> &'static MenuSpec {
        &MENUS[self as usize]
    }

    /// Highest selectable item index.
    pub fn max_index(self) -> u8 {
        (self.definition().items.len() - 1) as u8
    }

    /// Label of `item`, or `""` past the end.
    pub fn label(self, item: u8) -> &'static str {
        self.definition().items.get(usize::from(item)).copied().unwrap_or("")
    }

    /// Action bound to `item` in this menu.
    pub fn action(self, item: u8) -> Option<MenuAction> {
        let action = match (self, item) {
            (MenuId::Main, 0) => MenuAction::Open(MenuId::Melodies),
            (MenuId::Main, 1) => MenuAction::Open(MenuId::Settings),
            (MenuId::Melodies, 0..=2) => MenuAction::Play(usize::from(item)),
            (MenuId::Melodies, 3) => MenuAction::Back,
            (MenuId::Settings, 0) => MenuAction::ResetVolume,
            (MenuId::Settings, 1) => MenuAction::Open(MenuId::Backlight),
            (MenuId::Settings, 2) => MenuAction::Back,
            (MenuId::Backlight, 0) => MenuAction::Backlight(true),
            (MenuId::Backlight, 1) => MenuAction::Backlight(false),
            (MenuId::Backlight, 2) => MenuAction::Back,
            _ => return None,
        };
        Some(action)
    }
}

/// Stack of visited menus plus the selected item of the top menu.
///
/// The root ([`MenuId::Main`]) is never popped, and the selection is
/// always within `[0, max_index(current)]`.
pub struct Navigator {
    stack: Vec<MenuId, MENU_DEPTH>,
    selected: u8,
}

impl Navigator {
    /// Start at the root menu with the first item selected.
    pub fn new() -> Self {
        let mut stack = Vec::new();
        // Cannot fail: the stack is empty and MENU_DEPTH > 0.
        stack.push(MenuId::Main).ok();
        Self { stack, selected: 0 }
    }

    /// Menu on top of the stack.
    pub fn current(&self) -> MenuId {
        self.stack.last().copied().unwrap_or(MenuId::Main)
    }

    /// Selected item of the current menu.
    pub fn selected(&self) -> u8 {
        self.selected
    }

    /// Number of menus on the stack (root included).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Move the selection by one, clamped to the current menu's items.
    ///
    /// Returns `true` if the selection changed.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let before = self.selected;
        self.selected = match direction {
            Direction::Up => self.selected.saturating_sub(1),
            Direction::Down => (self.selected + 1).min(self.current().max_index()),
        };
        before != self.selected
    }

    /// Enter `menu` and select its first item. A push on a full stack is
    /// ignored.
    pub fn push(&mut self, menu: MenuId) {
        if self.stack.push(menu).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("menu stack full, ignoring push of {}", menu);
        }
        self.selected = 0;
    }

    /// Leave the current menu and select the first item of the parent.
    /// At the root only the selection is reset.
    pub fn back(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self.selected = 0;
    }

    /// Resolve the selected item and apply its navigation effect.
    ///
    /// `Open` pushes, `Back` pops; every other action is returned for the
    /// caller to carry out and leaves the stack untouched.
    pub fn activate(&mut self) -> Option<MenuAction> {
        let action = self.current().action(self.selected)?;
        match action {
            MenuAction::Open(menu) => self.push(menu),
            MenuAction::Back => self.back(),
            MenuAction::Play(_) | MenuAction::ResetVolume | MenuAction::Backlight(_) => {}
        }
        Some(action)
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_main() {
        let nav = Navigator::new();
        assert_eq!(nav.current(), MenuId::Main);
        assert_eq!(nav.selected(), 0);
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn max_index_matches_item_count() {
        assert_eq!(MenuId::Main.max_index(), 1);
        assert_eq!(MenuId::Melodies.max_index(), 3);
        assert_eq!(MenuId::Settings.max_index(), 2);
        assert_eq!(MenuId::Backlight.max_index(), 2);
    }

    #[test]
    fn navigate_clamps_at_both_ends() {
        let mut nav = Navigator::new();
        assert!(!nav.navigate(Direction::Up));
        assert_eq!(nav.selected(), 0);

        assert!(nav.navigate(Direction::Down));
        assert!(!nav.navigate(Direction::Down));
        assert_eq!(nav.selected(), 1);
    }

    #[test]
    fn back_at_root_is_idempotent() {
        let mut nav = Navigator::new();
        nav.navigate(Direction::Down);
        nav.back();
        nav.back();
        assert_eq!(nav.current(), MenuId::Main);
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.selected(), 0);
    }

    #[test]
    fn push_and_pop_sequences_never_empty_the_stack() {
        let mut nav = Navigator::new();
        let script = [true, true, false, false, false, true, false, true, true, true, true, false];
        for push in script {
            if push {
                nav.push(MenuId::Settings);
            } else {
                nav.back();
            }
            assert!(nav.depth() >= 1);
            assert!(nav.depth() <= MENU_DEPTH);
            assert_eq!(nav.selected(), 0);
        }
    }

    #[test]
    fn selection_stays_within_the_current_menu() {
        let mut nav = Navigator::new();
        nav.activate(); // Main/0 → Melodies
        for _ in 0..10 {
            nav.navigate(Direction::Down);
        }
        assert_eq!(nav.selected(), MenuId::Melodies.max_index());
    }

    #[test]
    fn main_items_open_submenus() {
        let mut nav = Navigator::new();
        assert_eq!(nav.activate(), Some(MenuAction::Open(MenuId::Melodies)));
        assert_eq!(nav.current(), MenuId::Melodies);

        let mut nav = Navigator::new();
        nav.navigate(Direction::Down);
        assert_eq!(nav.activate(), Some(MenuAction::Open(MenuId::Settings)));
        assert_eq!(nav.current(), MenuId::Settings);
        assert_eq!(nav.selected(), 0);
    }

    #[test]
    fn melodies_back_returns_to_main() {
        let mut nav = Navigator::new();
        nav.activate();
        for _ in 0..3 {
            nav.navigate(Direction::Down);
        }
        assert_eq!(nav.activate(), Some(MenuAction::Back));
        assert_eq!(nav.current(), MenuId::Main);
        assert_eq!(nav.selected(), 0);
    }

    #[test]
    fn play_leaves_the_stack_alone() {
        let mut nav = Navigator::new();
        nav.activate();
        nav.navigate(Direction::Down);
        assert_eq!(nav.activate(), Some(MenuAction::Play(1)));
        assert_eq!(nav.current(), MenuId::Melodies);
        assert_eq!(nav.selected(), 1);
    }

    #[test]
    fn backlight_menu_actions() {
        assert_eq!(MenuId::Backlight.action(0), Some(MenuAction::Backlight(true)));
        assert_eq!(MenuId::Backlight.action(1), Some(MenuAction::Backlight(false)));
        assert_eq!(MenuId::Backlight.action(2), Some(MenuAction::Back));
        assert_eq!(MenuId::Backlight.action(3), None);
    }

    #[test]
    fn every_selectable_item_has_an_action() {
        for menu in [MenuId::Main, MenuId::Melodies, MenuId::Settings, MenuId::Backlight] {
            for item in 0..=menu.max_index() {
                assert!(menu.action(item).is_some());
                assert!(!menu.label(item).is_empty());
            }
        }
    }

    #[test]
    fn parents_match_back_targets() {
        let mut nav = Navigator::new();
        nav.navigate(Direction::Down);
        nav.activate(); // Settings
        nav.navigate(Direction::Down);
        nav.activate(); // Backlight
        assert_eq!(nav.current(), MenuId::Backlight);
        assert_eq!(MenuId::Backlight.definition().parent, Some(MenuId::Settings));

        nav.navigate(Direction::Down);
        nav.navigate(Direction::Down);
        nav.activate(); // Back
        assert_eq!(nav.current(), MenuId::Settings);
    }

    #[test]
    fn from_u8_round_trips_known_ids() {
        for menu in [MenuId::Main, MenuId::Melodies, MenuId::Settings, MenuId::Backlight] {
            assert_eq!(MenuId::from_u8(menu as u8), menu);
        }
        assert_eq!(MenuId::from_u8(42), MenuId::Main);
    }
}
