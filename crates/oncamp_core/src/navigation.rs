//! Main tab-bar selection state.
//!
//! # Responsibility
//! - Own the selected tab of the main screen as one finite-state value.
//! - Apply discrete navigation events; view code only reads the result.
//!
//! # Invariants
//! - Exactly one tab is selected at any time; the initial tab is `Profile`.
//! - Rejected events leave the selection unchanged.
//! - Selection events are rejected until the signed-in user is loaded.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Tabs of the main screen, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Feed,
    Social,
    Marketplace,
    CreatePost,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Feed,
        Tab::Social,
        Tab::Marketplace,
        Tab::CreatePost,
        Tab::Profile,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Feed => 0,
            Self::Social => 1,
            Self::Marketplace => 2,
            Self::CreatePost => 3,
            Self::Profile => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Outline icon shown while the tab is not selected.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Feed => "house",
            Self::Social => "person.3",
            Self::Marketplace => "bag",
            Self::CreatePost => "plus.bubble",
            Self::Profile => "person.circle",
        }
    }

    /// Filled icon shown while the tab is selected.
    pub fn selected_icon(self) -> &'static str {
        match self {
            Self::Feed => "house.fill",
            Self::Social => "person.3.fill",
            Self::Marketplace => "bag.fill",
            Self::CreatePost => "plus.bubble.fill",
            Self::Profile => "person.circle.fill",
        }
    }
}

/// Discrete input to the tab controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    /// User tapped a tab item.
    Select(Tab),
    /// Host asked for a tab by position (deep links, FFI).
    SelectIndex(usize),
    /// A tab's content became visible.
    Appeared(Tab),
    /// The signed-in user finished loading; tabs become usable.
    UserLoaded,
    /// The user signed out; tabs are hidden again.
    UserCleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    IndexOutOfRange(usize),
    /// Selection attempted before any user was loaded.
    UserNotLoaded,
}

impl Display for NavigationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange(index) => write!(
                f,
                "tab index {index} out of range; expected 0..{}",
                Tab::ALL.len()
            ),
            Self::UserNotLoaded => write!(f, "tabs are unavailable until a user is loaded"),
        }
    }
}

impl Error for NavigationError {}

/// Single owner of the main screen's tab selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabController {
    selected: Tab,
    user_present: bool,
}

impl Default for TabController {
    fn default() -> Self {
        Self::with_selected(Tab::Profile)
    }
}

impl TabController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a controller whose selection was persisted by the host.
    ///
    /// The user still has to be reported through [`NavigationEvent::UserLoaded`].
    pub fn with_selected(selected: Tab) -> Self {
        Self {
            selected,
            user_present: false,
        }
    }

    pub fn selected(&self) -> Tab {
        self.selected
    }

    /// Tabs are only shown once the signed-in user has been loaded.
    pub fn is_available(&self) -> bool {
        self.user_present
    }

    /// Icon to render for `tab` under the current selection.
    pub fn icon_for(&self, tab: Tab) -> &'static str {
        if tab == self.selected {
            tab.selected_icon()
        } else {
            tab.icon()
        }
    }

    /// Applies one event. Returns whether the selection changed.
    pub fn handle(&mut self, event: NavigationEvent) -> Result<bool, NavigationError> {
        let target = match event {
            NavigationEvent::UserLoaded | NavigationEvent::UserCleared => {
                self.user_present = event == NavigationEvent::UserLoaded;
                debug!(
                    "event=tab_user module=nav user_present={}",
                    self.user_present
                );
                return Ok(false);
            }
            _ if !self.user_present => return Err(NavigationError::UserNotLoaded),
            NavigationEvent::Select(tab) | NavigationEvent::Appeared(tab) => tab,
            NavigationEvent::SelectIndex(index) => {
                Tab::from_index(index).ok_or(NavigationError::IndexOutOfRange(index))?
            }
        };

        if target == self.selected {
            return Ok(false);
        }
        debug!(
            "event=tab_select module=nav from={} to={}",
            self.selected.index(),
            target.index()
        );
        self.selected = target;
        Ok(true)
    }
}
