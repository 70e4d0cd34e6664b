//! Common types used throughout Firecat

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FirecatError;

/// Maximum number of simultaneously open tabs (home tab included)
pub const MAX_TABS: usize = 10;

/// Maximum number of entries kept in the browsing history
pub const MAX_HISTORY_ITEMS: usize = 1000;

/// Number of characters of a page title shown on a tab
pub const TITLE_MAX_CHARS: usize = 15;

/// Location an idle or freshly created engine view reports
pub const BLANK_URL: &str = "about:blank";

/// Canonical background colour of the light theme
pub const LIGHT_MODE_COLOR: &str = "#ffffff";

/// Canonical background colour of the dark theme
pub const DARK_MODE_COLOR: &str = "#2e2e2e";

/// Unique identifier for a tab
///
/// Identifiers are never reused, so an engine callback carrying the id of a
/// closed tab can always be told apart from one for a live tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl TabId {
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Home page colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Light,
    Dark,
    Custom,
}

impl Mode {
    /// Derive the mode a background colour implies.
    ///
    /// Comparison is case-insensitive against the canonical light and dark
    /// colours; every other value is `Custom`.
    pub fn from_color(color: &str) -> Self {
        if color.eq_ignore_ascii_case(LIGHT_MODE_COLOR) {
            Mode::Light
        } else if color.eq_ignore_ascii_case(DARK_MODE_COLOR) {
            Mode::Dark
        } else {
            Mode::Custom
        }
    }

    /// Canonical background colour, if the mode has one
    pub fn canonical_color(self) -> Option<&'static str> {
        match self {
            Mode::Light => Some(LIGHT_MODE_COLOR),
            Mode::Dark => Some(DARK_MODE_COLOR),
            Mode::Custom => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Light => "light",
            Mode::Dark => "dark",
            Mode::Custom => "custom",
        }
    }

    /// CSS class the home page toggles for this mode
    pub fn css_class(self) -> String {
        format!("{}-mode", self.as_str())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = FirecatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Mode::Light),
            "dark" => Ok(Mode::Dark),
            "custom" => Ok(Mode::Custom),
            other => Err(FirecatError::malformed(format!("unknown mode '{}'", other))),
        }
    }
}
