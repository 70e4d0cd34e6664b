//! Browser configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FirecatError, FirecatResult};
use crate::types::{BLANK_URL, MAX_HISTORY_ITEMS, MAX_TABS, TITLE_MAX_CHARS};

/// Browser configuration
///
/// Every field has a default, so a config file only needs to name the
/// values it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Directory holding preferences, history and background images
    pub data_dir: PathBuf,

    /// Preferences file name, relative to `data_dir`
    pub preferences_file: String,

    /// History file name, relative to `data_dir`
    pub history_file: String,

    /// Background image folder name, relative to `data_dir`
    pub image_folder: String,

    /// Maximum number of open tabs, home tab included
    pub max_tabs: usize,

    /// Maximum number of history entries
    pub max_history_items: usize,

    /// Delay between the last history mutation and its write to disk
    pub history_flush_delay_ms: u64,

    /// Search URL prefix; the encoded query is appended
    pub search_engine: String,

    /// Page opened by the "new tab" button
    pub new_tab_url: String,

    /// Location of the generated home page
    pub home_url: String,

    /// Idle location reported by engines with nothing loaded
    pub blank_url: String,

    /// Characters of a title shown on a tab before it is elided
    pub title_max_chars: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            preferences_file: "user_preferences.json".to_string(),
            history_file: "browser_history.json".to_string(),
            image_folder: "background_images".to_string(),
            max_tabs: MAX_TABS,
            max_history_items: MAX_HISTORY_ITEMS,
            history_flush_delay_ms: 1000,
            search_engine: "https://www.google.com/search?q=".to_string(),
            new_tab_url: "https://www.google.com".to_string(),
            home_url: "firecat://home".to_string(),
            blank_url: BLANK_URL.to_string(),
            title_max_chars: TITLE_MAX_CHARS,
        }
    }
}

impl BrowserConfig {
    /// Default configuration rooted at the given data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> FirecatResult<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            FirecatError::config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the shell cannot operate with
    pub fn validate(&self) -> FirecatResult<()> {
        if self.max_tabs == 0 {
            return Err(FirecatError::config("max_tabs must be at least 1"));
        }
        if self.max_history_items == 0 {
            return Err(FirecatError::config("max_history_items must be at least 1"));
        }
        if self.search_engine.trim().is_empty() {
            return Err(FirecatError::config("search_engine must not be empty"));
        }
        Ok(())
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(&self.preferences_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.join(&self.image_folder)
    }

    pub fn history_flush_delay(&self) -> Duration {
        Duration::from_millis(self.history_flush_delay_ms)
    }
}

/// Get data directory, with fallback
fn default_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("firecat");
    }

    PathBuf::from(".firecat")
}
