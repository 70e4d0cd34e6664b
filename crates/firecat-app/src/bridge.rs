//! Settings bridge between the home page script and the native side
//!
//! The home page calls these operations through the IPC channel. Settings go
//! to the preferences store; anything visual is pushed back into the home
//! tab as a single [`VisualState`] message.

use crate::state::lock;
use firecat_core::types::{Mode, DARK_MODE_COLOR, LIGHT_MODE_COLOR};
use firecat_core::{FirecatError, FirecatResult};
use firecat_shell::navigation::{resolve_input, search_url};
use firecat_shell::BrowserShell;
use firecat_store::{rgb_to_hex, PreferencesStore};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, error, info, warn};

/// Visual changes for the home page, applied by `window.firecat.applyVisualState`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_bar_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut_color: Option<String>,
    /// Ask the page to pick a readable text colour for its background
    pub recompute_contrast: bool,
}

impl VisualState {
    pub fn background(color: impl Into<String>) -> Self {
        Self {
            background_color: Some(color.into()),
            ..Self::default()
        }
    }

    /// Full colour set for light or dark mode; custom only toggles the class
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Light => Self {
                background_color: Some(LIGHT_MODE_COLOR.to_string()),
                text_color: Some("#000000".to_string()),
                mode_class: Some(mode.css_class()),
                search_bar_color: Some("#ffffff".to_string()),
                shortcut_color: Some("#f0f0f0".to_string()),
                recompute_contrast: false,
            },
            Mode::Dark => Self {
                background_color: Some(DARK_MODE_COLOR.to_string()),
                text_color: Some("#ffffff".to_string()),
                mode_class: Some(mode.css_class()),
                search_bar_color: Some("#3b3b3b".to_string()),
                shortcut_color: Some(DARK_MODE_COLOR.to_string()),
                recompute_contrast: false,
            },
            Mode::Custom => Self {
                mode_class: Some(mode.css_class()),
                recompute_contrast: true,
                ..Self::default()
            },
        }
    }

    /// What the page shows after a settings reset
    pub fn defaults() -> Self {
        Self {
            background_color: Some(LIGHT_MODE_COLOR.to_string()),
            text_color: Some("#000000".to_string()),
            mode_class: Some(Mode::Light.css_class()),
            ..Self::default()
        }
    }

    pub fn to_script(&self) -> FirecatResult<String> {
        let payload = serde_json::to_string(self)?;
        Ok(format!(
            "window.firecat && window.firecat.applyVisualState({});",
            payload
        ))
    }
}

pub struct SettingsBridge {
    shell: Weak<Mutex<BrowserShell>>,
    preferences: PreferencesStore,
    search_engine: String,
    current_background_color: String,
    current_mode: Mode,
}

impl SettingsBridge {
    pub fn new(shell: &Arc<Mutex<BrowserShell>>, mut preferences: PreferencesStore) -> Self {
        let search_engine = lock(shell).config().search_engine.clone();
        let record = preferences.load();
        Self {
            shell: Arc::downgrade(shell),
            preferences,
            search_engine,
            current_background_color: record.background_color,
            current_mode: record.mode,
        }
    }

    fn owner(&self) -> FirecatResult<Arc<Mutex<BrowserShell>>> {
        self.shell
            .upgrade()
            .ok_or_else(|| FirecatError::stale("browser shell has been dropped"))
    }

    pub fn current_background_color(&self) -> &str {
        &self.current_background_color
    }

    pub fn current_mode(&self) -> Mode {
        self.current_mode
    }

    pub fn preferences(&mut self) -> &mut PreferencesStore {
        &mut self.preferences
    }

    /// Send a visual update to the home tab.
    /// Returns false when the home tab is gone.
    fn push(&self, state: &VisualState) -> FirecatResult<bool> {
        let script = state.to_script()?;
        let shell = self.owner()?;
        let pushed = lock(&shell).run_script_in_home(&script);
        Ok(pushed)
    }

    /// Push without failing the caller; injection problems are only logged
    fn push_or_log(&self, state: &VisualState) {
        match self.push(state) {
            Ok(true) => {}
            Ok(false) => debug!("Home tab not resident, skipped visual update"),
            Err(e) => warn!("Could not update home tab: {}", e),
        }
    }

    /// Open a new tab unless the tab limit has been reached
    fn open_in_new_tab(&self, url: &str) -> FirecatResult<()> {
        let shell = self.owner()?;
        let mut shell = lock(&shell);
        if shell.tabs().at_capacity() {
            debug!("Tab limit reached, ignoring request for {}", url);
            return Ok(());
        }
        match shell.open_in_new_tab(url) {
            Ok(handle) => {
                info!("Opened {} in tab {}", url, handle.id);
                Ok(())
            }
            Err(e) if e.is_capacity() => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn open_link(&self, url: &str) -> FirecatResult<()> {
        match resolve_input(url, &self.search_engine) {
            Some(url) => self.open_in_new_tab(&url),
            None => Ok(()),
        }
    }

    pub fn search(&self, query: &str) -> FirecatResult<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        let url = search_url(&self.search_engine, query);
        self.open_in_new_tab(&url)
    }

    /// Apply a settings payload from the page as a patch.
    ///
    /// Payloads that are not a JSON object, or whose values have the wrong
    /// types, are rejected without changing anything.
    pub fn save_settings(&mut self, settings: &str) -> FirecatResult<()> {
        let patch = match serde_json::from_str::<Value>(settings) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                let err = FirecatError::malformed("settings must be a JSON object");
                error!("Error saving settings: {}", err);
                return Err(err);
            }
            Err(e) => {
                let err = FirecatError::malformed(e.to_string());
                error!("Error saving settings: {}", err);
                return Err(err);
            }
        };

        let record = self.preferences.update(&patch).map_err(|e| {
            error!("Error saving settings: {}", e);
            e
        })?;
        self.current_background_color = record.background_color;
        self.current_mode = record.mode;
        Ok(())
    }

    pub fn reset_settings(&mut self) -> FirecatResult<()> {
        self.preferences.reset();
        self.current_background_color = LIGHT_MODE_COLOR.to_string();
        self.current_mode = Mode::Light;

        self.push_or_log(&VisualState::defaults());
        info!("Settings reset to defaults");
        Ok(())
    }

    pub fn get_settings(&mut self) -> FirecatResult<Value> {
        let record = self.preferences.load();
        self.current_background_color = record.background_color.clone();
        self.current_mode = record.mode;
        Ok(serde_json::to_value(record)?)
    }

    pub fn change_background(&mut self, color: &str) -> FirecatResult<()> {
        // Mode follows the colour exactly as given, so "rgb(255, 255, 255)"
        // is custom even though it is stored as #ffffff
        let mode = Mode::from_color(color.trim());
        let color = rgb_to_hex(color.trim());
        self.current_background_color = color.clone();
        self.current_mode = mode;

        self.push_or_log(&VisualState::background(color.clone()));
        self.persist(json!({ "backgroundColor": color, "mode": mode }))
    }

    pub fn set_mode(&mut self, mode: &str) -> FirecatResult<()> {
        let mode: Mode = mode.parse()?;
        self.current_mode = mode;
        self.push_or_log(&VisualState::for_mode(mode));

        match mode.canonical_color() {
            Some(color) => {
                self.current_background_color = color.to_string();
                self.persist(json!({ "backgroundColor": color, "mode": mode }))
            }
            None => self.persist(json!({ "mode": mode })),
        }
    }

    /// Push the mirrored background colour to the home tab again
    pub fn apply_current_background(&self) -> FirecatResult<bool> {
        self.push(&VisualState::background(
            self.current_background_color.clone(),
        ))
    }

    /// Restore the saved background, then the saved mode
    pub fn apply_saved_preferences(&mut self) -> FirecatResult<()> {
        let record = self.preferences.load();
        self.change_background(&record.background_color)?;
        self.set_mode(record.mode.as_str())
    }

    /// Persist the mirrored colour and mode before the app exits
    pub fn save_before_exit(&mut self) -> FirecatResult<()> {
        let color = self.current_background_color.clone();
        let mode = self.current_mode;
        self.persist(json!({ "backgroundColor": color, "mode": mode }))
    }

    pub fn set_background_image(&mut self, source: &Path) -> FirecatResult<PathBuf> {
        self.preferences.set_background_image(source)
    }

    pub fn clear_background_image(&mut self) -> FirecatResult<()> {
        self.preferences.clear_background_image()?;
        Ok(())
    }

    fn persist(&mut self, patch: Value) -> FirecatResult<()> {
        let patch: Map<String, Value> = match patch {
            Value::Object(map) => map,
            _ => return Err(FirecatError::malformed("patch must be an object")),
        };
        self.preferences.update(&patch)?;
        Ok(())
    }
}
