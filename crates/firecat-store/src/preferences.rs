//! User preferences persisted as a flat JSON record.
//!
//! The store keeps one cached copy of the record. The cache is filled by
//! [`PreferencesStore::load`], replaced by [`PreferencesStore::save`] and
//! dropped by [`PreferencesStore::reset`]; callers only ever receive clones.

use firecat_core::types::{Mode, LIGHT_MODE_COLOR};
use firecat_core::{FirecatError, FirecatResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::rgb_to_hex;

/// The persisted settings record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Legacy theme name, kept for the home page
    pub theme: String,
    /// Canonical lowercase `#rrggbb`
    pub background_color: String,
    /// Path of the managed copy of the background image
    pub background_image: Option<String>,
    /// Whether shortcut tiles are shown
    pub shortcuts: bool,
    pub mode: Mode,
    /// Keys the home page stores that the shell does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            background_color: LIGHT_MODE_COLOR.to_string(),
            background_image: None,
            shortcuts: true,
            mode: Mode::Light,
            extra: Map::new(),
        }
    }
}

impl Preferences {
    /// Look up a single field by its JSON key
    pub fn get(&self, key: &str) -> Option<Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.get(key).cloned(),
            _ => None,
        }
    }

    /// Build a record from a partial JSON object laid over the defaults.
    ///
    /// Keys absent from `partial` take their default value. An explicit
    /// `"mode": "custom"` survives normalisation; any other mode is derived
    /// from the background colour.
    pub fn from_partial(partial: &Map<String, Value>) -> FirecatResult<Self> {
        let mut merged = Self::default().to_map()?;
        for (key, value) in partial {
            merged.insert(key.clone(), value.clone());
        }

        let explicit_mode = partial
            .get("mode")
            .and_then(Value::as_str)
            .and_then(|mode| mode.parse::<Mode>().ok());

        // Mode is recomputed below, so an unknown value must not fail the parse.
        merged.insert("mode".to_string(), Value::String(Mode::Light.to_string()));

        let mut prefs: Self = serde_json::from_value(Value::Object(merged))
            .map_err(|e| FirecatError::malformed(format!("invalid preferences: {}", e)))?;
        prefs.normalize(explicit_mode);
        Ok(prefs)
    }

    fn normalize(&mut self, explicit_mode: Option<Mode>) {
        self.background_color = rgb_to_hex(&self.background_color);
        self.mode = match explicit_mode {
            Some(Mode::Custom) => Mode::Custom,
            _ => Mode::from_color(&self.background_color),
        };
    }

    fn to_map(&self) -> FirecatResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(FirecatError::malformed("preferences did not serialize to an object")),
        }
    }
}

/// Manages the preferences file and its in-memory cache
pub struct PreferencesStore {
    path: PathBuf,
    image_dir: PathBuf,
    cache: Option<Preferences>,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        let store = Self {
            path: path.into(),
            image_dir: image_dir.into(),
            cache: None,
        };
        store.ensure_directories();
        store
    }

    fn ensure_directories(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Failed to create {}: {}", parent.display(), e);
            }
        }
        if let Err(e) = fs::create_dir_all(&self.image_dir) {
            log::warn!("Failed to create {}: {}", self.image_dir.display(), e);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Current record. Served from cache when warm, otherwise read from
    /// disk; an unreadable file yields the defaults.
    pub fn load(&mut self) -> Preferences {
        if let Some(cached) = &self.cache {
            return cached.clone();
        }

        let prefs = self.read_file().unwrap_or_else(|e| {
            log::warn!("Failed to load preferences, using defaults: {}", e);
            Preferences::default()
        });
        self.cache = Some(prefs.clone());
        prefs
    }

    fn read_file(&self) -> FirecatResult<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }

        let contents = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Preferences::from_partial(&map),
            _ => Err(FirecatError::malformed("preferences file is not a JSON object")),
        }
    }

    /// Replace the stored record with `partial` laid over the defaults.
    ///
    /// A payload with mistyped values is rejected before anything changes.
    /// Write failures are logged; the cache still takes the new record.
    pub fn save(&mut self, partial: &Map<String, Value>) -> FirecatResult<Preferences> {
        let prefs = Preferences::from_partial(partial)?;
        self.write_file(&prefs);
        self.cache = Some(prefs.clone());
        Ok(prefs)
    }

    /// Overlay `patch` on the current record and save the result.
    ///
    /// A patch that changes the colour without naming a mode has its mode
    /// derived again instead of inheriting a stored `custom`.
    pub fn update(&mut self, patch: &Map<String, Value>) -> FirecatResult<Preferences> {
        let mut current = self.load().to_map()?;
        if patch.contains_key("backgroundColor") && !patch.contains_key("mode") {
            current.remove("mode");
        }
        for (key, value) in patch {
            current.insert(key.clone(), value.clone());
        }
        self.save(&current)
    }

    /// Write the defaults to disk and drop the cache
    pub fn reset(&mut self) {
        self.write_file(&Preferences::default());
        self.cache = None;
        log::info!("Preferences reset to defaults");
    }

    fn write_file(&self, prefs: &Preferences) {
        let result = serde_json::to_string_pretty(prefs)
            .map_err(FirecatError::from)
            .and_then(|data| fs::write(&self.path, data).map_err(FirecatError::from));
        if let Err(e) = result {
            log::error!("Failed to save preferences to {}: {}", self.path.display(), e);
        }
    }

    /// Copy an image into the managed folder and make it the background
    pub fn set_background_image(&mut self, source: &Path) -> FirecatResult<PathBuf> {
        if !source.exists() {
            return Err(FirecatError::FileNotFound(source.display().to_string()));
        }
        let file_name = source
            .file_name()
            .ok_or_else(|| FirecatError::FileNotFound(source.display().to_string()))?;

        fs::create_dir_all(&self.image_dir)?;
        let target = self.image_dir.join(file_name);
        fs::copy(source, &target)?;

        let mut patch = Map::new();
        patch.insert(
            "backgroundImage".to_string(),
            Value::String(target.to_string_lossy().into_owned()),
        );
        self.update(&patch)?;
        log::info!("Background image set to {}", target.display());
        Ok(target)
    }

    pub fn clear_background_image(&mut self) -> FirecatResult<Preferences> {
        let mut patch = Map::new();
        patch.insert("backgroundImage".to_string(), Value::Null);
        self.update(&patch)
    }
}
