//! Application state management

use crate::bridge::SettingsBridge;
use crate::ipc::JS_BRIDGE;
use firecat_core::{BrowserConfig, FirecatResult};
use firecat_shell::{BrowserShell, EngineFactory, ShellEvent};
use firecat_store::PreferencesStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{info, warn};

/// Lock a mutex, recovering the data if a previous holder panicked
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Main application state
pub struct AppState {
    pub config: BrowserConfig,
    pub shell: Arc<Mutex<BrowserShell>>,
    pub bridge: SettingsBridge,
}

impl AppState {
    pub fn new(config: BrowserConfig, factory: Box<dyn EngineFactory>) -> FirecatResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        info!("Data directory: {}", config.data_dir.display());

        let preferences = PreferencesStore::new(config.preferences_path(), config.image_dir());
        let shell = Arc::new(Mutex::new(BrowserShell::new(config.clone(), factory)?));
        let bridge = SettingsBridge::new(&shell, preferences);

        Ok(Self {
            config,
            shell,
            bridge,
        })
    }

    /// Install the page bridge in the home tab and restore saved visuals
    pub fn startup(&mut self) {
        if !lock(&self.shell).run_script_in_home(JS_BRIDGE) {
            warn!("Home tab missing at startup");
        }
        if let Err(e) = self.bridge.apply_saved_preferences() {
            warn!("Failed to apply saved preferences: {}", e);
        }
    }

    /// Drain shell events, re-applying the background whenever the home
    /// tab is shown or reloaded. Returns the events for the chrome.
    pub fn process_shell_events(&mut self) -> Vec<ShellEvent> {
        let events = lock(&self.shell).drain_events();
        let home_shown = events
            .iter()
            .any(|e| matches!(e, ShellEvent::HomeActivated | ShellEvent::HomeLoaded));
        if home_shown {
            if let Err(e) = self.bridge.apply_current_background() {
                warn!("Failed to re-apply background: {}", e);
            }
        }
        events
    }

    pub fn tick(&mut self, now: Instant) -> Vec<ShellEvent> {
        lock(&self.shell).tick(now);
        self.process_shell_events()
    }

    /// Save the mirrored theme, flush history and release every tab
    pub fn shutdown(&mut self) {
        if let Err(e) = self.bridge.save_before_exit() {
            warn!("Failed to save theme before exit: {}", e);
        }
        lock(&self.shell).shutdown();
        info!("Firecat shut down");
    }
}
