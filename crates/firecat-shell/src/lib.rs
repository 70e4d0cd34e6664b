//! Browser shell - tabs, toolbar navigation, browsing history
//!
//! [`BrowserShell`] owns the tab registry, the navigation controller and the
//! history store. User intents and engine events go in; [`ShellEvent`]s come
//! out for whatever is drawing the chrome.

pub mod engine;
pub mod headless;
pub mod navigation;
pub mod tabs;

pub use engine::{BrowserEngine, EngineEvent, EngineFactory};
pub use navigation::{NavigationController, ToolbarState};
pub use tabs::{Tab, TabHandle, TabRegistry, TabSummary};

use firecat_core::types::TabId;
use firecat_core::{BrowserConfig, FirecatError, FirecatResult};
use firecat_store::HistoryStore;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Number of URL-bar suggestions offered
const MAX_SUGGESTIONS: usize = 8;

/// Notifications for the chrome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShellEvent {
    TabsChanged { count: usize, new_tab_enabled: bool },
    ToolbarChanged { toolbar: ToolbarState },
    TabTitleChanged { index: usize, title: String, tooltip: String },
    /// Message to show the user in a dialog
    Notice { message: String },
    /// The home tab became the active tab
    HomeActivated,
    /// The home tab finished loading its page
    HomeLoaded,
}

pub struct BrowserShell {
    config: BrowserConfig,
    tabs: TabRegistry,
    navigation: NavigationController,
    history: HistoryStore,
    events: Vec<ShellEvent>,
    shut_down: bool,
}

impl BrowserShell {
    /// Build a shell with history loaded from the configured file and the
    /// home tab open.
    pub fn new(config: BrowserConfig, factory: Box<dyn EngineFactory>) -> FirecatResult<Self> {
        let history = HistoryStore::from_config(&config);
        Self::with_history(config, factory, history)
    }

    pub fn with_history(
        config: BrowserConfig,
        factory: Box<dyn EngineFactory>,
        history: HistoryStore,
    ) -> FirecatResult<Self> {
        log::info!("Initializing browser shell");

        let mut tabs = TabRegistry::with_limits(factory, config.max_tabs, config.title_max_chars);
        tabs.set_blank_url(config.blank_url.clone());
        let navigation = NavigationController::new(&config.search_engine, &config.blank_url);

        let mut shell = Self {
            config,
            tabs,
            navigation,
            history,
            events: Vec::new(),
            shut_down: false,
        };

        let home_url = shell.config.home_url.clone();
        shell.tabs.create_tab(Some(&home_url))?;
        shell.notify_tabs_changed();
        shell.refresh_toolbar();
        Ok(shell)
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn tabs(&self) -> &TabRegistry {
        &self.tabs
    }

    pub fn toolbar(&self) -> &ToolbarState {
        self.navigation.toolbar()
    }

    pub fn toolbar_refreshes(&self) -> u64 {
        self.navigation.refresh_count()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<ShellEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: ShellEvent) {
        self.events.push(event);
    }

    fn refresh_toolbar(&mut self) {
        let toolbar = self.navigation.refresh(&self.tabs).clone();
        self.emit(ShellEvent::ToolbarChanged { toolbar });
    }

    fn notify_tabs_changed(&mut self) {
        let event = ShellEvent::TabsChanged {
            count: self.tabs.len(),
            new_tab_enabled: self.tabs.new_tab_enabled(),
        };
        self.emit(event);
    }

    fn notice(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.emit(ShellEvent::Notice { message });
    }

    fn capacity_notice(&mut self) {
        let message = format!("Maximum of {} tabs allowed.", self.tabs.max_tabs());
        self.notice(message);
    }

    /// Resolve URL-bar input and load it.
    ///
    /// From the home tab the page opens in a new tab; any other tab
    /// navigates in place.
    pub fn submit_url(&mut self, text: &str) {
        let url = match self.navigation.resolve_input(text) {
            Some(url) => url,
            None => return,
        };

        if self.tabs.active_index() == 0 {
            match self.open_tab(&url) {
                Ok(_) => {}
                Err(e) if e.is_capacity() => self.capacity_notice(),
                Err(e) => log::error!("Failed to open {}: {}", url, e),
            }
        } else if let Some(tab) = self.tabs.active_tab_mut() {
            log::info!("Navigating {} to {}", tab.id(), url);
            tab.engine_mut().navigate(&url);
            tab.set_url(url);
        }
        self.refresh_toolbar();
    }

    /// Open `url` in a new tab and select it
    pub fn open_in_new_tab(&mut self, url: &str) -> FirecatResult<TabHandle> {
        let handle = self.open_tab(url)?;
        self.refresh_toolbar();
        Ok(handle)
    }

    fn open_tab(&mut self, url: &str) -> FirecatResult<TabHandle> {
        let handle = self.tabs.create_tab(Some(url))?;
        self.notify_tabs_changed();
        Ok(handle)
    }

    /// The chrome's "+" action
    pub fn add_new_tab(&mut self) -> Option<TabHandle> {
        let url = self.config.new_tab_url.clone();
        match self.open_in_new_tab(&url) {
            Ok(handle) => Some(handle),
            Err(e) => {
                if e.is_capacity() {
                    self.capacity_notice();
                } else {
                    log::error!("Failed to open new tab: {}", e);
                }
                None
            }
        }
    }

    pub fn go_back(&mut self) {
        if self.tabs.active_index() == 0 {
            return;
        }
        let Some(tab) = self.tabs.active_tab_mut() else {
            return;
        };
        if !tab.engine().can_go_back() {
            return;
        }
        tab.engine_mut().back();
        self.refresh_toolbar();
    }

    pub fn go_forward(&mut self) {
        if self.tabs.active_index() == 0 {
            return;
        }
        let Some(tab) = self.tabs.active_tab_mut() else {
            return;
        };
        if !tab.engine().can_go_forward() {
            return;
        }
        tab.engine_mut().forward();
        self.refresh_toolbar();
    }

    pub fn reload(&mut self) {
        if self.tabs.active_index() == 0 {
            return;
        }
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.engine_mut().reload();
            self.refresh_toolbar();
        }
    }

    /// Switch to the home tab; other tabs stay open
    pub fn go_home(&mut self) {
        self.select_tab(0);
    }

    pub fn select_tab(&mut self, index: usize) -> bool {
        if !self.tabs.select(index) {
            log::debug!("No tab at index {}", index);
            return false;
        }
        if index == 0 {
            self.emit(ShellEvent::HomeActivated);
        }
        self.refresh_toolbar();
        true
    }

    /// Ctrl+Tab: select the next tab, wrapping to the first
    pub fn next_tab(&mut self) {
        let count = self.tabs.len();
        if count > 1 {
            let index = (self.tabs.active_index() + 1) % count;
            self.select_tab(index);
        }
    }

    /// Ctrl+Shift+Tab: select the previous tab, wrapping to the last
    pub fn previous_tab(&mut self) {
        let count = self.tabs.len();
        if count > 1 {
            let index = (self.tabs.active_index() + count - 1) % count;
            self.select_tab(index);
        }
    }

    /// Ctrl+1..9: select by position when such a tab exists
    pub fn go_to_tab(&mut self, index: usize) -> bool {
        index < self.tabs.len() && self.select_tab(index)
    }

    pub fn close_tab(&mut self, index: usize) -> bool {
        let was_home = self.tabs.active_index() == 0;
        if self.tabs.close_tab(index).is_none() {
            return false;
        }
        self.notify_tabs_changed();
        if !was_home && self.tabs.active_index() == 0 {
            self.emit(ShellEvent::HomeActivated);
        }
        self.refresh_toolbar();
        true
    }

    /// Ctrl+W
    pub fn close_active_tab(&mut self) -> bool {
        self.close_tab(self.tabs.active_index())
    }

    /// Route an engine event to the tab that raised it.
    ///
    /// Events for tabs that no longer exist are dropped, and only the
    /// active tab's events reach the toolbar.
    pub fn handle_engine_event(&mut self, id: TabId, event: EngineEvent) {
        let Some(index) = self.tabs.index_of(id) else {
            log::debug!("Dropping {:?} for closed tab {}", event, id);
            return;
        };
        let is_active = index == self.tabs.active_index();
        let title_max_chars = self.config.title_max_chars;
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };

        match event {
            EngineEvent::LoadStarted => {
                tab.set_loading(true);
                if is_active {
                    self.refresh_toolbar();
                }
            }
            EngineEvent::LoadFinished { ok } => {
                tab.set_loading(false);
                // The location reported with this load, not wherever the
                // engine has moved on to since
                let url = tab.url().to_string();
                if !ok {
                    log::warn!("Load failed in {}: {}", id, url);
                } else if index == 0 {
                    self.emit(ShellEvent::HomeLoaded);
                } else {
                    self.history.record_visit(&url);
                }
                if is_active {
                    self.refresh_toolbar();
                }
            }
            EngineEvent::UrlChanged { url } => {
                tab.set_url(url);
                if is_active {
                    self.refresh_toolbar();
                }
            }
            EngineEvent::TitleChanged { title } => {
                tab.set_title(title);
                let event = ShellEvent::TabTitleChanged {
                    index,
                    title: tab.display_title(title_max_chars),
                    tooltip: tab.tooltip().to_string(),
                };
                self.emit(event);
            }
        }
    }

    /// Collect queued events from every engine and route them
    pub fn pump_engine_events(&mut self) {
        let mut pending = Vec::new();
        for tab in self.tabs.iter_mut() {
            let id = tab.id();
            for event in tab.engine_mut().take_events() {
                pending.push((id, event));
            }
        }
        for (id, event) in pending {
            self.handle_engine_event(id, event);
        }
    }

    /// Run a script in the home tab.
    /// Returns false when the home tab is no longer at index 0.
    pub fn run_script_in_home(&mut self, script: &str) -> bool {
        match self.tabs.home_mut() {
            Some(home) => {
                home.engine_mut().run_script(script);
                true
            }
            None => {
                log::debug!("Home tab not resident, skipping script");
                false
            }
        }
    }

    /// History entries matching URL-bar input
    pub fn suggestions(&self, input: &str) -> Vec<String> {
        self.navigation
            .suggestions(input, self.history.entries(), MAX_SUGGESTIONS)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Periodic housekeeping: deliver engine events and flush history
    /// once its deadline passes.
    pub fn tick(&mut self, now: Instant) {
        self.pump_engine_events();
        self.history.flush_if_due(now);
    }

    /// Flush history and release every engine. Further calls are no-ops.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        log::info!("Shutting down browser shell");

        self.history.flush_now();
        let blank = self.config.blank_url.clone();
        for tab in self.tabs.iter_mut() {
            let engine = tab.engine_mut();
            engine.navigate(&blank);
            engine.close();
        }
        self.shut_down = true;
    }

    /// Look a tab up by position, as an error when it does not exist
    pub fn tab_at(&self, index: usize) -> FirecatResult<&Tab> {
        self.tabs.get(index).ok_or(FirecatError::TabNotFound(index))
    }
}
