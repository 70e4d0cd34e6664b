//! Browser engine abstraction
//!
//! Each tab owns one engine view. The shell only ever talks to a view
//! through [`BrowserEngine`], so the rendering backend can be swapped
//! without touching tab or navigation logic.
//!
//! Engine views are not required to be thread-safe beyond `Send`: every
//! call happens on the thread that owns the shell.

use firecat_core::types::TabId;
use serde::{Deserialize, Serialize};

/// Common interface for engine views
pub trait BrowserEngine: Send {
    /// Start loading a URL
    fn navigate(&mut self, url: &str);

    /// Reload the current page
    fn reload(&mut self);

    /// Step back in the view's own history
    fn back(&mut self);

    /// Step forward in the view's own history
    fn forward(&mut self);

    fn can_go_back(&self) -> bool;

    fn can_go_forward(&self) -> bool;

    /// Location the view currently shows
    fn current_url(&self) -> String;

    /// Evaluate a script in the page (fire-and-forget)
    fn run_script(&mut self, script: &str);

    /// Release the view. Called once, after which the view is dropped.
    fn close(&mut self) {}

    /// Events produced since the last call.
    ///
    /// Backends that deliver events through their own callback channel
    /// keep the default.
    fn take_events(&mut self) -> Vec<EngineEvent> {
        Vec::new()
    }
}

/// Notifications an engine view raises about its own state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    LoadStarted,
    LoadFinished { ok: bool },
    UrlChanged { url: String },
    TitleChanged { title: String },
}

/// Creates the engine view for a new tab
pub trait EngineFactory: Send {
    fn create(&mut self, tab: TabId) -> Box<dyn BrowserEngine>;
}

impl<F> EngineFactory for F
where
    F: FnMut(TabId) -> Box<dyn BrowserEngine> + Send,
{
    fn create(&mut self, tab: TabId) -> Box<dyn BrowserEngine> {
        self(tab)
    }
}
