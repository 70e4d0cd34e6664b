//! In-memory engine used by the headless driver and by tests.
//!
//! A `HeadlessEngine` keeps a per-view back/forward stack, answers the
//! capability queries from it, and completes every load synchronously by
//! queueing the events a real view would raise. Every call is also written
//! to a journal shared by all views of one factory.

use crate::engine::{BrowserEngine, EngineEvent, EngineFactory};
use firecat_core::types::{TabId, BLANK_URL};
use std::sync::{Arc, Mutex};

/// One call made on an engine view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Navigate(String),
    Reload,
    Back,
    Forward,
    RunScript(String),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub tab: TabId,
    pub call: EngineCall,
}

/// Shared, append-only record of engine calls
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, tab: TabId, call: EngineCall) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(JournalEntry { tab, call }),
            Err(e) => log::warn!("Engine journal unavailable: {}", e),
        }
    }

    /// Copy of every entry so far
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Calls made on one view, in order
    pub fn calls_for(&self, tab: TabId) -> Vec<EngineCall> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.tab == tab)
            .map(|entry| entry.call)
            .collect()
    }

    /// Scripts run on one view, in order
    pub fn scripts_for(&self, tab: TabId) -> Vec<String> {
        self.calls_for(tab)
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::RunScript(script) => Some(script),
                _ => None,
            })
            .collect()
    }
}

pub struct HeadlessEngine {
    tab: TabId,
    blank_url: String,
    stack: Vec<String>,
    position: usize,
    pending: Vec<EngineEvent>,
    closed: bool,
    journal: Journal,
}

impl HeadlessEngine {
    pub fn new(tab: TabId, journal: Journal) -> Self {
        Self::with_blank_url(tab, journal, BLANK_URL)
    }

    /// A view whose idle page is `blank_url`
    pub fn with_blank_url(tab: TabId, journal: Journal, blank_url: impl Into<String>) -> Self {
        let blank_url = blank_url.into();
        Self {
            tab,
            stack: vec![blank_url.clone()],
            blank_url,
            position: 0,
            pending: Vec::new(),
            closed: false,
            journal,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn queue_load(&mut self) {
        let url = self.current_url();
        self.pending.push(EngineEvent::LoadStarted);
        self.pending.push(EngineEvent::UrlChanged { url: url.clone() });
        self.pending.push(EngineEvent::TitleChanged {
            title: title_for(&url, &self.blank_url),
        });
        self.pending.push(EngineEvent::LoadFinished { ok: true });
    }
}

/// Host name for web URLs, the URL itself otherwise
fn title_for(url: &str, blank_url: &str) -> String {
    if url == blank_url {
        return String::new();
    }
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_string()))
        .unwrap_or_else(|| url.to_string())
}

impl BrowserEngine for HeadlessEngine {
    fn navigate(&mut self, url: &str) {
        self.journal.push(self.tab, EngineCall::Navigate(url.to_string()));
        if self.closed {
            return;
        }
        self.stack.truncate(self.position + 1);
        self.stack.push(url.to_string());
        self.position = self.stack.len() - 1;
        self.queue_load();
    }

    fn reload(&mut self) {
        self.journal.push(self.tab, EngineCall::Reload);
        if self.closed {
            return;
        }
        self.pending.push(EngineEvent::LoadStarted);
        self.pending.push(EngineEvent::LoadFinished { ok: true });
    }

    fn back(&mut self) {
        self.journal.push(self.tab, EngineCall::Back);
        if self.can_go_back() {
            self.position -= 1;
            self.queue_load();
        }
    }

    fn forward(&mut self) {
        self.journal.push(self.tab, EngineCall::Forward);
        if self.can_go_forward() {
            self.position += 1;
            self.queue_load();
        }
    }

    // The initial blank entry is not a page the user can return to
    fn can_go_back(&self) -> bool {
        !self.closed && self.position > 1
    }

    fn can_go_forward(&self) -> bool {
        !self.closed && self.position + 1 < self.stack.len()
    }

    fn current_url(&self) -> String {
        self.stack
            .get(self.position)
            .cloned()
            .unwrap_or_else(|| self.blank_url.clone())
    }

    fn run_script(&mut self, script: &str) {
        self.journal
            .push(self.tab, EngineCall::RunScript(script.to_string()));
    }

    fn close(&mut self) {
        self.journal.push(self.tab, EngineCall::Close);
        self.closed = true;
        self.pending.clear();
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending)
    }
}

/// Builds headless views that all write to one journal
#[derive(Debug, Clone)]
pub struct HeadlessFactory {
    journal: Journal,
    blank_url: String,
}

impl Default for HeadlessFactory {
    fn default() -> Self {
        Self {
            journal: Journal::new(),
            blank_url: BLANK_URL.to_string(),
        }
    }
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle page for every view this factory builds
    pub fn with_blank_url(mut self, blank_url: impl Into<String>) -> Self {
        self.blank_url = blank_url.into();
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl EngineFactory for HeadlessFactory {
    fn create(&mut self, tab: TabId) -> Box<dyn BrowserEngine> {
        log::debug!("Creating headless engine for {}", tab);
        Box::new(HeadlessEngine::with_blank_url(
            tab,
            self.journal.clone(),
            self.blank_url.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (HeadlessEngine, Journal) {
        let journal = Journal::new();
        (HeadlessEngine::new(TabId::new(), journal.clone()), journal)
    }

    #[test]
    fn test_fresh_engine_is_blank() {
        let (engine, _) = engine();
        assert_eq!(engine.current_url(), BLANK_URL);
        assert!(!engine.can_go_back());
        assert!(!engine.can_go_forward());
    }

    #[test]
    fn test_back_and_forward() {
        let (mut engine, _) = engine();
        engine.navigate("https://a.com/");
        assert!(!engine.can_go_back());

        engine.navigate("https://b.com/");
        assert!(engine.can_go_back());

        engine.back();
        assert_eq!(engine.current_url(), "https://a.com/");
        assert!(engine.can_go_forward());

        engine.forward();
        assert_eq!(engine.current_url(), "https://b.com/");
        assert!(!engine.can_go_forward());
    }

    #[test]
    fn test_navigate_drops_forward_entries() {
        let (mut engine, _) = engine();
        engine.navigate("https://a.com/");
        engine.navigate("https://b.com/");
        engine.back();
        engine.navigate("https://c.com/");
        assert!(!engine.can_go_forward());
        engine.back();
        assert_eq!(engine.current_url(), "https://a.com/");
    }

    #[test]
    fn test_navigate_queues_load_events() {
        let (mut engine, _) = engine();
        engine.navigate("https://www.example.com/page");
        let events = engine.take_events();
        assert_eq!(
            events,
            vec![
                EngineEvent::LoadStarted,
                EngineEvent::UrlChanged {
                    url: "https://www.example.com/page".to_string()
                },
                EngineEvent::TitleChanged {
                    title: "www.example.com".to_string()
                },
                EngineEvent::LoadFinished { ok: true },
            ]
        );
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_factory_blank_url() {
        let mut factory = HeadlessFactory::new().with_blank_url("firecat://idle");
        let mut engine = factory.create(TabId::new());
        assert_eq!(engine.current_url(), "firecat://idle");

        engine.navigate("https://a.com/");
        engine.take_events();
        engine.navigate("firecat://idle");
        let events = engine.take_events();
        assert!(events.contains(&EngineEvent::TitleChanged {
            title: String::new()
        }));
    }

    #[test]
    fn test_journal_records_calls() {
        let (mut engine, journal) = engine();
        engine.navigate("about:blank");
        engine.run_script("1 + 1");
        engine.close();

        assert_eq!(
            journal.calls_for(engine.tab),
            vec![
                EngineCall::Navigate("about:blank".to_string()),
                EngineCall::RunScript("1 + 1".to_string()),
                EngineCall::Close,
            ]
        );
        assert!(engine.is_closed());
        assert!(engine.take_events().is_empty());
    }
}
