//! Tab registry
//!
//! Tabs live in display order. Index 0 is the home tab: it is created
//! first, can never be closed, and so is always present. The number of
//! tabs stays within `[1, max_tabs]` once the home tab exists.

use crate::engine::{BrowserEngine, EngineFactory};
use firecat_core::types::{TabId, BLANK_URL, MAX_TABS, TITLE_MAX_CHARS};
use firecat_core::{FirecatError, FirecatResult};
use serde::{Deserialize, Serialize};

/// Identifies a tab by stable id and by its position when returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabHandle {
    pub id: TabId,
    pub index: usize,
}

pub struct Tab {
    id: TabId,
    url: String,
    title: String,
    loading: bool,
    engine: Box<dyn BrowserEngine>,
}

impl Tab {
    pub fn id(&self) -> TabId {
        self.id
    }

    /// Last location reported for this tab
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Full page title, as shown in the tooltip
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tooltip(&self) -> &str {
        &self.title
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Title as drawn on the tab strip
    pub fn display_title(&self, max_chars: usize) -> String {
        truncate_title(&self.title, max_chars)
    }

    pub fn engine(&self) -> &dyn BrowserEngine {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> &mut dyn BrowserEngine {
        self.engine.as_mut()
    }

    pub(crate) fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

/// Shorten a page title to `max_chars` characters plus an ellipsis.
/// An empty title reads "New Tab".
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.is_empty() {
        return "New Tab".to_string();
    }
    if title.chars().count() > max_chars {
        let head: String = title.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

/// Serializable view of one tab for the chrome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSummary {
    pub id: TabId,
    pub index: usize,
    pub title: String,
    pub tooltip: String,
    pub url: String,
    pub closable: bool,
    pub active: bool,
    pub loading: bool,
}

pub struct TabRegistry {
    tabs: Vec<Tab>,
    active: usize,
    home: Option<TabId>,
    max_tabs: usize,
    title_max_chars: usize,
    blank_url: String,
    factory: Box<dyn EngineFactory>,
}

impl TabRegistry {
    pub fn new(factory: Box<dyn EngineFactory>) -> Self {
        Self::with_limits(factory, MAX_TABS, TITLE_MAX_CHARS)
    }

    pub fn with_limits(
        factory: Box<dyn EngineFactory>,
        max_tabs: usize,
        title_max_chars: usize,
    ) -> Self {
        Self {
            tabs: Vec::new(),
            active: 0,
            home: None,
            max_tabs: max_tabs.max(1),
            title_max_chars,
            blank_url: BLANK_URL.to_string(),
            factory,
        }
    }

    pub fn set_blank_url(&mut self, blank_url: impl Into<String>) {
        self.blank_url = blank_url.into();
    }

    /// Open a tab at the end of the strip and select it.
    ///
    /// The first tab ever created becomes the home tab.
    pub fn create_tab(&mut self, url: Option<&str>) -> FirecatResult<TabHandle> {
        if self.at_capacity() {
            log::warn!("Refusing to open tab: {} tabs already open", self.tabs.len());
            return Err(FirecatError::capacity(self.max_tabs));
        }

        let id = TabId::new();
        let mut engine = self.factory.create(id);
        let start_url = match url {
            Some(url) if !url.is_empty() => {
                engine.navigate(url);
                url.to_string()
            }
            _ => self.blank_url.clone(),
        };

        self.tabs.push(Tab {
            id,
            url: start_url,
            title: String::new(),
            loading: false,
            engine,
        });
        if self.home.is_none() {
            self.home = Some(id);
            log::info!("Created home tab {}", id);
        } else {
            log::info!("Created tab {} ({} open)", id, self.tabs.len());
        }

        self.active = self.tabs.len() - 1;
        Ok(TabHandle {
            id,
            index: self.active,
        })
    }

    /// Close the tab at `index`, returning its id.
    ///
    /// The home tab, indices out of range, and the last remaining tab are
    /// left alone. The engine is pointed at the blank page before it is
    /// released.
    pub fn close_tab(&mut self, index: usize) -> Option<TabId> {
        if !self.closable(index) || self.tabs.len() <= 1 {
            log::debug!("Ignoring close request for tab index {}", index);
            return None;
        }

        let mut tab = self.tabs.remove(index);
        let blank = self.blank_url.clone();
        tab.engine.navigate(&blank);
        tab.engine.close();
        log::info!("Closed tab {} ({} open)", tab.id, self.tabs.len());

        // A closed active tab hands selection to its right neighbour,
        // which now sits at the same index
        if self.active > index {
            self.active -= 1;
        } else if self.active >= self.tabs.len() {
            self.active = self.tabs.len() - 1;
        }
        Some(tab.id)
    }

    pub fn closable(&self, index: usize) -> bool {
        index != 0 && index < self.tabs.len()
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.active)
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        self.tabs.get_mut(self.active)
    }

    pub fn active_handle(&self) -> Option<TabHandle> {
        self.active_tab().map(|tab| TabHandle {
            id: tab.id,
            index: self.active,
        })
    }

    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tab> {
        self.tabs.get_mut(index)
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }

    /// The home tab, if it is still resident at index 0
    pub fn home(&self) -> Option<&Tab> {
        let home = self.home?;
        self.tabs.first().filter(|tab| tab.id == home)
    }

    pub fn home_mut(&mut self) -> Option<&mut Tab> {
        let home = self.home?;
        self.tabs.first_mut().filter(|tab| tab.id == home)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn max_tabs(&self) -> usize {
        self.max_tabs
    }

    pub fn at_capacity(&self) -> bool {
        self.tabs.len() >= self.max_tabs
    }

    /// Whether the new-tab affordance should be enabled
    pub fn new_tab_enabled(&self) -> bool {
        !self.at_capacity()
    }

    pub fn ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|tab| tab.id).collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tab> {
        self.tabs.iter_mut()
    }

    pub fn summaries(&self) -> Vec<TabSummary> {
        self.tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| TabSummary {
                id: tab.id,
                index,
                title: tab.display_title(self.title_max_chars),
                tooltip: tab.tooltip().to_string(),
                url: tab.url.clone(),
                closable: index != 0,
                active: index == self.active,
                loading: tab.loading,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{EngineCall, HeadlessFactory, Journal};

    fn registry() -> (TabRegistry, Journal) {
        let factory = HeadlessFactory::new();
        let journal = factory.journal();
        (TabRegistry::new(Box::new(factory)), journal)
    }

    fn registry_with(count: usize) -> (TabRegistry, Journal) {
        let (mut tabs, journal) = registry();
        tabs.create_tab(Some("firecat://home")).unwrap();
        for i in 1..count {
            tabs.create_tab(Some(&format!("https://site{}.com", i)))
                .unwrap();
        }
        (tabs, journal)
    }

    #[test]
    fn test_first_tab_is_home() {
        let (mut tabs, _) = registry();
        let handle = tabs.create_tab(Some("https://example.com")).unwrap();
        assert_eq!(handle.index, 0);
        assert!(!tabs.closable(0));
        assert_eq!(tabs.home().map(Tab::id), Some(handle.id));
    }

    #[test]
    fn test_create_selects_new_tab() {
        let (mut tabs, _) = registry_with(1);
        let handle = tabs.create_tab(Some("https://a.com")).unwrap();
        assert_eq!(handle.index, 1);
        assert_eq!(tabs.active_index(), 1);
        assert!(tabs.closable(1));
    }

    #[test]
    fn test_capacity_is_enforced() {
        let (mut tabs, _) = registry_with(MAX_TABS - 1);
        assert!(tabs.new_tab_enabled());

        tabs.create_tab(None).unwrap();
        assert_eq!(tabs.len(), MAX_TABS);
        assert!(!tabs.new_tab_enabled());

        let err = tabs.create_tab(Some("https://x.com")).unwrap_err();
        assert!(err.is_capacity());
        assert_eq!(tabs.len(), MAX_TABS);
    }

    #[test]
    fn test_home_and_last_tab_cannot_close() {
        let (mut tabs, _) = registry_with(1);
        assert_eq!(tabs.close_tab(0), None);
        assert_eq!(tabs.len(), 1);

        let (mut tabs, _) = registry_with(3);
        assert_eq!(tabs.close_tab(0), None);
        assert_eq!(tabs.close_tab(7), None);
        assert_eq!(tabs.len(), 3);
    }

    #[test]
    fn test_close_blanks_then_releases_engine() {
        let (mut tabs, journal) = registry_with(3);
        let id = tabs.get(1).unwrap().id();

        assert_eq!(tabs.close_tab(1), Some(id));
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs.index_of(id), None);

        let calls = journal.calls_for(id);
        assert_eq!(
            &calls[calls.len() - 2..],
            &[
                EngineCall::Navigate(BLANK_URL.to_string()),
                EngineCall::Close
            ]
        );
    }

    #[test]
    fn test_close_active_selects_right_neighbour() {
        let (mut tabs, _) = registry_with(4);
        tabs.select(1);
        let right = tabs.get(2).unwrap().id();

        tabs.close_tab(1);
        assert_eq!(tabs.active_index(), 1);
        assert_eq!(tabs.active_tab().unwrap().id(), right);
    }

    #[test]
    fn test_close_last_active_selects_new_last() {
        let (mut tabs, _) = registry_with(3);
        assert_eq!(tabs.active_index(), 2);
        tabs.close_tab(2);
        assert_eq!(tabs.active_index(), 1);

        tabs.close_tab(1);
        assert_eq!(tabs.active_index(), 0);
        assert_eq!(tabs.len(), 1);
    }

    #[test]
    fn test_close_other_tab_keeps_selection() {
        let (mut tabs, _) = registry_with(4);
        tabs.select(3);
        let active = tabs.active_tab().unwrap().id();

        tabs.close_tab(1);
        assert_eq!(tabs.active_tab().unwrap().id(), active);
        assert_eq!(tabs.active_index(), 2);

        tabs.select(0);
        tabs.close_tab(1);
        assert_eq!(tabs.active_index(), 0);
    }

    #[test]
    fn test_closure_factory() {
        use crate::headless::HeadlessEngine;

        let journal = Journal::new();
        let shared = journal.clone();
        let factory = move |id: TabId| -> Box<dyn BrowserEngine> {
            Box::new(HeadlessEngine::new(id, shared.clone()))
        };
        let mut tabs = TabRegistry::new(Box::new(factory));
        let handle = tabs.create_tab(Some("https://a.com")).unwrap();

        assert_eq!(
            journal.calls_for(handle.id),
            vec![EngineCall::Navigate("https://a.com".to_string())]
        );
    }

    #[test]
    fn test_title_truncation() {
        assert_eq!(truncate_title("", 15), "New Tab");
        assert_eq!(truncate_title("Short", 15), "Short");
        assert_eq!(truncate_title("Exactly fifteen", 15), "Exactly fifteen");
        assert_eq!(
            truncate_title("A much longer page title", 15),
            "A much longer p..."
        );
    }

    #[test]
    fn test_summaries() {
        let (tabs, _) = registry_with(2);
        let summaries = tabs.summaries();
        assert_eq!(summaries.len(), 2);
        assert!(!summaries[0].closable);
        assert!(summaries[1].closable);
        assert!(summaries[1].active);
        assert_eq!(summaries[1].title, "New Tab");
        assert_eq!(summaries[1].url, "https://site1.com");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Step {
            Create,
            Close(usize),
            Select(usize),
        }

        fn arb_step() -> impl Strategy<Value = Step> {
            prop_oneof![
                3 => Just(Step::Create),
                2 => (0usize..12).prop_map(Step::Close),
                1 => (0usize..12).prop_map(Step::Select),
            ]
        }

        proptest! {
            #[test]
            fn home_survives_any_sequence(steps in proptest::collection::vec(arb_step(), 0..60)) {
                let (mut tabs, _) = registry_with(1);
                let home = tabs.home().map(Tab::id);

                for step in steps {
                    match step {
                        Step::Create => {
                            let before = tabs.len();
                            let result = tabs.create_tab(Some("https://a.com"));
                            prop_assert_eq!(result.is_err(), before == tabs.max_tabs());
                        }
                        Step::Close(index) => {
                            let closed = tabs.close_tab(index);
                            if index == 0 {
                                prop_assert!(closed.is_none());
                            }
                        }
                        Step::Select(index) => {
                            tabs.select(index);
                        }
                    }

                    prop_assert!(!tabs.closable(0));
                    prop_assert!(tabs.len() >= 1 && tabs.len() <= tabs.max_tabs());
                    prop_assert_eq!(tabs.home().map(Tab::id), home);
                    prop_assert_eq!(tabs.new_tab_enabled(), tabs.len() < tabs.max_tabs());
                    prop_assert!(tabs.active_index() < tabs.len());
                }
            }
        }
    }
}
