//! Toolbar state and URL-bar input handling

use crate::tabs::TabRegistry;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

/// Schemes typed input is passed through untouched for
const KNOWN_SCHEMES: &[&str] = &["http://", "https://", "file://", "about:"];

/// What the toolbar currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarState {
    pub back_enabled: bool,
    pub forward_enabled: bool,
    pub url_text: String,
    pub home_selected: bool,
    pub new_tab_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    HomeSelected,
    TabSelected(usize),
}

impl NavState {
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            NavState::HomeSelected
        } else {
            NavState::TabSelected(index)
        }
    }
}

/// Keeps the toolbar in step with the active tab.
///
/// The controller never holds on to a tab; each refresh looks the active
/// tab up in the registry again.
pub struct NavigationController {
    search_engine: String,
    blank_url: String,
    toolbar: ToolbarState,
    refreshes: u64,
    matcher: SkimMatcherV2,
}

impl NavigationController {
    pub fn new(search_engine: impl Into<String>, blank_url: impl Into<String>) -> Self {
        Self {
            search_engine: search_engine.into(),
            blank_url: blank_url.into(),
            toolbar: ToolbarState::default(),
            refreshes: 0,
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    /// Number of toolbar refreshes performed so far
    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    /// Recompute the toolbar from the registry's active tab
    pub fn refresh(&mut self, tabs: &TabRegistry) -> &ToolbarState {
        let index = tabs.active_index();
        let mut toolbar = ToolbarState {
            new_tab_enabled: tabs.new_tab_enabled(),
            ..ToolbarState::default()
        };

        match NavState::for_index(index) {
            NavState::HomeSelected => {
                toolbar.home_selected = true;
            }
            NavState::TabSelected(index) => {
                if let Some(tab) = tabs.get(index) {
                    let engine = tab.engine();
                    toolbar.back_enabled = engine.can_go_back();
                    toolbar.forward_enabled = engine.can_go_forward();
                    let url = engine.current_url();
                    if url != self.blank_url {
                        toolbar.url_text = url;
                    }
                }
            }
        }

        self.refreshes += 1;
        self.toolbar = toolbar;
        &self.toolbar
    }

    /// Turn URL-bar text into a location. Empty input yields `None`.
    pub fn resolve_input(&self, text: &str) -> Option<String> {
        resolve_input(text, &self.search_engine)
    }

    pub fn search_url(&self, query: &str) -> String {
        search_url(&self.search_engine, query)
    }

    /// History entries matching `input`, best match first.
    /// Equal scores keep history order, so recent visits win ties.
    pub fn suggestions(&self, input: &str, history: &[String], limit: usize) -> Vec<String> {
        let input = input.trim();
        if input.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<(i64, &String)> = history
            .iter()
            .filter_map(|url| {
                self.matcher
                    .fuzzy_match(url, input)
                    .map(|score| (score, url))
            })
            .collect();

        // Stable sort: ties stay in most-recent-first order
        results.sort_by(|a, b| b.0.cmp(&a.0));

        results
            .into_iter()
            .take(limit)
            .map(|(_, url)| url.clone())
            .collect()
    }
}

/// Resolve typed text against known schemes, bare host names, and finally
/// the search engine.
pub fn resolve_input(text: &str, search_engine: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let lower = text.to_ascii_lowercase();
    if KNOWN_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return Some(text.to_string());
    }

    if text.contains('.') && !text.starts_with('.') && !text.contains(char::is_whitespace) {
        return Some(format!("https://{}", text));
    }

    Some(search_url(search_engine, text))
}

/// Search engine prefix followed by the form-encoded query
pub fn search_url(search_engine: &str, query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}{}", search_engine, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessFactory;

    const GOOGLE: &str = "https://www.google.com/search?q=";

    #[test]
    fn test_resolve_bare_host() {
        assert_eq!(
            resolve_input("example.com", GOOGLE).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            resolve_input("  docs.rs/serde  ", GOOGLE).as_deref(),
            Some("https://docs.rs/serde")
        );
    }

    #[test]
    fn test_resolve_known_schemes() {
        assert_eq!(
            resolve_input("http://localhost:8080", GOOGLE).as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(
            resolve_input("about:blank", GOOGLE).as_deref(),
            Some("about:blank")
        );
        assert_eq!(
            resolve_input("file:///tmp/index.html", GOOGLE).as_deref(),
            Some("file:///tmp/index.html")
        );
    }

    #[test]
    fn test_resolve_search() {
        assert_eq!(
            resolve_input("rust programming", GOOGLE).as_deref(),
            Some("https://www.google.com/search?q=rust+programming")
        );
        assert_eq!(
            resolve_input(".hidden", GOOGLE).as_deref(),
            Some("https://www.google.com/search?q=.hidden")
        );
        assert_eq!(
            resolve_input("what is 1+1?", GOOGLE).as_deref(),
            Some("https://www.google.com/search?q=what+is+1%2B1%3F")
        );
        assert_eq!(
            resolve_input("localhost", GOOGLE).as_deref(),
            Some("https://www.google.com/search?q=localhost")
        );
    }

    #[test]
    fn test_resolve_empty() {
        assert_eq!(resolve_input("", GOOGLE), None);
        assert_eq!(resolve_input("   ", GOOGLE), None);
    }

    #[test]
    fn test_home_toolbar_state() {
        let mut tabs = TabRegistry::new(Box::new(HeadlessFactory::new()));
        tabs.create_tab(Some("firecat://home")).unwrap();

        let mut nav = NavigationController::new(GOOGLE, "about:blank");
        let toolbar = nav.refresh(&tabs).clone();
        assert!(toolbar.home_selected);
        assert!(!toolbar.back_enabled);
        assert!(!toolbar.forward_enabled);
        assert!(toolbar.url_text.is_empty());
        assert!(toolbar.new_tab_enabled);
        assert_eq!(nav.refresh_count(), 1);
    }

    #[test]
    fn test_tab_toolbar_mirrors_engine() {
        let mut tabs = TabRegistry::new(Box::new(HeadlessFactory::new()));
        tabs.create_tab(Some("firecat://home")).unwrap();
        tabs.create_tab(None).unwrap();

        let mut nav = NavigationController::new(GOOGLE, "about:blank");
        let toolbar = nav.refresh(&tabs).clone();
        assert!(!toolbar.home_selected);
        assert!(toolbar.url_text.is_empty());

        let tab = tabs.active_tab_mut().unwrap();
        tab.engine_mut().navigate("https://a.com/");
        tab.engine_mut().navigate("https://b.com/");

        let toolbar = nav.refresh(&tabs).clone();
        assert!(toolbar.back_enabled);
        assert!(!toolbar.forward_enabled);
        assert_eq!(toolbar.url_text, "https://b.com/");
    }

    #[test]
    fn test_suggestions_prefer_better_then_recent() {
        let nav = NavigationController::new(GOOGLE, "about:blank");
        let history = vec![
            "https://github.com/rust-lang".to_string(),
            "https://docs.rs/tokio".to_string(),
            "https://GitHub.com/serde-rs".to_string(),
        ];

        let results = nav.suggestions("github", &history, 5);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|url| url.to_lowercase().contains("github")));

        assert!(nav.suggestions("", &history, 5).is_empty());
        assert_eq!(nav.suggestions("https", &history, 1).len(), 1);
    }
}
