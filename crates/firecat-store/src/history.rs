//! Browsing history: a capped, de-duplicated, most-recent-first URL list.
//!
//! Visits mutate the in-memory list immediately. Writing it out is deferred
//! behind a single flush deadline that every new visit pushes back, so a
//! burst of navigations costs one disk write. The owner drives the deadline
//! with [`HistoryStore::flush_if_due`].

use firecat_core::types::BLANK_URL;
use firecat_core::{BrowserConfig, FirecatError, FirecatResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<String>,
    max_items: usize,
    blank_url: String,
    flush_delay: Duration,
    flush_deadline: Option<Instant>,
}

impl HistoryStore {
    /// Empty store writing to `path`; nothing is read from disk
    pub fn new(path: impl Into<PathBuf>, max_items: usize, flush_delay: Duration) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            max_items: max_items.max(1),
            blank_url: BLANK_URL.to_string(),
            flush_delay,
            flush_deadline: None,
        }
    }

    /// Store for the configured history file, loaded from disk
    pub fn from_config(config: &BrowserConfig) -> Self {
        let mut store = Self::new(
            config.history_path(),
            config.max_history_items,
            config.history_flush_delay(),
        );
        store.blank_url = config.blank_url.clone();
        store.load();
        store
    }

    /// Replace the in-memory list with the file contents.
    ///
    /// A missing or unreadable file leaves the list empty.
    pub fn load(&mut self) {
        self.entries = match self.read_file() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to load history from {}: {}", self.path.display(), e);
                Vec::new()
            }
        };
        self.flush_deadline = None;
        log::info!("Loaded {} history entries", self.entries.len());
    }

    fn read_file(&self) -> FirecatResult<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let raw: Vec<String> = serde_json::from_str(&contents)?;

        let mut entries: Vec<String> = Vec::with_capacity(raw.len().min(self.max_items));
        for url in raw {
            if entries.len() == self.max_items {
                break;
            }
            if !entries.contains(&url) {
                entries.push(url);
            }
        }
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries, most recent first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|entry| entry == url)
    }

    /// When the pending write is due, if one is scheduled
    pub fn pending_flush(&self) -> Option<Instant> {
        self.flush_deadline
    }

    /// Record a visit now. Returns false when the URL was ignored.
    pub fn record_visit(&mut self, url: &str) -> bool {
        self.record_visit_at(url, Instant::now())
    }

    /// Record a visit at `now`, scheduling the flush relative to it
    pub fn record_visit_at(&mut self, url: &str, now: Instant) -> bool {
        if url.is_empty() || url == self.blank_url {
            return false;
        }

        if let Some(pos) = self.entries.iter().position(|entry| entry == url) {
            self.entries.remove(pos);
        }
        self.entries.insert(0, url.to_string());
        self.entries.truncate(self.max_items);

        self.flush_deadline = Some(now + self.flush_delay);
        true
    }

    /// Write the list if the pending deadline has passed.
    /// Returns true when a write was attempted.
    pub fn flush_if_due(&mut self, now: Instant) -> bool {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => {
                self.flush_deadline = None;
                self.persist_logged();
                true
            }
            _ => false,
        }
    }

    /// Write any pending changes immediately
    pub fn flush_now(&mut self) {
        if self.flush_deadline.take().is_some() {
            self.persist_logged();
        }
    }

    /// Drop every entry and write the empty list right away
    pub fn clear(&mut self) {
        self.entries.clear();
        self.flush_deadline = None;
        self.persist_logged();
        log::info!("Browsing history cleared");
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            log::error!("{}", e);
        }
    }

    fn persist(&self) -> FirecatResult<()> {
        let data = serde_json::to_string(&self.entries)?;
        fs::write(&self.path, data).map_err(|e| {
            FirecatError::persistence(format!(
                "failed to write history to {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("path", &self.path)
            .field("len", &self.entries.len())
            .field("max_items", &self.max_items)
            .field("flush_deadline", &self.flush_deadline)
            .finish()
    }
}
