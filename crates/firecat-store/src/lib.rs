//! File-backed stores for Firecat: user preferences and browsing history.

pub mod color;
pub mod history;
pub mod preferences;

pub use color::rgb_to_hex;
pub use history::HistoryStore;
pub use preferences::{Preferences, PreferencesStore};
