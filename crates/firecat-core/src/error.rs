//! Error types for Firecat

use thiserror::Error;

/// Result type alias for Firecat operations
pub type FirecatResult<T> = Result<T, FirecatError>;

/// Main error type for Firecat
#[derive(Error, Debug)]
pub enum FirecatError {
    #[error("Tab limit reached: at most {max} tabs can be open")]
    CapacityExceeded { max: usize },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Stale reference: {0}")]
    StaleReference(String),

    #[error("Tab not found at index {0}")]
    TabNotFound(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FirecatError {
    /// Create a new capacity error
    pub fn capacity(max: usize) -> Self {
        Self::CapacityExceeded { max }
    }

    /// Create a new persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a new malformed payload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Create a new stale reference error
    pub fn stale(msg: impl Into<String>) -> Self {
        Self::StaleReference(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is a tab-capacity rejection
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }
}
