//! Firecat Core Library
//!
//! This crate provides shared types, errors, and configuration for Firecat.

pub mod config;
pub mod error;
pub mod types;

pub use config::BrowserConfig;
pub use error::{FirecatError, FirecatResult};
