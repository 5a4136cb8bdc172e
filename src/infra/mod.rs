//! Infrastructure - configuration and persisted stores
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults)
//! - `settings` - Alert settings store with clamp-on-read invariants
//! - `contacts` - Emergency contact store

pub mod config;
pub mod contacts;
pub mod settings;

// Re-export commonly used types
pub use config::Config;
pub use contacts::{ContactStore, FileContactStore, MemoryContactStore, MAX_CONTACTS};
pub use settings::{AlertSettings, FileSettingsStore, MemorySettingsStore, SettingsStore};
