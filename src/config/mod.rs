//! Configuration module for ermap.
//!
//! Handles the naming policy and output settings.

mod settings;

pub use settings::{NamingSettings, OutputSettings, Settings, SettingsError};
