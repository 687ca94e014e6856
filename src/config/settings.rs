//! TOML settings (`ermap.toml`).
//!
//! Example configuration:
//! ```toml
//! [naming]
//! key_modifier = ""        # key columns are <entity>_<modifier>id
//! type_suffix = "_type"
//! table_prefix = "rel"
//!
//! [output]
//! dialect = "postgres"     # postgres | duckdb
//! validate_sql = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub naming: NamingSettings,
    pub output: OutputSettings,
}

/// Naming policy for synthesized keys, types and tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingSettings {
    /// Inserted between `<entity>_` and `id` in key column names.
    pub key_modifier: String,

    /// Appended to composite type names.
    pub type_suffix: String,

    /// Table names are `<prefix><grouping index>`.
    pub table_prefix: String,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            key_modifier: String::new(),
            type_suffix: "_type".to_string(),
            table_prefix: "rel".to_string(),
        }
    }
}

impl NamingSettings {
    /// `_<modifier>id`, the ending of every synthesized key column.
    pub fn key_suffix(&self) -> String {
        format!("_{}id", self.key_modifier)
    }

    /// Declared attributes standing for the entity key: `person_id`, or
    /// `person_<modifier>id`. They are represented by the key column.
    pub fn is_key_attribute(&self, name: &str) -> bool {
        name.ends_with("_id") || name.ends_with(&self.key_suffix())
    }

    /// Key column for an entity: `person` → `person_id`.
    pub fn key_column(&self, entity: &str) -> String {
        format!("{}{}", entity, self.key_suffix())
    }

    /// Key column named after a role label. A trailing key suffix (or plain
    /// `_id`) on the role is dropped first, so `prereq_course_id` and
    /// `prereq_course` agree.
    pub fn role_key_column(&self, role: &str) -> String {
        let role = role.to_lowercase();
        let suffix = self.key_suffix();
        let stem = role
            .strip_suffix(suffix.as_str())
            .or_else(|| role.strip_suffix("_id"))
            .unwrap_or(&role);
        self.key_column(stem)
    }

    /// Composite type name for an attribute: `person.name` → `person_name_type`.
    pub fn type_name(&self, attribute_unique_name: &str) -> String {
        format!(
            "{}{}",
            attribute_unique_name.replace('.', "_"),
            self.type_suffix
        )
    }

    pub fn table_name(&self, index: usize) -> String {
        format!("{}{}", self.table_prefix, index)
    }

    /// Flattened column name: owner prefix dropped, `.` → `__`.
    pub fn column_name(&self, local_path: &str) -> String {
        local_path.replace('.', "__")
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.table_prefix.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "naming.table_prefix must not be empty".into(),
            ));
        }
        if self.type_suffix.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "naming.type_suffix must not be empty".into(),
            ));
        }
        if self.key_modifier.contains('.') {
            return Err(SettingsError::InvalidConfig(format!(
                "naming.key_modifier contains '.': {}",
                self.key_modifier
            )));
        }
        Ok(())
    }
}

/// Output options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// SQL dialect for DDL and reconstruction queries.
    pub dialect: Dialect,

    /// Parse every emitted query back with sqlparser before returning it.
    pub validate_sql: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            validate_sql: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.naming.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `ERMAP_CONFIG`
    /// 2. `./ermap.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("ERMAP_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("ermap.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        Ok(Settings::default())
    }
}
