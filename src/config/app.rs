//! Application configuration loading from config.toml
//!
//! The configuration names the storage backend to open at startup and the
//! default operational settings written on first run. Every field has a
//! default, and a missing file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    core::settings::Settings,
    errors::{Error, Result},
};

/// Which persistence backend to open at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Relational database through SeaORM
    #[default]
    Database,
    /// Local JSON file
    Local,
}

/// The `[storage]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend selected at startup
    pub backend: StorageBackend,
    /// Connection URL override for the database backend; when absent the
    /// `DATABASE_URL` environment variable or the built-in default applies
    pub database_url: Option<String>,
    /// Data file path for the local backend
    pub local_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            local_path: PathBuf::from("data/shoptally.json"),
        }
    }
}

/// The `[defaults]` section: settings seeded on first run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Category names offered when filing articles
    pub categories: Vec<String>,
    /// Low-stock threshold
    pub low_stock_threshold: i64,
    /// Session timeout in minutes
    pub session_timeout_minutes: i64,
    /// Appearance theme name
    pub theme: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            categories: settings.categories,
            low_stock_threshold: settings.low_stock_threshold,
            session_timeout_minutes: settings.session_timeout_minutes,
            theme: settings.theme,
        }
    }
}

impl DefaultsConfig {
    /// The settings struct these defaults seed.
    #[must_use]
    pub fn as_settings(&self) -> Settings {
        Settings {
            categories: self.categories.clone(),
            low_stock_threshold: self.low_stock_threshold,
            session_timeout_minutes: self.session_timeout_minutes,
            theme: self.theme.clone(),
        }
    }
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Storage backend selection
    pub storage: StorageConfig,
    /// Settings seeded on first run
    pub defaults: DefaultsConfig,
}

/// Loads the application configuration from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the configuration from the default location (./config.toml).
pub fn load_default_config() -> Result<AppConfig> {
    load_config("config.toml")
}
