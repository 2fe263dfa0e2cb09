//! Operational settings with an explicit load/save lifecycle.
//!
//! The settings live as key-value rows in the store and are carried around
//! as a plain struct; components receive the struct (or single values from
//! it), never a handle to some ambient global state. Missing or unparseable
//! rows fall back to the defaults with a warning, so one corrupt value does
//! not take the application down.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{errors::Result, store::Store};

const KEY_CATEGORIES: &str = "categories";
const KEY_LOW_STOCK_THRESHOLD: &str = "low_stock_threshold";
const KEY_SESSION_TIMEOUT: &str = "session_timeout_minutes";
const KEY_THEME: &str = "theme";

/// Operational parameters of the shop, persisted through the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Category names offered when filing articles
    pub categories: Vec<String>,
    /// Stock count at or below which an article counts as low on stock
    pub low_stock_threshold: i64,
    /// Minutes of inactivity before a UI session is closed
    pub session_timeout_minutes: i64,
    /// Appearance theme name (e.g., `"light"`, `"dark"`)
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            low_stock_threshold: 5,
            session_timeout_minutes: 15,
            theme: "light".to_string(),
        }
    }
}

fn parse_or_default<T: std::str::FromStr>(key: &str, raw: &str, default: T) -> T {
    raw.parse().unwrap_or_else(|_| {
        warn!(key, raw, "unparseable stored setting, falling back to default");
        default
    })
}

/// Loads the settings from the store, defaulting every missing key.
pub async fn load_settings(store: &dyn Store) -> Result<Settings> {
    let defaults = Settings::default();

    let categories = match store.get_setting(KEY_CATEGORIES).await? {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|_| {
            warn!(
                key = KEY_CATEGORIES,
                raw, "unparseable stored setting, falling back to default"
            );
            defaults.categories.clone()
        }),
        None => defaults.categories.clone(),
    };

    let low_stock_threshold = match store.get_setting(KEY_LOW_STOCK_THRESHOLD).await? {
        Some(raw) => parse_or_default(KEY_LOW_STOCK_THRESHOLD, &raw, defaults.low_stock_threshold),
        None => defaults.low_stock_threshold,
    };

    let session_timeout_minutes = match store.get_setting(KEY_SESSION_TIMEOUT).await? {
        Some(raw) => parse_or_default(KEY_SESSION_TIMEOUT, &raw, defaults.session_timeout_minutes),
        None => defaults.session_timeout_minutes,
    };

    let theme = match store.get_setting(KEY_THEME).await? {
        Some(raw) => raw,
        None => defaults.theme,
    };

    Ok(Settings {
        categories,
        low_stock_threshold,
        session_timeout_minutes,
        theme,
    })
}

/// Writes every setting back to the store.
pub async fn save_settings(store: &dyn Store, settings: &Settings) -> Result<()> {
    let categories = serde_json::to_string(&settings.categories).map_err(|e| {
        crate::errors::Error::Storage {
            message: format!("failed to serialize category list: {e}"),
        }
    })?;
    store.put_setting(KEY_CATEGORIES, &categories).await?;
    store
        .put_setting(
            KEY_LOW_STOCK_THRESHOLD,
            &settings.low_stock_threshold.to_string(),
        )
        .await?;
    store
        .put_setting(
            KEY_SESSION_TIMEOUT,
            &settings.session_timeout_minutes.to_string(),
        )
        .await?;
    store.put_setting(KEY_THEME, &settings.theme).await?;
    Ok(())
}

/// Seeds the given settings on first run.
///
/// Returns `true` when the store had no settings yet and the defaults were
/// written; an already-configured store is left alone.
pub async fn seed_default_settings(store: &dyn Store, defaults: &Settings) -> Result<bool> {
    if store.get_setting(KEY_CATEGORIES).await?.is_some() {
        return Ok(false);
    }
    save_settings(store, defaults).await?;
    Ok(true)
}
