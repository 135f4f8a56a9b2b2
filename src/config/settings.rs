//! Application settings loaded from stockroom.toml and the environment.
//!
//! The settings file is optional. Every field has a default, and a
//! `DATABASE_URL` environment variable (usually from a `.env` file) wins
//! over whatever the file says.

use std::path::Path;

use serde::Deserialize;

use crate::errors::{Error, Result};

/// Default location of the settings file.
pub const DEFAULT_SETTINGS_PATH: &str = "stockroom.toml";

/// Top-level structure of the stockroom.toml file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Database connection settings
    pub database: DatabaseSettings,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection URL passed to `SeaORM`
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://data/stockroom.sqlite".to_string(),
        }
    }
}

impl AppSettings {
    /// Applies environment overrides on top of the loaded values.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
        self
    }
}

/// Loads the `.env` file if one exists so its variables are visible to the
/// environment overrides. Call once at startup.
pub fn load_environment() {
    dotenvy::dotenv().ok();
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load<P: AsRef<Path>>(path: P) -> Result<AppSettings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read settings file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings file: {e}"),
    })
}

/// Loads settings from the default location, falling back to the defaults
/// when no file exists, then applies environment overrides.
pub fn load_default() -> Result<AppSettings> {
    let settings = if Path::new(DEFAULT_SETTINGS_PATH).exists() {
        load(DEFAULT_SETTINGS_PATH)?
    } else {
        AppSettings::default()
    };
    Ok(settings.with_env_overrides())
}
