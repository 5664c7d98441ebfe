//! Application settings loaded from `config.toml`.
//!
//! The file carries the HTTP bind address, the sweep thresholds and the cultivar
//! knowledge base used to seed an empty database. Every section is optional and
//! falls back to the defaults below.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server settings
    pub server: ServerSettings,
    /// Thresholds for the cancellation sweeps
    pub sweeps: SweepSettings,
    /// Knowledge-base entries to seed
    pub cultivars: Vec<CultivarConfig>,
}

/// `[server]` section
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the HTTP listener binds to
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// `[sweeps]` section
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    /// Pending orders older than this many hours are cancelled
    pub stale_pending_hours: i64,
    /// Orders are cancelled once the harvest date is more than this many days past
    pub harvest_grace_days: i64,
}

/// Upper bound for `stale_pending_hours` (one year).
pub const MAX_STALE_PENDING_HOURS: i64 = 24 * 365;
/// Upper bound for `harvest_grace_days`.
pub const MAX_HARVEST_GRACE_DAYS: i64 = 365;

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            stale_pending_hours: 48,
            harvest_grace_days: 7,
        }
    }
}

impl SweepSettings {
    /// Checks both thresholds are positive and within range.
    ///
    /// # Errors
    /// Returns `Config` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_STALE_PENDING_HOURS).contains(&self.stale_pending_hours) {
            return Err(Error::Config {
                message: format!(
                    "sweeps.stale_pending_hours must be between 1 and {MAX_STALE_PENDING_HOURS}, got {}",
                    self.stale_pending_hours
                ),
            });
        }
        if !(1..=MAX_HARVEST_GRACE_DAYS).contains(&self.harvest_grace_days) {
            return Err(Error::Config {
                message: format!(
                    "sweeps.harvest_grace_days must be between 1 and {MAX_HARVEST_GRACE_DAYS}, got {}",
                    self.harvest_grace_days
                ),
            });
        }
        Ok(())
    }
}

/// Configuration for a single cultivar
#[derive(Debug, Deserialize, Clone)]
pub struct CultivarConfig {
    /// Common name
    pub name: String,
    /// Botanical name
    #[serde(default)]
    pub scientific_name: Option<String>,
    /// Region of origin
    #[serde(default)]
    pub origin: Option<String>,
    /// Knowledge-base text
    pub description: String,
    /// Typical days from planting to harvest
    #[serde(default)]
    pub days_to_harvest: Option<i32>,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A cultivar entry is missing a required field
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses settings from TOML text.
///
/// # Errors
/// Returns `Config` for invalid TOML or out-of-range sweep thresholds.
pub fn parse_config(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.sweeps.validate()?;
    Ok(settings)
}

/// Loads settings from `./config.toml`, using the defaults when the file is absent.
pub fn load_default_config() -> Result<Settings> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::warn!("config.toml not found, using default settings");
        return Ok(Settings::default());
    }
    load_config(path)
}
