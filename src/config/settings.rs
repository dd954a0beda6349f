//! TOML-based configuration for aggcalc.
//!
//! Example configuration:
//! ```toml
//! [calc]
//! moving_aggregate = "Average"
//! moving_previous = 2
//! moving_next = 2
//! moving_include_current = true
//! running_total_aggregate = "Sum"
//! default_n = "1"
//!
//! [logging]
//! filter = "aggcalc=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::formula;

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
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Defaults for fresh calculation variants and N parameters.
    pub calc: CalcDefaults,

    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Defaults applied when a calculation kind is selected or N is missing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalcDefaults {
    /// Inner aggregate of a new moving calculation.
    pub moving_aggregate: String,

    /// Values before the current one in a new moving window.
    pub moving_previous: i32,

    /// Values after the current one in a new moving window.
    pub moving_next: i32,

    /// Whether a new moving window includes the current value.
    pub moving_include_current: bool,

    /// Inner aggregate of a new running total.
    pub running_total_aggregate: String,

    /// N used when an Nth/Pth formula has none, or an invalid one.
    pub default_n: String,
}

impl Default for CalcDefaults {
    fn default() -> Self {
        Self {
            moving_aggregate: "Average".to_string(),
            moving_previous: 2,
            moving_next: 2,
            moving_include_current: true,
            running_total_aggregate: "Sum".to_string(),
            default_n: "1".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "aggcalc=info".to_string(),
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
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `AGGCALC_CONFIG`
    /// 2. `./aggcalc.toml`
    /// 3. `~/.config/aggcalc/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("AGGCALC_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("aggcalc.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("aggcalc").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Check values that TOML types alone cannot enforce.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let calc = &self.calc;

        if calc.moving_previous < 0 || calc.moving_next < 0 {
            return Err(SettingsError::InvalidConfig(format!(
                "moving window must be non-negative (previous = {}, next = {})",
                calc.moving_previous, calc.moving_next
            )));
        }

        for (key, token) in [
            ("moving_aggregate", &calc.moving_aggregate),
            ("running_total_aggregate", &calc.running_total_aggregate),
        ] {
            let (_, report) = formula::codec::decode_with_report(token);
            if report.unknown_formula {
                return Err(SettingsError::InvalidConfig(format!(
                    "{} is not a known aggregate: {}",
                    key, token
                )));
            }
        }

        match calc.default_n.parse::<u32>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(SettingsError::InvalidConfig(format!(
                "default_n must be a positive integer: {}",
                calc.default_n
            ))),
        }
    }
}
