//! Configuration module for aggcalc.
//!
//! Handles the settings file and the defaults it feeds into the calculation
//! editor and the binding rules.

mod settings;

pub use settings::{CalcDefaults, LoggingSettings, Settings, SettingsError};
