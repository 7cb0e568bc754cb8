//! Core configuration loaded from TOML.
//!
//! # Invariants
//! - Every section is optional; missing keys fall back to defaults.
//! - Loaded configs are validated before they are returned.

use crate::progress::FormatConfig;
use crate::timeline::TimelineConfig;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const MAX_WINDOW_MONTHS: u32 = 120;
const MAX_FRACTION_DIGITS: usize = 6;

/// Errors from reading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Optional logging settings; see [`crate::init_logging`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub format: FormatConfig,
    pub timeline: TimelineConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.format.placeholder.is_empty() {
            return Err(ConfigError::Invalid(
                "format.placeholder must not be empty".to_string(),
            ));
        }
        if self.format.max_fraction_digits > MAX_FRACTION_DIGITS {
            return Err(ConfigError::Invalid(format!(
                "format.max_fraction_digits must be at most {MAX_FRACTION_DIGITS}, got {}",
                self.format.max_fraction_digits
            )));
        }
        for (key, value) in [
            ("timeline.lookback_months", self.timeline.lookback_months),
            ("timeline.lookahead_months", self.timeline.lookahead_months),
        ] {
            if value > MAX_WINDOW_MONTHS {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be at most {MAX_WINDOW_MONTHS}, got {value}"
                )));
            }
        }
        Ok(())
    }
}
