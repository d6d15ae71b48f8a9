//! Settings management

mod settings;
mod store;
pub mod validation;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use settings::{default_settings_path, CalculatorSettings};
pub use store::{JsonSettingsStore, MemorySettingsStore, SettingsStore};
pub use validation::{FieldValidator, ValidationError};

/// Settings error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the settings file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON for [`CalculatorSettings`]
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A field holds a value outside its accepted range
    #[error("Invalid value for '{0}': {1}")]
    ValidationFailed(String, String),
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::Required(field)
            | ValidationError::NotANumber(field, _)
            | ValidationError::OutOfRange(field, _, _) => field.clone(),
            ValidationError::Custom(_) => "value".to_string(),
        };
        ConfigError::ValidationFailed(field, err.to_string())
    }
}

/// Log verbosity stored in the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Equivalent filter for the `log` facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ConfigError::ValidationFailed(
                "log_level".to_string(),
                format!("unknown level '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_round_trip() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_validation_error_names_field() {
        let err: ConfigError = ValidationError::OutOfRange("cell_min".into(), 2.5, 3.5).into();
        match err {
            ConfigError::ValidationFailed(field, reason) => {
                assert_eq!(field, "cell_min");
                assert!(reason.contains("between 2.5 and 3.5"));
            }
            other => panic!("Unexpected error {:?}", other),
        }
    }
}
