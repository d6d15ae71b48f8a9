use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::battery::thresholds::{
    DEFAULT_MAX_CELL_VOLTAGE, DEFAULT_MIN_CELL_VOLTAGE, DEFAULT_NOMINAL_CELL_VOLTAGE,
    MAX_CELL_RANGE, MIN_CELL_RANGE, NOMINAL_CELL_RANGE,
};
use crate::battery::{BatteryProfile, CellThresholds, ControllerCutoff, PercentageModel};
use crate::config::{ConfigError, LogLevel};

/// Persisted calculator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    /// Selected battery pack
    pub profile: BatteryProfile,

    /// Fully charged cell voltage
    pub cell_max: f64,

    /// Nominal cell voltage
    pub cell_nominal: f64,

    /// Empty cell voltage
    pub cell_min: f64,

    /// Controller low-voltage cutoff, 0 when not set
    pub controller_cutoff: f64,

    /// Percentage curve
    pub percentage_model: PercentageModel,

    /// Whether the advanced settings panel is expanded
    pub advanced_open: bool,

    /// Log level for the terminal front-end
    pub log_level: LogLevel,

    /// Last voltage text entered per profile key
    pub last_voltages: BTreeMap<u32, String>,

    /// Path to save settings
    #[serde(skip)]
    pub settings_path: PathBuf,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            profile: BatteryProfile::default(),
            cell_max: DEFAULT_MAX_CELL_VOLTAGE,
            cell_nominal: DEFAULT_NOMINAL_CELL_VOLTAGE,
            cell_min: DEFAULT_MIN_CELL_VOLTAGE,
            controller_cutoff: 0.0,
            percentage_model: PercentageModel::default(),
            advanced_open: false,
            log_level: LogLevel::default(),
            last_voltages: BTreeMap::new(),
            settings_path: default_settings_path(),
        }
    }
}

impl CalculatorSettings {
    /// Cell thresholds as configured
    pub fn thresholds(&self) -> CellThresholds {
        CellThresholds::new(self.cell_max, self.cell_nominal, self.cell_min)
    }

    /// Controller cutoff as configured
    pub fn cutoff(&self) -> ControllerCutoff {
        ControllerCutoff::new(self.controller_cutoff)
    }

    /// Last voltage text entered for `profile`
    pub fn last_voltage(&self, profile: BatteryProfile) -> Option<&str> {
        self.last_voltages.get(&profile.key()).map(String::as_str)
    }

    /// Remember the voltage text entered for `profile`; empty text is ignored
    pub fn remember_voltage(&mut self, profile: BatteryProfile, raw: &str) {
        let raw = raw.trim();
        if !raw.is_empty() {
            self.last_voltages.insert(profile.key(), raw.to_string());
        }
    }

    /// Check every field; the first failure is reported
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("cell_max", self.cell_max, MAX_CELL_RANGE.start(), MAX_CELL_RANGE.end())?;
        check_range(
            "cell_nominal",
            self.cell_nominal,
            NOMINAL_CELL_RANGE.start(),
            NOMINAL_CELL_RANGE.end(),
        )?;
        check_range("cell_min", self.cell_min, MIN_CELL_RANGE.start(), MIN_CELL_RANGE.end())?;

        if !self.controller_cutoff.is_finite() || self.controller_cutoff < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "controller_cutoff".to_string(),
                format!("{} must be 0 or a positive voltage", self.controller_cutoff),
            ));
        }
        Ok(())
    }

    /// Reset out-of-range thresholds to their defaults and a negative cutoff to 0
    pub fn sanitized(mut self) -> Self {
        let thresholds = self.thresholds().sanitized();
        if thresholds != self.thresholds() {
            log::warn!(
                "Stored cell thresholds {:?} out of range, using {:?}",
                self.thresholds(),
                thresholds
            );
        }
        self.cell_max = thresholds.max_cell_voltage;
        self.cell_nominal = thresholds.nominal_cell_voltage;
        self.cell_min = thresholds.min_cell_voltage;
        self.controller_cutoff = self.cutoff().volts();
        self
    }

    /// Load configuration from a file. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self {
                settings_path: path.to_path_buf(),
                ..Self::default()
            });
        }

        let json = fs::read_to_string(path)?;
        let mut config: CalculatorSettings = serde_json::from_str(&json)?;
        config.settings_path = path.to_path_buf();
        log::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories as needed
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Load from [`default_settings_path`]
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&default_settings_path())
    }

    /// Save to [`CalculatorSettings::settings_path`]
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&self.settings_path)
    }
}

fn check_range(field: &str, value: f64, min: &f64, max: &f64) -> Result<(), ConfigError> {
    if value >= *min && value <= *max {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(
            field.to_string(),
            format!("{} is outside {}..={}", value, min, max),
        ))
    }
}

/// Get the default settings path
pub fn default_settings_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|config_dir| config_dir.join("scootvolt").join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("settings.json")) // Fallback to current directory
}
