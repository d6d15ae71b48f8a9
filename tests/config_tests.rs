//! Integration tests for the settings store

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use scootvolt::config::{
    CalculatorSettings, ConfigError, JsonSettingsStore, LogLevel, SettingsStore,
};
use scootvolt::{BatteryProfile, Calculator, PercentageModel};

/// Settings survive a save/load cycle
#[test]
fn test_config_save_load() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("settings.json");

    let mut config = CalculatorSettings {
        profile: BatteryProfile::V52,
        cell_max: 4.15,
        cell_min: 3.2,
        controller_cutoff: 45.0,
        percentage_model: PercentageModel::Corrected,
        advanced_open: true,
        log_level: LogLevel::Debug,
        ..CalculatorSettings::default()
    };
    config.remember_voltage(BatteryProfile::V52, "55.4");

    config
        .save_to_path(&config_path)
        .expect("Failed to save configuration");
    let loaded =
        CalculatorSettings::load_from_path(&config_path).expect("Failed to load configuration");

    assert_eq!(loaded.profile, BatteryProfile::V52);
    assert_eq!(loaded.cell_max, 4.15);
    assert_eq!(loaded.cell_min, 3.2);
    assert_eq!(loaded.controller_cutoff, 45.0);
    assert_eq!(loaded.percentage_model, PercentageModel::Corrected);
    assert!(loaded.advanced_open);
    assert_eq!(loaded.log_level, LogLevel::Debug);
    assert_eq!(loaded.last_voltage(BatteryProfile::V52), Some("55.4"));
}

/// Default settings are used when the file doesn't exist
#[test]
fn test_config_default_when_missing() {
    let non_existent_path = PathBuf::from("/non/existent/path/settings.json");

    let config = CalculatorSettings::load_from_path(&non_existent_path)
        .expect("Loading from non-existent file should return default settings");
    let default_config = CalculatorSettings::default();
    assert_eq!(config.profile, default_config.profile);
    assert_eq!(config.thresholds(), default_config.thresholds());
    assert_eq!(config.log_level, default_config.log_level);
}

/// The file is stored as JSON with the profile as its voltage key
#[test]
fn test_config_file_format() {
    let temp_dir = tempdir().unwrap();
    let store = JsonSettingsStore::new(temp_dir.path().join("settings.json"));
    store
        .save(&CalculatorSettings {
            profile: BatteryProfile::V48,
            ..CalculatorSettings::default()
        })
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(json["profile"], 48);
    assert_eq!(json["percentage_model"], "linear");
    assert_eq!(json["log_level"], "warn");
    assert!(json.get("settings_path").is_none());
}

/// Partial files fill the missing fields with defaults
#[test]
fn test_config_partial_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, r#"{ "profile": 36, "controller_cutoff": 31.5 }"#).unwrap();

    let config = CalculatorSettings::load_from_path(&path).unwrap();
    assert_eq!(config.profile, BatteryProfile::V36);
    assert_eq!(config.controller_cutoff, 31.5);
    assert_eq!(config.cell_max, 4.2);
}

/// An unknown profile key is a serialization error, not a silent fallback
#[test]
fn test_config_unknown_profile() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, r#"{ "profile": 99 }"#).unwrap();

    let result = CalculatorSettings::load_from_path(&path);
    assert!(matches!(result, Err(ConfigError::Serialization(_))));
}

/// Out-of-range values are reported by validate and repaired by sanitized
#[test]
fn test_config_validation() {
    let config = CalculatorSettings {
        cell_nominal: 4.8,
        controller_cutoff: -3.0,
        ..CalculatorSettings::default()
    };

    match config.validate() {
        Err(ConfigError::ValidationFailed(field, _)) => assert_eq!(field, "cell_nominal"),
        other => panic!("Expected validation failure, got {:?}", other),
    }

    let repaired = config.sanitized();
    assert_eq!(repaired.cell_nominal, 3.7);
    assert_eq!(repaired.controller_cutoff, 0.0);
    assert!(repaired.validate().is_ok());
}

/// A corrupt settings file does not stop the calculator from starting
#[test]
fn test_calculator_survives_corrupt_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, "this is not json").unwrap();

    let mut calculator = Calculator::new(JsonSettingsStore::new(&path));
    assert_eq!(calculator.profile(), BatteryProfile::V72);

    calculator.set_voltage_text("78").unwrap();
    let reloaded = JsonSettingsStore::new(&path).load().unwrap();
    assert_eq!(reloaded.last_voltage(BatteryProfile::V72), Some("78"));
}
