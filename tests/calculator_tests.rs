//! Integration tests for the calculator session with a mocked settings store

use mockall::mock;
use mockall::predicate::function;
use pretty_assertions::assert_eq;

use scootvolt::battery::{ChargeBand, SafetyTier};
use scootvolt::config::{CalculatorSettings, ConfigError, SettingsStore};
use scootvolt::reading::EntryVerdict;
use scootvolt::{AppError, BatteryProfile, Calculator, CellThresholds, SettingsField};

mock! {
    pub Store {}

    impl SettingsStore for Store {
        fn load(&self) -> Result<CalculatorSettings, ConfigError>;
        fn save(&self, config: &CalculatorSettings) -> Result<(), ConfigError>;
    }
}

fn store_with(settings: CalculatorSettings) -> MockStore {
    let mut store = MockStore::new();
    store.expect_load().return_once(move || Ok(settings));
    store
}

#[test]
fn test_loads_stored_profile() {
    let mut store = store_with(CalculatorSettings {
        profile: BatteryProfile::V48,
        ..CalculatorSettings::default()
    });
    store.expect_save().times(1).returning(|_| Ok(()));

    let mut calculator = Calculator::new(store);
    assert_eq!(calculator.profile(), BatteryProfile::V48);

    let result = calculator.set_voltage_text("54.6").unwrap();
    assert_eq!(result.percent, 100.0);
    assert_eq!(result.safety_tier, Some(SafetyTier::Normal(ChargeBand::Full)));
}

#[test]
fn test_load_failure_falls_back_to_defaults() {
    let mut store = MockStore::new();
    store.expect_load().return_once(|| {
        Err(ConfigError::ValidationFailed(
            "profile".to_string(),
            "unreadable".to_string(),
        ))
    });

    let calculator = Calculator::new(store);
    assert_eq!(calculator.settings().profile, BatteryProfile::V72);
    assert_eq!(calculator.settings().thresholds(), CellThresholds::default());
}

#[test]
fn test_out_of_range_stored_thresholds_are_repaired() {
    let store = store_with(CalculatorSettings {
        cell_max: 7.0,
        cell_min: 1.0,
        controller_cutoff: -10.0,
        ..CalculatorSettings::default()
    });

    let calculator = Calculator::new(store);
    assert_eq!(calculator.settings().thresholds(), CellThresholds::default());
    assert_eq!(calculator.settings().controller_cutoff, 0.0);
}

#[test]
fn test_every_change_is_saved() {
    let mut store = store_with(CalculatorSettings::default());
    store
        .expect_save()
        .with(function(|c: &CalculatorSettings| {
            c.profile == BatteryProfile::V60 && c.controller_cutoff == 0.0
        }))
        .times(1)
        .returning(|_| Ok(()));
    store
        .expect_save()
        .with(function(|c: &CalculatorSettings| c.controller_cutoff == 52.0))
        .times(1)
        .returning(|_| Ok(()));

    let mut calculator = Calculator::new(store);
    calculator.select_profile(BatteryProfile::V60).unwrap();
    let result = calculator
        .commit_field(SettingsField::ControllerCutoff, "52")
        .unwrap();
    assert_eq!(result, 52.0);
}

#[test]
fn test_save_failure_does_not_block_evaluation() {
    let mut store = store_with(CalculatorSettings::default());
    store.expect_save().returning(|_| {
        Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    });

    let mut calculator = Calculator::new(store);
    let result = calculator.set_voltage_text("91").unwrap();
    assert_eq!(result.safety_tier, Some(SafetyTier::FireRisk));
}

#[test]
fn test_invalid_cutoff_surfaces_error() {
    let mut store = store_with(CalculatorSettings::default());
    store.expect_save().returning(|_| Ok(()));

    let mut calculator = Calculator::new(store);
    calculator.set_voltage_text("80").unwrap();

    let err = calculator.set_cutoff(84.0).unwrap_err();
    assert!(matches!(err, AppError::Engine(_)));
    assert!(calculator.result().is_none());
}

#[test]
fn test_negative_entry_is_cleared_on_commit() {
    let mut store = store_with(CalculatorSettings::default());
    store.expect_save().returning(|_| Ok(()));

    let mut calculator = Calculator::new(store);
    calculator.set_voltage_text("-12").unwrap();
    assert_eq!(
        calculator.commit_voltage(),
        EntryVerdict::Clear {
            placeholder: "Enter positive voltage"
        }
    );
    assert_eq!(calculator.placeholder(), "Enter positive voltage");

    calculator.set_voltage_text("70").unwrap();
    assert_eq!(calculator.placeholder(), "e.g. 70V");
}
