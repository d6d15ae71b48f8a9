//! Stateful calculator session
//!
//! Holds the voltage text and the settings a user is editing, re-evaluates
//! after every change and persists the settings through a [`SettingsStore`].

use crate::battery::thresholds::{
    DEFAULT_MAX_CELL_VOLTAGE, DEFAULT_MIN_CELL_VOLTAGE, DEFAULT_NOMINAL_CELL_VOLTAGE,
};
use crate::battery::{
    BatteryProfile, CellThresholds, EvaluationInput, EvaluationResult, Evaluator, PercentageModel,
};
use crate::config::validation::{
    cutoff_validator, max_cell_validator, min_cell_validator, nominal_cell_validator,
};
use crate::config::{CalculatorSettings, FieldValidator, SettingsStore};
use crate::error::ErrorContext;
use crate::errors::{AppError, Result};
use crate::logging::{log_error, log_error_with_recovery, PerformanceLogger};
use crate::reading::{check_manual_entry, parse_optional_voltage, voltage_placeholder, EntryVerdict};

/// Editable settings fields checked when they lose focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    MaxCell,
    NominalCell,
    MinCell,
    ControllerCutoff,
}

impl SettingsField {
    fn validator(self) -> FieldValidator {
        match self {
            SettingsField::MaxCell => max_cell_validator(),
            SettingsField::NominalCell => nominal_cell_validator(),
            SettingsField::MinCell => min_cell_validator(),
            SettingsField::ControllerCutoff => cutoff_validator(),
        }
    }

    /// Value the field falls back to when its input is rejected
    pub fn default_value(self) -> f64 {
        match self {
            SettingsField::MaxCell => DEFAULT_MAX_CELL_VOLTAGE,
            SettingsField::NominalCell => DEFAULT_NOMINAL_CELL_VOLTAGE,
            SettingsField::MinCell => DEFAULT_MIN_CELL_VOLTAGE,
            SettingsField::ControllerCutoff => 0.0,
        }
    }
}

/// A calculator session backed by a settings store
pub struct Calculator<S: SettingsStore> {
    store: S,
    settings: CalculatorSettings,
    evaluator: Evaluator,
    voltage_text: String,
    /// Replaces the regular placeholder after an entry was cleared
    placeholder_notice: Option<&'static str>,
    result: Option<EvaluationResult>,
}

impl<S: SettingsStore> Calculator<S> {
    /// Start a session with the stored settings. Unreadable settings are
    /// logged and replaced by the defaults.
    pub fn new(store: S) -> Self {
        let settings = match store.load() {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                let ctx = ErrorContext::new("Calculator", "load_settings")
                    .with_user_message("Saved settings could not be read");
                log_error_with_recovery(&e, &ctx, "using default settings");
                CalculatorSettings::default()
            }
        };
        log::info!(
            "Calculator started with {} profile, {:?} percentage model",
            settings.profile,
            settings.percentage_model
        );

        let mut calculator = Self {
            store,
            evaluator: Evaluator::new(settings.percentage_model),
            settings,
            voltage_text: String::new(),
            placeholder_notice: None,
            result: None,
        };
        if let Err(e) = calculator.refresh() {
            log::warn!("Stored settings do not evaluate: {}", e);
        }
        calculator
    }

    /// Current settings
    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }

    /// Selected profile
    pub fn profile(&self) -> BatteryProfile {
        self.settings.profile
    }

    /// Voltage text as entered
    pub fn voltage_text(&self) -> &str {
        &self.voltage_text
    }

    /// Latest successful evaluation, `None` after a failed one
    pub fn result(&self) -> Option<&EvaluationResult> {
        self.result.as_ref()
    }

    /// The backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Placeholder for the voltage field
    pub fn placeholder(&self) -> String {
        match self.placeholder_notice {
            Some(notice) => notice.to_string(),
            None => voltage_placeholder(
                self.settings.profile,
                self.settings.last_voltage(self.settings.profile),
            ),
        }
    }

    /// Replace the voltage text and re-evaluate
    pub fn set_voltage_text(&mut self, raw: &str) -> Result<&EvaluationResult> {
        self.voltage_text = raw.trim().to_string();
        self.placeholder_notice = None;

        if parse_optional_voltage(&self.voltage_text).map_or(false, |v| v > 0.0) {
            let profile = self.settings.profile;
            self.settings.remember_voltage(profile, &self.voltage_text);
        }
        self.persist();
        self.refresh()
    }

    /// Switch profile. The voltage text is cleared since it belonged to the
    /// previous pack.
    pub fn select_profile(&mut self, profile: BatteryProfile) -> Result<&EvaluationResult> {
        if profile != self.settings.profile {
            log::info!("Switching profile {} -> {}", self.settings.profile, profile);
        }
        self.settings.profile = profile;
        self.voltage_text.clear();
        self.placeholder_notice = None;
        self.persist();
        self.refresh()
    }

    /// Replace all three cell thresholds
    pub fn set_thresholds(&mut self, thresholds: CellThresholds) -> Result<&EvaluationResult> {
        self.settings.cell_max = thresholds.max_cell_voltage;
        self.settings.cell_nominal = thresholds.nominal_cell_voltage;
        self.settings.cell_min = thresholds.min_cell_voltage;
        self.persist();
        self.refresh()
    }

    /// Set the controller cutoff; 0 clears it
    pub fn set_cutoff(&mut self, volts: f64) -> Result<&EvaluationResult> {
        self.settings.controller_cutoff = volts;
        self.persist();
        self.refresh()
    }

    /// Change the percentage curve
    pub fn set_percentage_model(&mut self, model: PercentageModel) -> Result<&EvaluationResult> {
        self.settings.percentage_model = model;
        self.evaluator = Evaluator::new(model);
        self.persist();
        self.refresh()
    }

    /// Remember whether the advanced settings are expanded
    pub fn set_advanced_open(&mut self, open: bool) {
        self.settings.advanced_open = open;
        self.persist();
    }

    /// Commit a settings field when it loses focus. Rejected input resets the
    /// field to its default. Returns the value applied.
    pub fn commit_field(&mut self, field: SettingsField, raw: &str) -> Result<f64> {
        let value = match field.validator().validate(raw) {
            Ok(Some(value)) => value,
            Ok(None) => field.default_value(),
            Err(e) => {
                log::warn!("Rejected {:?} input '{}': {}", field, raw.trim(), e);
                field.default_value()
            }
        };

        match field {
            SettingsField::MaxCell => self.settings.cell_max = value,
            SettingsField::NominalCell => self.settings.cell_nominal = value,
            SettingsField::MinCell => self.settings.cell_min = value,
            SettingsField::ControllerCutoff => self.settings.controller_cutoff = value,
        }
        self.persist();
        self.refresh()?;
        Ok(value)
    }

    /// Check the voltage text when the field loses focus. Negative entries and
    /// entries above 200 V are cleared.
    pub fn commit_voltage(&mut self) -> EntryVerdict {
        let verdict = check_manual_entry(&self.voltage_text);
        if let EntryVerdict::Clear { placeholder } = verdict {
            log::info!("Clearing voltage entry '{}': {}", self.voltage_text, placeholder);
            self.voltage_text.clear();
            self.placeholder_notice = Some(placeholder);
            if let Err(e) = self.refresh() {
                log::warn!("Evaluation after clearing the entry failed: {}", e);
            }
        }
        verdict
    }

    /// Evaluate the current voltage text with the current settings
    pub fn refresh(&mut self) -> Result<&EvaluationResult> {
        let perf = PerformanceLogger::new("Calculator", "evaluate");
        let input = EvaluationInput::new(
            parse_optional_voltage(&self.voltage_text),
            self.settings.profile,
        )
        .with_thresholds(self.settings.thresholds())
        .with_cutoff(self.settings.cutoff());

        match self.evaluator.evaluate(&input) {
            Ok(result) => {
                perf.finish_with_context(&format!("{} pack", self.settings.profile));
                Ok(&*self.result.insert(result))
            }
            Err(e) => {
                self.result = None;
                let ctx = ErrorContext::new("Calculator", "evaluate")
                    .with_metadata("profile", self.settings.profile.to_string())
                    .with_metadata("cutoff", self.settings.controller_cutoff.to_string());
                log_error(&e, &ctx);
                Err(AppError::Engine(e))
            }
        }
    }

    /// Save the settings; failures are logged and the session continues
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            let ctx = ErrorContext::new("Calculator", "save_settings");
            log_error_with_recovery(&e, &ctx, "continuing with unsaved settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::SafetyTier;
    use crate::config::MemorySettingsStore;

    fn calculator() -> Calculator<MemorySettingsStore> {
        Calculator::new(MemorySettingsStore::default())
    }

    #[test]
    fn test_starts_without_reading() {
        let calc = calculator();
        let result = calc.result().unwrap();
        assert_eq!(result.voltage, None);
        assert_eq!(result.percent, 0.0);
        assert_eq!(calc.placeholder(), "e.g. 72V");
    }

    #[test]
    fn test_voltage_entry_evaluates_and_saves() {
        let mut calc = calculator();
        let percent = calc.set_voltage_text("72").unwrap().percent;
        assert!((percent - 50.0).abs() < 1e-9);

        let saved = calc.store().snapshot().unwrap();
        assert_eq!(saved.last_voltage(BatteryProfile::V72), Some("72"));
    }

    #[test]
    fn test_profile_switch_clears_voltage() {
        let mut calc = calculator();
        calc.set_voltage_text("78.5").unwrap();
        let result = calc.select_profile(BatteryProfile::V48).unwrap();
        assert_eq!(result.voltage, None);
        assert_eq!(calc.voltage_text(), "");
        assert_eq!(calc.placeholder(), "e.g. 48V");

        calc.select_profile(BatteryProfile::V72).unwrap();
        assert_eq!(calc.placeholder(), "e.g. 78.5V");
    }

    #[test]
    fn test_commit_field_resets_rejected_input() {
        let mut calc = calculator();
        assert_eq!(calc.commit_field(SettingsField::MaxCell, "9").unwrap(), 4.2);
        assert_eq!(calc.commit_field(SettingsField::MinCell, "2.8").unwrap(), 2.8);
        assert_eq!(calc.commit_field(SettingsField::ControllerCutoff, "-5").unwrap(), 0.0);
        assert_eq!(calc.settings().cell_min, 2.8);
    }

    #[test]
    fn test_commit_voltage_clears_out_of_range() {
        let mut calc = calculator();
        calc.set_voltage_text("250").unwrap();
        assert!(matches!(calc.commit_voltage(), EntryVerdict::Clear { .. }));
        assert_eq!(calc.voltage_text(), "");
        assert_eq!(calc.placeholder(), "Voltage too high (>200V)");
        assert_eq!(calc.result().unwrap().voltage, None);
    }

    #[test]
    fn test_invalid_cutoff_leaves_no_result() {
        let mut calc = calculator();
        calc.set_voltage_text("80").unwrap();
        assert!(calc.set_cutoff(90.0).is_err());
        assert!(calc.result().is_none());

        let result = calc.set_cutoff(66.0).unwrap();
        assert_eq!(result.bounds.min, 66.0);
        assert_eq!(result.safety_tier.map(|t| t.is_hazard()), Some(false));
        assert!(!matches!(result.safety_tier, Some(SafetyTier::Unknown)));
    }
}
