//! Full evaluation of a pack voltage reading

use serde::{Deserialize, Serialize};

use crate::battery::advisory::{build_tip, status_label, status_severity, Severity, Tip};
use crate::battery::bounds::{resolve_bounds, VoltageBounds};
use crate::battery::percentage::{compute_charge, ChargeState, PercentageModel};
use crate::battery::reference::{generate_reference_points, ReferencePoint};
use crate::battery::safety::{classify_safety, per_cell_voltage, AlertLevel, SafetyTier};
use crate::battery::{BatteryProfile, CellThresholds, ControllerCutoff};
use crate::error::Result;

/// Everything the engine needs for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    /// Measured pack voltage; `None` when nothing has been entered
    pub voltage: Option<f64>,
    pub profile: BatteryProfile,
    pub thresholds: CellThresholds,
    pub cutoff: ControllerCutoff,
}

impl EvaluationInput {
    /// Input with default thresholds and no cutoff
    pub fn new(voltage: Option<f64>, profile: BatteryProfile) -> Self {
        Self {
            voltage,
            profile,
            thresholds: CellThresholds::default(),
            cutoff: ControllerCutoff::NONE,
        }
    }

    pub fn with_thresholds(mut self, thresholds: CellThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_cutoff(mut self, cutoff: ControllerCutoff) -> Self {
        self.cutoff = cutoff;
        self
    }
}

/// Result of evaluating a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// The reading that was evaluated, after normalization
    pub voltage: Option<f64>,
    /// Pack voltage divided by the series cell count
    pub cell_voltage: Option<f64>,
    /// Charge percentage in [0, 100]
    pub percent: f64,
    pub charge_state: ChargeState,
    pub status_label: String,
    pub status_severity: Severity,
    /// `None` when there is no reading
    pub safety_tier: Option<SafetyTier>,
    pub alert_level: AlertLevel,
    pub tip: Tip,
    pub reference_points: Vec<ReferencePoint>,
    pub bounds: VoltageBounds,
}

impl EvaluationResult {
    /// Percent formatted for display: whole numbers without decimals,
    /// everything else with one decimal
    pub fn percent_display(&self) -> String {
        format_percent(self.percent)
    }
}

/// Evaluates readings with a fixed percentage model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluator {
    model: PercentageModel,
}

impl Evaluator {
    /// Create an evaluator using `model` for every evaluation
    pub fn new(model: PercentageModel) -> Self {
        Self { model }
    }

    /// Percentage model in use
    pub fn model(&self) -> PercentageModel {
        self.model
    }

    /// Evaluate one input.
    ///
    /// Fails only with [`crate::error::EngineError::InvalidConfiguration`].
    /// Negative or non-finite voltages are treated as "no reading".
    pub fn evaluate(&self, input: &EvaluationInput) -> Result<EvaluationResult> {
        let bounds = resolve_bounds(input.profile, &input.thresholds, input.cutoff)?;
        let cells = input.profile.series_cells();

        let voltage = input.voltage.filter(|v| v.is_finite() && *v >= 0.0);
        if voltage.is_none() && input.voltage.is_some() {
            log::debug!(
                "Ignoring unusable voltage {:?}, evaluating as no reading",
                input.voltage
            );
        }

        let charge = compute_charge(voltage, &bounds, self.model);
        let safety_tier = voltage.map(|v| classify_safety(v, cells, charge.percent));
        let alert_level = safety_tier.map_or(AlertLevel::None, SafetyTier::alert_level);
        let tip = build_tip(safety_tier, voltage, cells);
        let reference_points = generate_reference_points(voltage, bounds.min, bounds.max);

        log::debug!(
            "Evaluated {:?} on {} ({:?}): {:.1}% {:?} {:?}",
            voltage,
            input.profile,
            self.model,
            charge.percent,
            charge.state,
            safety_tier
        );

        Ok(EvaluationResult {
            voltage,
            cell_voltage: voltage.map(|v| per_cell_voltage(v, cells)),
            percent: charge.percent,
            charge_state: charge.state,
            status_label: status_label(charge.state, charge.percent).to_string(),
            status_severity: status_severity(charge.percent),
            safety_tier,
            alert_level,
            tip,
            reference_points,
            bounds,
        })
    }
}

/// Evaluate a reading with the linear percentage model
pub fn evaluate(
    voltage: Option<f64>,
    profile: BatteryProfile,
    thresholds: &CellThresholds,
    cutoff: ControllerCutoff,
) -> Result<EvaluationResult> {
    let input = EvaluationInput {
        voltage,
        profile,
        thresholds: *thresholds,
        cutoff,
    };
    Evaluator::default().evaluate(&input)
}

/// Whole percentages without decimals, others with one decimal
pub fn format_percent(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{}%", percent.round() as i64)
    } else {
        format!("{:.1}%", percent)
    }
}
