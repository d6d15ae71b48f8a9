//! User-adjustable per-cell voltage thresholds and the controller cutoff

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Default fully charged cell voltage
pub const DEFAULT_MAX_CELL_VOLTAGE: f64 = 4.2;
/// Default nominal cell voltage
pub const DEFAULT_NOMINAL_CELL_VOLTAGE: f64 = 3.7;
/// Default empty cell voltage
pub const DEFAULT_MIN_CELL_VOLTAGE: f64 = 3.0;

/// Accepted range for the maximum cell voltage
pub const MAX_CELL_RANGE: RangeInclusive<f64> = 3.0..=5.0;
/// Accepted range for the nominal cell voltage
pub const NOMINAL_CELL_RANGE: RangeInclusive<f64> = 3.0..=4.5;
/// Accepted range for the minimum cell voltage
pub const MIN_CELL_RANGE: RangeInclusive<f64> = 2.5..=3.5;

/// Per-cell voltage thresholds that define the charge percentage scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellThresholds {
    /// Cell voltage considered 100%
    pub max_cell_voltage: f64,
    /// Nominal cell voltage
    pub nominal_cell_voltage: f64,
    /// Cell voltage considered 0% (unless a controller cutoff is set)
    pub min_cell_voltage: f64,
}

impl Default for CellThresholds {
    fn default() -> Self {
        Self {
            max_cell_voltage: DEFAULT_MAX_CELL_VOLTAGE,
            nominal_cell_voltage: DEFAULT_NOMINAL_CELL_VOLTAGE,
            min_cell_voltage: DEFAULT_MIN_CELL_VOLTAGE,
        }
    }
}

impl CellThresholds {
    /// Create thresholds without range checking
    pub fn new(max_cell_voltage: f64, nominal_cell_voltage: f64, min_cell_voltage: f64) -> Self {
        Self {
            max_cell_voltage,
            nominal_cell_voltage,
            min_cell_voltage,
        }
    }

    /// Whether every threshold lies in its physically sane range
    pub fn is_within_limits(&self) -> bool {
        MAX_CELL_RANGE.contains(&self.max_cell_voltage)
            && NOMINAL_CELL_RANGE.contains(&self.nominal_cell_voltage)
            && MIN_CELL_RANGE.contains(&self.min_cell_voltage)
    }

    /// Reset each out-of-range (or non-finite) threshold to its default
    pub fn sanitized(self) -> Self {
        Self {
            max_cell_voltage: within_or_default(
                self.max_cell_voltage,
                &MAX_CELL_RANGE,
                DEFAULT_MAX_CELL_VOLTAGE,
            ),
            nominal_cell_voltage: within_or_default(
                self.nominal_cell_voltage,
                &NOMINAL_CELL_RANGE,
                DEFAULT_NOMINAL_CELL_VOLTAGE,
            ),
            min_cell_voltage: within_or_default(
                self.min_cell_voltage,
                &MIN_CELL_RANGE,
                DEFAULT_MIN_CELL_VOLTAGE,
            ),
        }
    }
}

fn within_or_default(value: f64, range: &RangeInclusive<f64>, default: f64) -> f64 {
    if range.contains(&value) {
        value
    } else {
        log::debug!(
            "Cell threshold {} outside {:?}, using default {}",
            value,
            range,
            default
        );
        default
    }
}

/// Low-voltage disconnect enforced by the scooter controller.
///
/// A positive cutoff becomes the 0% point instead of `cells × min_cell_voltage`.
/// Zero means "not set".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControllerCutoff(f64);

impl ControllerCutoff {
    /// No cutoff configured
    pub const NONE: ControllerCutoff = ControllerCutoff(0.0);

    /// Create a cutoff; negative or non-finite values become "not set"
    pub fn new(volts: f64) -> Self {
        if volts.is_finite() && volts > 0.0 {
            Self(volts)
        } else {
            Self::NONE
        }
    }

    /// Raw cutoff voltage (0 when not set)
    pub fn volts(self) -> f64 {
        self.0
    }

    /// The cutoff voltage if one is configured
    pub fn active(self) -> Option<f64> {
        (self.0 > 0.0).then_some(self.0)
    }
}

impl From<f64> for ControllerCutoff {
    fn from(volts: f64) -> Self {
        Self::new(volts)
    }
}
