//! Charge-percentage bounds resolved from profile, thresholds and cutoff

use serde::{Deserialize, Serialize};

use crate::battery::{BatteryProfile, CellThresholds, ControllerCutoff};
use crate::error::{EngineError, Result};

/// Pack voltages that define the charge percentage scale.
///
/// These are display bounds, not safety bounds: safety classification uses
/// absolute per-cell limits (see [`crate::battery::safety`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageBounds {
    /// The 0% point
    pub min: f64,
    /// The 100% point
    pub max: f64,
    /// Nominal pack voltage from the nominal cell threshold
    pub nominal: f64,
}

impl VoltageBounds {
    /// Create bounds directly, checking `max > min`
    pub fn new(min: f64, max: f64, nominal: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite() && nominal.is_finite()) {
            return Err(EngineError::invalid("voltage bounds must be finite"));
        }
        if max <= min {
            return Err(EngineError::invalid(format!(
                "vMax ({:.2}V) must exceed vMin ({:.2}V)",
                max, min
            )));
        }
        Ok(Self { min, max, nominal })
    }

    /// Width of the charge scale in volts
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Whether `voltage` lies on the charge scale (inclusive)
    pub fn contains(&self, voltage: f64) -> bool {
        voltage >= self.min && voltage <= self.max
    }
}

/// Resolve `(vMin, vMax, vNominal)` for a pack.
///
/// `vMax = cells × max`, `vNominal = cells × nominal`, and `vMin` is the
/// controller cutoff when one is set, otherwise `cells × min`.
pub fn resolve_bounds(
    profile: BatteryProfile,
    thresholds: &CellThresholds,
    cutoff: ControllerCutoff,
) -> Result<VoltageBounds> {
    resolve_bounds_for_cells(profile.series_cells(), thresholds, cutoff)
}

/// Same as [`resolve_bounds`] for an arbitrary series cell count
pub fn resolve_bounds_for_cells(
    series_cells: u32,
    thresholds: &CellThresholds,
    cutoff: ControllerCutoff,
) -> Result<VoltageBounds> {
    if series_cells == 0 {
        return Err(EngineError::invalid("series cell count must be positive"));
    }

    let cells = f64::from(series_cells);
    let max = cells * thresholds.max_cell_voltage;
    let nominal = cells * thresholds.nominal_cell_voltage;
    let min = match cutoff.active() {
        Some(cutoff) => cutoff,
        None => cells * thresholds.min_cell_voltage,
    };

    let bounds = VoltageBounds::new(min, max, nominal)?;
    log::trace!(
        "Resolved bounds for {} cells: min={:.3} max={:.3} nominal={:.3}",
        series_cells,
        bounds.min,
        bounds.max,
        bounds.nominal
    );
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_72v_bounds() {
        let bounds = resolve_bounds(
            BatteryProfile::V72,
            &CellThresholds::default(),
            ControllerCutoff::NONE,
        )
        .unwrap();
        assert!(approx(bounds.min, 60.0));
        assert!(approx(bounds.max, 84.0));
        assert!(approx(bounds.nominal, 74.0));
    }

    #[test]
    fn test_cutoff_replaces_min() {
        let thresholds = CellThresholds::new(4.2, 3.7, 3.5);
        let bounds =
            resolve_bounds(BatteryProfile::V48, &thresholds, ControllerCutoff::new(42.0)).unwrap();
        assert!(approx(bounds.min, 42.0));

        let bounds = resolve_bounds(BatteryProfile::V48, &thresholds, ControllerCutoff::NONE).unwrap();
        assert!(approx(bounds.min, 13.0 * 3.5));
    }

    #[test]
    fn test_cutoff_above_max_is_invalid() {
        let err = resolve_bounds(
            BatteryProfile::V36,
            &CellThresholds::default(),
            ControllerCutoff::new(50.0),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_cells_is_invalid() {
        let err = resolve_bounds_for_cells(0, &CellThresholds::default(), ControllerCutoff::NONE)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }
}
