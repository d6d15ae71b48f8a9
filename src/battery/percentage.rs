//! Voltage to charge-percentage conversion

use serde::{Deserialize, Serialize};

use crate::battery::VoltageBounds;

/// Fraction of the voltage range where the corrected curve bends
const CORRECTED_KNEE_RATIO: f64 = 0.5;
/// Percentage reached at the knee of the corrected curve
const CORRECTED_KNEE_PERCENT: f64 = 40.0;

/// How a voltage inside the bounds is mapped to a percentage.
///
/// Pick one model per evaluation. Neither is a chemistry discharge curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageModel {
    /// Straight line from vMin (0%) to vMax (100%)
    #[default]
    Linear,
    /// Two line segments meeting at the middle of the voltage range, which maps
    /// to 40%: shallower below the knee, steeper above it
    Corrected,
}

impl PercentageModel {
    /// Map a position on the voltage range (0.0 to 1.0) to a percentage
    fn percent_for_ratio(self, ratio: f64) -> f64 {
        match self {
            Self::Linear => ratio * 100.0,
            Self::Corrected => {
                if ratio <= CORRECTED_KNEE_RATIO {
                    ratio / CORRECTED_KNEE_RATIO * CORRECTED_KNEE_PERCENT
                } else {
                    CORRECTED_KNEE_PERCENT
                        + (ratio - CORRECTED_KNEE_RATIO) / (1.0 - CORRECTED_KNEE_RATIO)
                            * (100.0 - CORRECTED_KNEE_PERCENT)
                }
            }
        }
    }
}

/// Where the reading sits relative to the charge bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeState {
    /// No usable voltage was supplied
    NoReading,
    /// Voltage is above vMax
    AboveFull,
    /// Voltage is below vMin
    BelowMinimum,
    /// Voltage is between vMin and vMax inclusive
    InRange,
}

/// Computed charge level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeReading {
    /// Charge percentage in [0, 100]
    pub percent: f64,
    /// Position relative to the bounds
    pub state: ChargeState,
}

impl ChargeReading {
    /// Whether the voltage was between vMin and vMax
    pub fn in_range(&self) -> bool {
        self.state == ChargeState::InRange
    }
}

/// Compute the charge percentage for an optional voltage.
///
/// Absent or non-finite voltages yield 0% with [`ChargeState::NoReading`].
pub fn compute_charge(
    voltage: Option<f64>,
    bounds: &VoltageBounds,
    model: PercentageModel,
) -> ChargeReading {
    let voltage = match voltage {
        Some(v) if v.is_finite() => v,
        _ => {
            return ChargeReading {
                percent: 0.0,
                state: ChargeState::NoReading,
            }
        }
    };

    if voltage > bounds.max {
        return ChargeReading {
            percent: 100.0,
            state: ChargeState::AboveFull,
        };
    }
    if voltage < bounds.min {
        return ChargeReading {
            percent: 0.0,
            state: ChargeState::BelowMinimum,
        };
    }

    let ratio = (voltage - bounds.min) / bounds.span();
    let percent = model.percent_for_ratio(ratio).clamp(0.0, 100.0);
    ChargeReading {
        percent,
        state: ChargeState::InRange,
    }
}

/// Linear percentage of `voltage` between `min` and `max`, clamped to [0, 100].
/// Used for reference points where no reading state is needed.
pub fn linear_percent(voltage: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 0.0;
    }
    (((voltage - min) / (max - min)) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds_72v() -> VoltageBounds {
        VoltageBounds::new(60.0, 84.0, 74.0).unwrap()
    }

    #[test]
    fn test_linear_midpoint() {
        let reading = compute_charge(Some(72.0), &bounds_72v(), PercentageModel::Linear);
        assert!((reading.percent - 50.0).abs() < 1e-9);
        assert!(reading.in_range());
    }

    #[test]
    fn test_out_of_bounds_clamps() {
        let bounds = bounds_72v();
        let above = compute_charge(Some(90.0), &bounds, PercentageModel::Linear);
        assert_eq!(above.percent, 100.0);
        assert_eq!(above.state, ChargeState::AboveFull);

        let below = compute_charge(Some(55.0), &bounds, PercentageModel::Linear);
        assert_eq!(below.percent, 0.0);
        assert_eq!(below.state, ChargeState::BelowMinimum);
    }

    #[test]
    fn test_exact_bounds_are_in_range() {
        let bounds = bounds_72v();
        let full = compute_charge(Some(84.0), &bounds, PercentageModel::Linear);
        assert_eq!(full.percent, 100.0);
        assert_eq!(full.state, ChargeState::InRange);

        let empty = compute_charge(Some(60.0), &bounds, PercentageModel::Linear);
        assert_eq!(empty.percent, 0.0);
        assert_eq!(empty.state, ChargeState::InRange);
    }

    #[test]
    fn test_no_reading() {
        let bounds = bounds_72v();
        for voltage in [None, Some(f64::NAN), Some(f64::INFINITY)] {
            let reading = compute_charge(voltage, &bounds, PercentageModel::Linear);
            assert_eq!(reading.percent, 0.0);
            assert_eq!(reading.state, ChargeState::NoReading);
        }
    }

    #[test]
    fn test_corrected_curve_knee_and_ends() {
        let bounds = bounds_72v();
        let knee = compute_charge(Some(72.0), &bounds, PercentageModel::Corrected);
        assert!((knee.percent - 40.0).abs() < 1e-9);

        let quarter = compute_charge(Some(66.0), &bounds, PercentageModel::Corrected);
        assert!((quarter.percent - 20.0).abs() < 1e-9);

        let three_quarters = compute_charge(Some(78.0), &bounds, PercentageModel::Corrected);
        assert!((three_quarters.percent - 70.0).abs() < 1e-9);

        let full = compute_charge(Some(84.0), &bounds, PercentageModel::Corrected);
        assert!((full.percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_models_are_monotonic() {
        let bounds = bounds_72v();
        for model in [PercentageModel::Linear, PercentageModel::Corrected] {
            let mut previous = -1.0;
            let mut voltage = bounds.min;
            while voltage <= bounds.max {
                let percent = compute_charge(Some(voltage), &bounds, model).percent;
                assert!(percent >= previous, "{:?} not monotonic at {}", model, voltage);
                previous = percent;
                voltage += 0.05;
            }
        }
    }

    #[test]
    fn test_linear_percent_helper() {
        assert_eq!(linear_percent(50.0, 60.0, 84.0), 0.0);
        assert_eq!(linear_percent(90.0, 60.0, 84.0), 100.0);
        assert_eq!(linear_percent(70.0, 84.0, 60.0), 0.0);
    }
}
