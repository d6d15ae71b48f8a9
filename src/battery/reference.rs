//! Reference voltage/percentage points shown next to a reading

use serde::{Deserialize, Serialize};

use crate::battery::percentage::linear_percent;

/// Number of points on each side of the current reading
const POINTS_PER_SIDE: i32 = 3;

/// Label for the point matching the current reading
pub const CURRENT_LABEL: &str = "CURRENT";

/// Fixed grid used when there is no reading: (fraction of vMax, percent, label)
const FIXED_POINTS: [(f64, f64, &str); 6] = [
    (1.0, 100.0, "Full"),
    (0.9, 90.0, "90%"),
    (0.8, 80.0, "80%"),
    (0.6, 60.0, "60%"),
    (0.4, 40.0, "40%"),
    (0.2, 20.0, "20%"),
];

/// One entry of the reference grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub voltage: f64,
    pub percent: f64,
    pub label: String,
    /// Set on the point equal to the current reading
    pub is_current: bool,
}

/// Build the reference grid for an optional reading and the charge bounds.
///
/// With a positive reading the grid holds up to seven points spaced by
/// `max(1, round(5% of the reading))` volts, centered on the reading and
/// limited to `[vMin, vMax]`. Without one (or when no point fits inside the
/// bounds) a fixed table of fractions of vMax is returned, ending at vMin.
pub fn generate_reference_points(voltage: Option<f64>, v_min: f64, v_max: f64) -> Vec<ReferencePoint> {
    if let Some(current) = voltage.filter(|v| v.is_finite() && *v > 0.0) {
        let points = points_around(current, v_min, v_max);
        if !points.is_empty() {
            return points;
        }
        log::trace!(
            "Reading {:.3}V outside [{:.3}, {:.3}], using fixed reference grid",
            current,
            v_min,
            v_max
        );
    }
    fixed_points(v_min, v_max)
}

fn points_around(current: f64, v_min: f64, v_max: f64) -> Vec<ReferencePoint> {
    let step = (current * 0.05).round().max(1.0);
    let start = v_min.max(current - step * f64::from(POINTS_PER_SIDE));
    let end = v_max.min(current + step * f64::from(POINTS_PER_SIDE));

    (-POINTS_PER_SIDE..=POINTS_PER_SIDE)
        .filter_map(|k| {
            let voltage = current + step * f64::from(k);
            if voltage < start || voltage > end {
                return None;
            }
            let percent = linear_percent(voltage, v_min, v_max);
            let is_current = k == 0;
            let label = if is_current {
                CURRENT_LABEL.to_string()
            } else {
                format!("{}%", percent.round())
            };
            Some(ReferencePoint {
                voltage,
                percent,
                label,
                is_current,
            })
        })
        .collect()
}

fn fixed_points(v_min: f64, v_max: f64) -> Vec<ReferencePoint> {
    let mut points = FIXED_POINTS
        .iter()
        .map(|&(fraction, percent, label)| ReferencePoint {
            voltage: v_max * fraction,
            percent,
            label: label.to_string(),
            is_current: false,
        })
        .collect::<Vec<_>>();
    points.push(ReferencePoint {
        voltage: v_min,
        percent: 0.0,
        label: "Empty".to_string(),
        is_current: false,
    });
    points
}
