//! Voltage candidates from OCR-recognized multimeter text
//!
//! Image capture and the recognition call itself live outside this crate; this
//! module only turns the recognized text into numbers and picks the most
//! plausible battery voltage.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::battery::BatteryProfile;
use crate::error::{EngineError, Result};

lazy_static! {
    /// Anything that cannot be part of a number
    static ref NON_NUMERIC: Regex = Regex::new(r"[^\d.\s]").expect("static regex");
    /// Digit runs with an optional fractional part
    static ref NUMBER_TOKEN: Regex = Regex::new(r"\d+(?:\.\d+)?").expect("static regex");
}

/// Result of scanning recognized text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoltageScan {
    /// Most plausible voltage, if any candidate passed the filters
    pub best: Option<f64>,
    /// Every distinct number that looked like a reading, ascending
    pub all: Vec<f64>,
}

/// Extract voltage candidates from OCR text and pick the best one for `profile`.
///
/// Readings are `12.5`-style decimals (1-2 integer digits, 1-3 decimals) or
/// 2-3 digit whole numbers. Preference order for the best pick: inside the
/// profile's expected pack range, then any pack voltage in [30, 90], then a
/// single-cell voltage in [3.0, 4.5], then any plausible value.
pub fn extract_voltages(text: &str, profile: BatteryProfile) -> VoltageScan {
    let cleaned = NON_NUMERIC.replace_all(text, " ");

    let mut all = Vec::new();
    let mut valid = Vec::new();
    for token in NUMBER_TOKEN.find_iter(&cleaned).map(|m| m.as_str()) {
        if !is_reading_shaped(token) {
            continue;
        }
        let Ok(value) = token.parse::<f64>() else {
            continue;
        };
        all.push(value);
        match check_candidate(value) {
            Ok(value) => valid.push(value),
            Err(err) => log::trace!("Discarding OCR candidate '{}': {}", token, err),
        }
    }

    sort_unique(&mut all);
    sort_unique(&mut valid);

    let (expected_min, expected_max) = profile.expected_range();
    let best = first_in(&valid, expected_min, expected_max)
        .or_else(|| first_in(&valid, 30.0, 90.0))
        .or_else(|| first_in(&valid, 3.0, 4.5))
        .or_else(|| valid.first().copied());

    log::debug!(
        "OCR scan for {}: best={:?} from {} candidate(s)",
        profile,
        best,
        all.len()
    );
    VoltageScan { best, all }
}

/// Check a single OCR number: it must fall in the single-cell range
/// [1.0, 5.0] V or the pack range [10.0, 100.0) V, must not be a whole number
/// below 10 and its shortest decimal form must not be longer than five
/// characters, so `41.250` counts as `41.25`.
pub fn check_candidate(value: f64) -> Result<f64> {
    let plausible = value.is_finite()
        && value > 0.0
        && ((1.0..=5.0).contains(&value) || (10.0..=100.0).contains(&value));
    let suspicious = value.to_string().len() > 5 || (value.fract() == 0.0 && value < 10.0) || value > 99.999;
    if plausible && !suspicious {
        Ok(value)
    } else {
        Err(EngineError::OutOfPlausibleRange(value))
    }
}

/// Lenient check used while the user is still typing: 2.0 to 4.5 V per cell
pub fn is_live_edit_voltage(voltage: f64, profile: BatteryProfile) -> bool {
    if !voltage.is_finite() || voltage <= 0.0 {
        return false;
    }
    let cells = f64::from(profile.series_cells());
    voltage >= cells * 2.0 && voltage <= cells * 4.5
}

fn is_reading_shaped(token: &str) -> bool {
    match token.split_once('.') {
        Some((int, fraction)) => (1..=2).contains(&int.len()) && (1..=3).contains(&fraction.len()),
        None => (2..=3).contains(&token.len()),
    }
}

fn sort_unique(values: &mut Vec<f64>) {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
}

fn first_in(values: &[f64], min: f64, max: f64) -> Option<f64> {
    values.iter().copied().find(|v| *v >= min && *v <= max)
}
