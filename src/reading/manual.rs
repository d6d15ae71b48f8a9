//! Manually entered voltage text

use crate::error::{EngineError, Result};

/// Entries above this are cleared from the input field
pub const MAX_MANUAL_VOLTAGE: f64 = 200.0;

/// Maximum decimals kept when echoing a reading back
const MAX_DISPLAY_DECIMALS: usize = 3;

/// Parse a voltage typed by the user. Accepts an optional trailing "V".
///
/// Empty text, non-numbers, non-finite and negative values are all
/// [`EngineError::UnparseableVoltage`]; callers treat that as "no reading".
pub fn parse_voltage(raw: &str) -> Result<f64> {
    let number = numeric_part(raw);
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(EngineError::UnparseableVoltage(raw.trim().to_string())),
    }
}

/// Parse a voltage, mapping anything unusable to `None`
pub fn parse_optional_voltage(raw: &str) -> Option<f64> {
    parse_voltage(raw).ok()
}

/// Echo a typed reading back with its own precision: as many decimals as were
/// typed (capped at 3), or one decimal for whole numbers. "-- V" when the text
/// is not a voltage.
pub fn format_voltage_input(raw: &str) -> String {
    let Ok(value) = parse_voltage(raw) else {
        return "-- V".to_string();
    };
    let decimals = match numeric_part(raw).split_once('.') {
        Some((_, fraction)) => fraction.len().min(MAX_DISPLAY_DECIMALS),
        None => 1,
    };
    format!("{:.*}V", decimals, value)
}

/// What to do with the voltage field when it loses focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryVerdict {
    /// Leave the text as typed
    Keep,
    /// Clear the field and show `placeholder` instead
    Clear { placeholder: &'static str },
}

/// Check a finished manual entry: negative values and values above 200 V are
/// cleared, everything else (including unparseable text) is kept.
pub fn check_manual_entry(raw: &str) -> EntryVerdict {
    let Ok(value) = numeric_part(raw).parse::<f64>() else {
        return EntryVerdict::Keep;
    };
    if value < 0.0 {
        EntryVerdict::Clear {
            placeholder: "Enter positive voltage",
        }
    } else if value > MAX_MANUAL_VOLTAGE {
        EntryVerdict::Clear {
            placeholder: "Voltage too high (>200V)",
        }
    } else {
        EntryVerdict::Keep
    }
}

fn numeric_part(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix('V')
        .or_else(|| trimmed.strip_suffix('v'))
        .unwrap_or(trimmed)
        .trim_end()
}
