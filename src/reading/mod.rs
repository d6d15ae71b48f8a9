//! Voltage reading sources: manual entry and OCR text

mod manual;
mod ocr;

pub use manual::{
    check_manual_entry, format_voltage_input, parse_optional_voltage, parse_voltage,
    EntryVerdict, MAX_MANUAL_VOLTAGE,
};
pub use ocr::{check_candidate, extract_voltages, is_live_edit_voltage, VoltageScan};

use crate::battery::BatteryProfile;

/// Placeholder for the voltage field: the last voltage used with this profile,
/// or the profile's nominal voltage
pub fn voltage_placeholder(profile: BatteryProfile, last_voltage: Option<&str>) -> String {
    match last_voltage.map(str::trim).filter(|v| !v.is_empty()) {
        Some(last) => format!("e.g. {}V", last),
        None => format!("e.g. {}V", profile.key()),
    }
}
