//! Battery pack profiles keyed by nominal pack voltage

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Scooter battery pack profile
///
/// Each profile fixes the series cell count of the pack. Profiles are keyed by
/// their nominal pack voltage (36, 48, 52, 60, 72); any other key is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BatteryProfile {
    /// 36V pack, 10 cells in series
    V36,
    /// 48V pack, 13 cells in series
    V48,
    /// 52V pack, 14 cells in series
    V52,
    /// 60V pack, 16 cells in series
    V60,
    /// 72V pack, 20 cells in series
    V72,
}

impl BatteryProfile {
    /// Every known profile, lowest voltage first
    pub const ALL: [BatteryProfile; 5] = [
        BatteryProfile::V36,
        BatteryProfile::V48,
        BatteryProfile::V52,
        BatteryProfile::V60,
        BatteryProfile::V72,
    ];

    /// Look up a profile by its nominal pack voltage
    pub fn from_key(key: u32) -> Result<Self, EngineError> {
        match key {
            36 => Ok(Self::V36),
            48 => Ok(Self::V48),
            52 => Ok(Self::V52),
            60 => Ok(Self::V60),
            72 => Ok(Self::V72),
            other => Err(EngineError::invalid(format!(
                "unknown battery profile '{}V'",
                other
            ))),
        }
    }

    /// Nominal pack voltage used as the lookup key
    pub fn key(self) -> u32 {
        match self {
            Self::V36 => 36,
            Self::V48 => 48,
            Self::V52 => 52,
            Self::V60 => 60,
            Self::V72 => 72,
        }
    }

    /// Number of cells connected in series
    pub fn series_cells(self) -> u32 {
        match self {
            Self::V36 => 10,
            Self::V48 => 13,
            Self::V52 => 14,
            Self::V60 => 16,
            Self::V72 => 20,
        }
    }

    /// Nominal pack voltage in volts
    pub fn nominal_voltage(self) -> f64 {
        f64::from(self.key())
    }

    /// Display name, e.g. "72V"
    pub fn name(self) -> String {
        format!("{}V", self.key())
    }

    /// Expected pack voltage window for this profile (3.0 to 4.2 V per cell).
    /// Used to prefer matching candidates when reading a voltage from text.
    pub fn expected_range(self) -> (f64, f64) {
        let cells = f64::from(self.series_cells());
        (cells * 3.0, cells * 4.2)
    }
}

impl Default for BatteryProfile {
    fn default() -> Self {
        Self::V72
    }
}

impl fmt::Display for BatteryProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}V", self.key())
    }
}

impl FromStr for BatteryProfile {
    type Err = EngineError;

    /// Accepts "72" as well as "72V" / "72v"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix('V')
            .or_else(|| trimmed.strip_suffix('v'))
            .unwrap_or(trimmed);
        let key = digits.parse::<u32>().map_err(|_| {
            EngineError::invalid(format!("unknown battery profile '{}'", trimmed))
        })?;
        Self::from_key(key)
    }
}

impl TryFrom<u32> for BatteryProfile {
    type Error = EngineError;

    fn try_from(key: u32) -> Result<Self, Self::Error> {
        Self::from_key(key)
    }
}

impl From<BatteryProfile> for u32 {
    fn from(profile: BatteryProfile) -> Self {
        profile.key()
    }
}
