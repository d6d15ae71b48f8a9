//! Safety classification from absolute per-cell voltage limits
//!
//! The limits here are fixed lithium-ion safety boundaries. They are
//! deliberately independent of the user's cell thresholds and of the
//! controller cutoff, which only move the charge percentage scale.

use serde::{Deserialize, Serialize};

/// Per-cell voltage at or above which thermal runaway is likely
pub const FIRE_RISK_CELL_VOLTAGE: f64 = 4.5;
/// Per-cell voltage at or above which gas generation is likely
pub const HIGH_PRESSURE_CELL_VOLTAGE: f64 = 4.3;
/// Highest safe per-cell voltage
pub const MAX_SAFE_CELL_VOLTAGE: f64 = 4.2;
/// Lowest safe per-cell voltage
pub const MIN_SAFE_CELL_VOLTAGE: f64 = 3.0;
/// Per-cell voltage at or below which permanent damage is possible
pub const DAMAGE_CELL_VOLTAGE: f64 = 2.5;

/// Tolerance for floating point noise at the tier boundaries (e.g. 13 × 4.2)
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Charge band of a pack whose voltage is within safe limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChargeBand {
    /// Below 10%
    Critical,
    /// 10% to below 20%
    VeryLow,
    /// 20% to below 40%
    Low,
    /// 40% to below 60%
    Moderate,
    /// 60% to below 80%
    Good,
    /// 80% to below 95%
    WellCharged,
    /// 95% and above
    Full,
}

impl ChargeBand {
    /// Band for a charge percentage
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 95.0 {
            Self::Full
        } else if percent >= 80.0 {
            Self::WellCharged
        } else if percent >= 60.0 {
            Self::Good
        } else if percent >= 40.0 {
            Self::Moderate
        } else if percent >= 20.0 {
            Self::Low
        } else if percent >= 10.0 {
            Self::VeryLow
        } else {
            Self::Critical
        }
    }

    /// Short status label, e.g. "Good charge"
    pub fn label(self) -> &'static str {
        match self {
            Self::Full => "Fully charged",
            Self::WellCharged => "Well charged",
            Self::Good => "Good charge",
            Self::Moderate => "Moderate charge",
            Self::Low => "Low charge",
            Self::VeryLow => "Very low charge",
            Self::Critical => "Critical charge",
        }
    }
}

/// Safety classification of a pack voltage, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SafetyTier {
    /// 0V or below: BMS cutoff or no connection rather than a real reading
    Unknown,
    /// At or above 4.5 V per cell
    FireRisk,
    /// At or above 4.3 V per cell
    HighPressure,
    /// Above 4.2 V per cell
    Overcharged,
    /// At or below 2.5 V per cell
    CriticallyLow,
    /// Below 3.0 V per cell
    DangerouslyLow,
    /// Within safe limits
    Normal(ChargeBand),
}

impl SafetyTier {
    /// Whether the tier is outside safe operating limits
    pub fn is_hazard(self) -> bool {
        !matches!(self, Self::Normal(_))
    }

    /// How strongly the voltage field should be emphasized
    pub fn alert_level(self) -> AlertLevel {
        match self {
            Self::FireRisk | Self::CriticallyLow => AlertLevel::Extreme,
            Self::HighPressure | Self::DangerouslyLow => AlertLevel::Danger,
            Self::Overcharged => AlertLevel::Caution,
            Self::Unknown | Self::Normal(_) => AlertLevel::None,
        }
    }

    /// Stable identifier for renderers (CSS classes, icons)
    pub fn id(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::FireRisk => "fire-risk",
            Self::HighPressure => "high-pressure",
            Self::Overcharged => "overcharged",
            Self::CriticallyLow => "critically-low",
            Self::DangerouslyLow => "dangerously-low",
            Self::Normal(_) => "normal",
        }
    }
}

/// Emphasis for the voltage input, strongest last
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    /// Default styling
    None,
    /// Basic overcharge
    Caution,
    /// High pressure or undercharge
    Danger,
    /// Fire risk or possible permanent damage
    Extreme,
}

/// Absolute pack voltage limits for a series cell count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyLimits {
    /// 4.5 V per cell
    pub fire_risk: f64,
    /// 4.3 V per cell
    pub high_pressure: f64,
    /// 4.2 V per cell
    pub max_safe: f64,
    /// 3.0 V per cell
    pub min_safe: f64,
    /// 2.5 V per cell
    pub damage: f64,
}

impl SafetyLimits {
    /// Limits for a pack of `series_cells` cells
    pub fn for_cells(series_cells: u32) -> Self {
        let cells = f64::from(series_cells);
        Self {
            fire_risk: cells * FIRE_RISK_CELL_VOLTAGE,
            high_pressure: cells * HIGH_PRESSURE_CELL_VOLTAGE,
            max_safe: cells * MAX_SAFE_CELL_VOLTAGE,
            min_safe: cells * MIN_SAFE_CELL_VOLTAGE,
            damage: cells * DAMAGE_CELL_VOLTAGE,
        }
    }

    /// Classify a finite pack voltage. `percent` only selects the band of a
    /// [`SafetyTier::Normal`] result.
    pub fn classify(&self, voltage: f64, percent: f64) -> SafetyTier {
        if voltage <= 0.0 {
            SafetyTier::Unknown
        } else if voltage >= self.fire_risk - BOUNDARY_EPSILON {
            SafetyTier::FireRisk
        } else if voltage >= self.high_pressure - BOUNDARY_EPSILON {
            SafetyTier::HighPressure
        } else if voltage > self.max_safe + BOUNDARY_EPSILON {
            SafetyTier::Overcharged
        } else if voltage <= self.damage + BOUNDARY_EPSILON {
            SafetyTier::CriticallyLow
        } else if voltage < self.min_safe - BOUNDARY_EPSILON {
            SafetyTier::DangerouslyLow
        } else {
            SafetyTier::Normal(ChargeBand::from_percent(percent))
        }
    }
}

/// Classify `voltage` for a pack of `series_cells` cells.
///
/// A cell count of zero cannot be classified and yields [`SafetyTier::Unknown`].
pub fn classify_safety(voltage: f64, series_cells: u32, percent: f64) -> SafetyTier {
    if series_cells == 0 {
        return SafetyTier::Unknown;
    }
    SafetyLimits::for_cells(series_cells).classify(voltage, percent)
}

/// Pack voltage divided by the series cell count
pub fn per_cell_voltage(voltage: f64, series_cells: u32) -> f64 {
    if series_cells == 0 {
        return 0.0;
    }
    voltage / f64::from(series_cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order_20_cells() {
        let cases = [
            (0.0, SafetyTier::Unknown),
            (91.0, SafetyTier::FireRisk),
            (90.0, SafetyTier::FireRisk),
            (86.0, SafetyTier::HighPressure),
            (85.0, SafetyTier::Overcharged),
            (50.0, SafetyTier::CriticallyLow),
            (45.0, SafetyTier::CriticallyLow),
            (55.0, SafetyTier::DangerouslyLow),
        ];
        for (voltage, expected) in cases {
            assert_eq!(classify_safety(voltage, 20, 0.0), expected, "voltage {}", voltage);
        }
    }

    #[test]
    fn test_max_safe_boundary_is_exclusive() {
        assert_eq!(
            classify_safety(84.0, 20, 100.0),
            SafetyTier::Normal(ChargeBand::Full)
        );
        assert_eq!(
            classify_safety(54.6, 13, 100.0),
            SafetyTier::Normal(ChargeBand::Full)
        );
        assert_eq!(classify_safety(84.01, 20, 100.0), SafetyTier::Overcharged);
    }

    #[test]
    fn test_min_safe_boundary_is_inclusive_for_normal() {
        assert_eq!(
            classify_safety(60.0, 20, 0.0),
            SafetyTier::Normal(ChargeBand::Critical)
        );
        assert_eq!(classify_safety(59.99, 20, 0.0), SafetyTier::DangerouslyLow);
    }

    #[test]
    fn test_charge_bands() {
        let cases = [
            (100.0, ChargeBand::Full),
            (95.0, ChargeBand::Full),
            (94.9, ChargeBand::WellCharged),
            (80.0, ChargeBand::WellCharged),
            (60.0, ChargeBand::Good),
            (40.0, ChargeBand::Moderate),
            (20.0, ChargeBand::Low),
            (10.0, ChargeBand::VeryLow),
            (9.99, ChargeBand::Critical),
            (0.0, ChargeBand::Critical),
        ];
        for (percent, expected) in cases {
            assert_eq!(ChargeBand::from_percent(percent), expected, "percent {}", percent);
        }
    }

    #[test]
    fn test_alert_levels() {
        assert_eq!(SafetyTier::FireRisk.alert_level(), AlertLevel::Extreme);
        assert_eq!(SafetyTier::CriticallyLow.alert_level(), AlertLevel::Extreme);
        assert_eq!(SafetyTier::HighPressure.alert_level(), AlertLevel::Danger);
        assert_eq!(SafetyTier::DangerouslyLow.alert_level(), AlertLevel::Danger);
        assert_eq!(SafetyTier::Overcharged.alert_level(), AlertLevel::Caution);
        assert_eq!(
            SafetyTier::Normal(ChargeBand::Low).alert_level(),
            AlertLevel::None
        );
    }

    #[test]
    fn test_zero_cells_is_unknown() {
        assert_eq!(classify_safety(50.0, 0, 50.0), SafetyTier::Unknown);
        assert_eq!(per_cell_voltage(50.0, 0), 0.0);
    }
}
