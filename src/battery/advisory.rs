//! Status labels and advisory tips derived from an evaluation

use serde::{Deserialize, Serialize};

use crate::battery::safety::{
    per_cell_voltage, ChargeBand, SafetyTier, DAMAGE_CELL_VOLTAGE, FIRE_RISK_CELL_VOLTAGE,
    HIGH_PRESSURE_CELL_VOLTAGE, MAX_SAFE_CELL_VOLTAGE, MIN_SAFE_CELL_VOLTAGE,
};
use crate::battery::ChargeState;

/// Readings above this are implausible for any supported pack
const IMPLAUSIBLE_PACK_VOLTAGE: f64 = 120.0;

/// Icon token for a tip; renderers map it to a glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipIcon {
    Idea,
    Battery,
    Siren,
    Warning,
    Check,
    Chart,
    Home,
    TrendDown,
}

impl TipIcon {
    /// Emoji used by text renderers
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Idea => "💡",
            Self::Battery => "🔋",
            Self::Siren => "🚨",
            Self::Warning => "⚠️",
            Self::Check => "✅",
            Self::Chart => "📊",
            Self::Home => "🏠",
            Self::TrendDown => "📉",
        }
    }
}

/// Visual tone of a tip or status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

/// Advisory shown next to the reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub icon: TipIcon,
    pub title: String,
    pub text: String,
    pub severity: Severity,
    /// Point the user to the jumpstart / BMS recovery guide
    pub recommend_troubleshooting: bool,
}

impl Tip {
    fn new(icon: TipIcon, title: &str, text: String, severity: Severity) -> Self {
        Self {
            icon,
            title: title.to_string(),
            text,
            severity,
            recommend_troubleshooting: false,
        }
    }

    fn with_troubleshooting(mut self) -> Self {
        self.recommend_troubleshooting = true;
        self
    }
}

/// Status line for the reading
pub fn status_label(state: ChargeState, percent: f64) -> &'static str {
    match state {
        ChargeState::NoReading => "Enter voltage to start",
        ChargeState::AboveFull => "Above full charge",
        ChargeState::BelowMinimum => "Below minimum voltage",
        ChargeState::InRange => ChargeBand::from_percent(percent).label(),
    }
}

/// Tone of the status line: success from 80%, warning below 20%, danger below 10%
pub fn status_severity(percent: f64) -> Severity {
    if percent >= 80.0 {
        Severity::Success
    } else if percent >= 20.0 {
        Severity::Neutral
    } else if percent >= 10.0 {
        Severity::Warning
    } else if percent > 0.0 {
        Severity::Danger
    } else {
        Severity::Neutral
    }
}

/// Tip for a classified reading. `voltage` is `None` when nothing was entered.
pub fn build_tip(tier: Option<SafetyTier>, voltage: Option<f64>, series_cells: u32) -> Tip {
    let (tier, voltage) = match (tier, voltage) {
        (Some(tier), Some(voltage)) => (tier, voltage),
        _ => {
            return Tip::new(
                TipIcon::Idea,
                "Ready to calculate",
                "Enter your battery voltage above to get started".to_string(),
                Severity::Info,
            )
        }
    };
    let cell = per_cell_voltage(voltage, series_cells);

    match tier {
        SafetyTier::Unknown => Tip::new(
            TipIcon::Battery,
            "BMS Protection or No Connection",
            "0V reading could mean BMS has cut off power to protect cells, or there's no \
             connection. Check connections and see troubleshooting guide for recovery methods."
                .to_string(),
            Severity::Warning,
        )
        .with_troubleshooting(),
        SafetyTier::FireRisk if voltage > IMPLAUSIBLE_PACK_VOLTAGE => Tip::new(
            TipIcon::Siren,
            "DANGER - Extremely high voltage",
            "This voltage is dangerously high and could cause fire or explosion. DO NOT charge. \
             Check for wiring issues or wrong battery type."
                .to_string(),
            Severity::Danger,
        ),
        SafetyTier::FireRisk => Tip::new(
            TipIcon::Siren,
            "EXTREME DANGER - Fire Risk",
            format!(
                "Voltage is {:.2}V per cell (≥{}V limit). SEVERE thermal runaway risk! DO NOT \
                 charge. Disconnect immediately and move to safe area.",
                cell, FIRE_RISK_CELL_VOLTAGE
            ),
            Severity::Danger,
        ),
        SafetyTier::HighPressure => Tip::new(
            TipIcon::Siren,
            "DANGER - High Pressure",
            format!(
                "Voltage is {:.2}V per cell (≥{}V). Battery under high pressure, gas generation \
                 likely. Stop charging immediately.",
                cell, HIGH_PRESSURE_CELL_VOLTAGE
            ),
            Severity::Danger,
        ),
        SafetyTier::Overcharged => Tip::new(
            TipIcon::Warning,
            "OVERCHARGED - Stop charging",
            format!(
                "Voltage is {:.2}V per cell (>{}V safe limit). Stop charging immediately to \
                 prevent damage.",
                cell, MAX_SAFE_CELL_VOLTAGE
            ),
            Severity::Warning,
        ),
        SafetyTier::CriticallyLow => Tip::new(
            TipIcon::Siren,
            "CRITICAL - Severe undercharge",
            format!(
                "Voltage is {:.2}V per cell (≤{:.1}V damage threshold). Battery may be \
                 permanently damaged. Use extreme caution.",
                cell, DAMAGE_CELL_VOLTAGE
            ),
            Severity::Danger,
        )
        .with_troubleshooting(),
        SafetyTier::DangerouslyLow => Tip::new(
            TipIcon::Siren,
            "DANGER - Undercharged",
            format!(
                "Voltage is {:.2}V per cell (<{:.1}V safe minimum). Battery may be damaged if \
                 left this low. Charge carefully.",
                cell, MIN_SAFE_CELL_VOLTAGE
            ),
            Severity::Danger,
        )
        .with_troubleshooting(),
        SafetyTier::Normal(band) => band_tip(band),
    }
}

fn band_tip(band: ChargeBand) -> Tip {
    let (icon, text, severity) = match band {
        ChargeBand::Full => (
            TipIcon::Check,
            "Your battery is fully charged and ready to go! If not riding soon, consider \
             charging to 80-90% for longevity.",
            Severity::Success,
        ),
        ChargeBand::WellCharged => (
            TipIcon::Check,
            "Battery is well charged and ready for a good ride. This is a great starting point.",
            Severity::Success,
        ),
        ChargeBand::Good => (
            TipIcon::Chart,
            "Battery has a good charge level. Perfect for normal riding conditions.",
            Severity::Info,
        ),
        ChargeBand::Moderate => (
            TipIcon::Home,
            "Fine for shorter rides. This is also the ideal storage range (40-60%) for \
             preserving battery health over long periods.",
            Severity::Info,
        ),
        ChargeBand::Low => (
            TipIcon::TrendDown,
            "Battery is getting low. Range will be noticeably reduced - plan your route and \
             charge soon.",
            Severity::Warning,
        ),
        ChargeBand::VeryLow => (
            TipIcon::Battery,
            "Battery critically low. Power cutoff may occur soon - charge as soon as possible.",
            Severity::Warning,
        ),
        ChargeBand::Critical => (
            TipIcon::Siren,
            "Battery is near the cutoff voltage. Scooter may stop working. Charge immediately.",
            Severity::Warning,
        ),
    };
    Tip::new(icon, band.label(), text.to_string(), severity)
}
