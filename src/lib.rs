//! ScootVolt: e-scooter battery pack voltage calculator
//!
//! Maps a measured pack voltage to a charge percentage, a safety tier, an
//! advisory and a grid of reference voltages for common scooter packs.

// Root module exports
pub mod app;
pub mod battery;
pub mod config;
pub mod error;
pub mod errors;
pub mod logging;
pub mod reading;

// Re-exports for convenience
pub use app::{Calculator, Debouncer, SettingsField};
pub use battery::{
    evaluate, generate_reference_points, resolve_bounds, BatteryProfile, CellThresholds,
    ControllerCutoff, EvaluationInput, EvaluationResult, Evaluator, PercentageModel,
    SafetyTier, VoltageBounds,
};
pub use config::{CalculatorSettings, JsonSettingsStore, LogLevel, SettingsStore};
pub use error::{EngineError, ErrorContext};
pub use errors::AppError;
pub use logging::configure_logging;
pub use reading::{extract_voltages, parse_voltage, VoltageScan};
