//! Battery evaluation engine
//!
//! Pure functions mapping a pack voltage and a pack configuration to a charge
//! percentage, a safety tier, an advisory and a reference grid. Nothing here
//! keeps state between calls.

pub mod advisory;
pub mod bounds;
pub mod engine;
pub mod percentage;
pub mod profile;
pub mod reference;
pub mod safety;
pub mod thresholds;

pub use advisory::{build_tip, status_label, Severity, Tip, TipIcon};
pub use bounds::{resolve_bounds, resolve_bounds_for_cells, VoltageBounds};
pub use engine::{evaluate, format_percent, EvaluationInput, EvaluationResult, Evaluator};
pub use percentage::{compute_charge, ChargeReading, ChargeState, PercentageModel};
pub use profile::BatteryProfile;
pub use reference::{generate_reference_points, ReferencePoint};
pub use safety::{classify_safety, AlertLevel, ChargeBand, SafetyLimits, SafetyTier};
pub use thresholds::{CellThresholds, ControllerCutoff};
