//! Calculator session and input debouncing

mod calculator;
mod debounce;

pub use calculator::{Calculator, SettingsField};
pub use debounce::{Debouncer, ADVISORY_DELAY};
