//! Error types for the battery evaluation engine

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Errors produced by the evaluation engine and the reading adapter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Bounds cannot be resolved: vMax <= vMin, no cells, unknown profile key
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Voltage text is not a finite, non-negative number
    #[error("Unparseable voltage: '{0}'")]
    UnparseableVoltage(String),

    /// Candidate voltage outside [1, 5] V and [10, 100] V
    #[error("Voltage {0}V is outside any plausible battery range")]
    OutOfPlausibleRange(f64),
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidConfiguration`]
    pub fn invalid<S: Into<String>>(reason: S) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Whether the caller should treat this as "no reading" rather than a failure
    pub fn is_no_reading(&self) -> bool {
        matches!(self, Self::UnparseableVoltage(_))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Context attached to errors when they are logged
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Component where the error happened (e.g. "Calculator")
    pub component: String,
    /// Operation being performed
    pub operation: String,
    /// Extra key/value details
    pub metadata: BTreeMap<String, String>,
    /// Message suitable for showing to the user
    pub user_message: Option<String>,
}

impl ErrorContext {
    /// Create a new context for a component/operation pair
    pub fn new<S: Into<String>>(component: S, operation: S) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            metadata: BTreeMap::new(),
            user_message: None,
        }
    }

    /// Attach a key/value pair
    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach a user-facing message
    pub fn with_user_message<S: Into<String>>(mut self, message: S) -> Self {
        self.user_message = Some(message.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.component, self.operation)?;
        if !self.metadata.is_empty() {
            let pairs = self
                .metadata
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " [{}]", pairs)?;
        }
        Ok(())
    }
}
