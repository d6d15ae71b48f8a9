//! Error types for the ScootVolt application layer

use thiserror::Error;

use crate::config::{ConfigError, ValidationError};
use crate::error::EngineError;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Evaluation error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rejected field input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
