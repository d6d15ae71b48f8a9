//! Field validation for calculator settings
//!
//! Threshold and cutoff fields arrive as text from the terminal or a form.
//! These validators turn that text into numbers or a reason for rejecting it.

use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::battery::thresholds::{MAX_CELL_RANGE, MIN_CELL_RANGE, NOMINAL_CELL_RANGE};
use crate::error::ErrorContext;

/// Field validation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Field is required
    #[error("Field '{0}' is required")]
    Required(String),

    /// Field is not a number
    #[error("Field '{0}' is not a number: {1}")]
    NotANumber(String, String),

    /// Field is outside its accepted range
    #[error("Field '{0}' must be between {1} and {2}")]
    OutOfRange(String, f64, f64),

    /// Custom validation error
    #[error("{0}")]
    Custom(String),
}

/// Validation result type
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validator for a single numeric field
pub struct FieldValidator {
    /// The field name reported in errors
    pub field: String,
    /// Whether empty text is rejected
    pub required: bool,
    /// Accepted range, inclusive
    pub range: Option<RangeInclusive<f64>>,
    /// Extra check applied after parsing
    #[allow(clippy::type_complexity)]
    pub validator: Option<Box<dyn Fn(f64) -> Result<()> + Send + Sync>>,
}

impl FieldValidator {
    /// Create a validator for `field` with no constraints
    pub fn new<S: Into<String>>(field: S) -> Self {
        Self {
            field: field.into(),
            required: false,
            range: None,
            validator: None,
        }
    }

    /// Create a required number range validator
    pub fn number_range<S: Into<String>>(field: S, range: RangeInclusive<f64>) -> Self {
        Self::new(field).required().within(range)
    }

    /// Reject empty text
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict the value to `range`
    pub fn within(mut self, range: RangeInclusive<f64>) -> Self {
        self.range = Some(range);
        self
    }

    /// Add a custom check
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(f64) -> Result<()> + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Parse and check `value`. Empty text on an optional field is `Ok(None)`.
    pub fn validate(&self, value: &str) -> Result<Option<f64>> {
        let ctx = ErrorContext::new("FieldValidator", "validate")
            .with_metadata("field", self.field.clone())
            .with_metadata("value", value.trim());

        let trimmed = value.trim();
        if trimmed.is_empty() {
            if self.required {
                log::debug!("{}: required field is empty", ctx);
                return Err(ValidationError::Required(self.field.clone()));
            }
            return Ok(None);
        }

        let number = match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => number,
            _ => {
                log::debug!("{}: not a number", ctx);
                return Err(ValidationError::NotANumber(
                    self.field.clone(),
                    trimmed.to_string(),
                ));
            }
        };

        if let Some(range) = &self.range {
            if !range.contains(&number) {
                log::debug!("{}: outside {:?}", ctx, range);
                return Err(ValidationError::OutOfRange(
                    self.field.clone(),
                    *range.start(),
                    *range.end(),
                ));
            }
        }

        if let Some(validator) = &self.validator {
            validator(number)?;
        }

        Ok(Some(number))
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("field", &self.field)
            .field("required", &self.required)
            .field("range", &self.range)
            .field("validator", &format_args!("<function>"))
            .finish()
    }
}

/// Validator for the fully charged cell voltage
pub fn max_cell_validator() -> FieldValidator {
    FieldValidator::number_range("cell_max", MAX_CELL_RANGE)
}

/// Validator for the nominal cell voltage
pub fn nominal_cell_validator() -> FieldValidator {
    FieldValidator::number_range("cell_nominal", NOMINAL_CELL_RANGE)
}

/// Validator for the empty cell voltage
pub fn min_cell_validator() -> FieldValidator {
    FieldValidator::number_range("cell_min", MIN_CELL_RANGE)
}

/// Validator for the controller cutoff; empty means "not set"
pub fn cutoff_validator() -> FieldValidator {
    FieldValidator::new("controller_cutoff").validator(|volts| {
        if volts < 0.0 {
            Err(ValidationError::Custom(
                "Controller cutoff cannot be negative".to_string(),
            ))
        } else {
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_range() {
        let validator = max_cell_validator();
        assert_eq!(validator.validate("4.2"), Ok(Some(4.2)));
        assert_eq!(validator.validate(" 3.0 "), Ok(Some(3.0)));
        assert_eq!(
            validator.validate("5.5"),
            Err(ValidationError::OutOfRange("cell_max".to_string(), 3.0, 5.0))
        );
        assert_eq!(
            validator.validate(""),
            Err(ValidationError::Required("cell_max".to_string()))
        );
        assert!(matches!(
            validator.validate("abc"),
            Err(ValidationError::NotANumber(_, _))
        ));
    }

    #[test]
    fn test_cutoff_validator() {
        let validator = cutoff_validator();
        assert_eq!(validator.validate(""), Ok(None));
        assert_eq!(validator.validate("60"), Ok(Some(60.0)));
        assert_eq!(
            validator.validate("-1").unwrap_err().to_string(),
            "Controller cutoff cannot be negative"
        );
    }

    #[test]
    fn test_min_and_nominal_ranges() {
        assert!(min_cell_validator().validate("2.5").is_ok());
        assert!(min_cell_validator().validate("3.6").is_err());
        assert!(nominal_cell_validator().validate("4.5").is_ok());
        assert!(nominal_cell_validator().validate("2.9").is_err());
    }
}
