use crate::error::ThrottlerError;
use std::time::Duration;
use validator::ValidationError;

/// Validates throttle parameters before any throttle is built
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the call ceiling
    pub fn validate_calls(calls: u32) -> Result<(), ThrottlerError> {
        if calls == 0 {
            return Err(ThrottlerError::ConfigurationError(
                "calls must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates the sliding window length
    pub fn validate_period(period: Duration) -> Result<(), ThrottlerError> {
        if period.is_zero() {
            return Err(ThrottlerError::ConfigurationError(
                "period must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates a full throttle configuration
    pub fn validate_throttle(calls: u32, period: Duration) -> Result<(), ThrottlerError> {
        Self::validate_calls(calls)?;
        Self::validate_period(period)?;

        Ok(())
    }
}

/// Field-level hook for `#[validate(custom(...))]`
pub(crate) fn validate_period_field(period: &Duration) -> Result<(), ValidationError> {
    ConfigValidator::validate_period(*period).map_err(|_| {
        let mut err = ValidationError::new("non_positive_period");
        err.message = Some("period must be greater than 0".into());
        err
    })
}
