use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by throttle construction and admission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThrottlerError {
    /// Invalid `calls` or `period`, reported when the throttle is built
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The window is full and the throttle rejects instead of waiting
    #[error("throttle exceeded: more than {calls} calls within {period:?}")]
    ThrottleExceeded { calls: u32, period: Duration },
}

impl ThrottlerError {
    pub fn is_throttle_exceeded(&self) -> bool {
        matches!(self, ThrottlerError::ThrottleExceeded { .. })
    }
}

impl From<validator::ValidationErrors> for ThrottlerError {
    fn from(err: validator::ValidationErrors) -> Self {
        ThrottlerError::ConfigurationError(err.to_string())
    }
}

pub type ThrottlerResult<T> = Result<T, ThrottlerError>;
