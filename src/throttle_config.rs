use crate::blocking::BlockingThrottle;
use crate::config_validator::{validate_period_field, ConfigValidator};
use crate::error::{ThrottlerError, ThrottlerResult};
use crate::suspending::SuspendingThrottle;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Validated throttle parameters: at most `calls` admissions per sliding `period`.
///
/// Fields are private so a value of this type is always valid. It is immutable
/// once built; the builder-style setter consumes and returns a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    calls: u32,
    period: Duration,
    raise_on_throttle: bool,
}

impl ThrottleConfig {
    /// Create a waiting (non-raising) configuration
    pub fn new(calls: u32, period: Duration) -> ThrottlerResult<Self> {
        ConfigValidator::validate_throttle(calls, period)?;

        Ok(Self {
            calls,
            period,
            raise_on_throttle: false,
        })
    }

    /// Reject with `ThrottleExceeded` instead of waiting when the window is full
    pub fn with_raise_on_throttle(mut self, raise_on_throttle: bool) -> Self {
        self.raise_on_throttle = raise_on_throttle;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn raise_on_throttle(&self) -> bool {
        self.raise_on_throttle
    }

    /// Build a throttle for thread-based callers
    pub fn blocking(self) -> BlockingThrottle {
        BlockingThrottle::new(self)
    }

    /// Build a throttle for async callers
    pub fn suspending(self) -> SuspendingThrottle {
        SuspendingThrottle::new(self)
    }

    pub(crate) fn exceeded(&self) -> ThrottlerError {
        ThrottlerError::ThrottleExceeded {
            calls: self.calls,
            period: self.period,
        }
    }
}

/// Raw, deserializable throttle settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ThrottleSettings {
    #[validate(range(min = 1, message = "calls must be greater than 0"))]
    pub calls: u32,
    #[serde(with = "humantime_serde")]
    #[validate(custom(function = "validate_period_field"))]
    pub period: Duration,
    #[serde(default)]
    pub raise_on_throttle: bool,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            calls: 1,
            period: Duration::from_secs(1),
            raise_on_throttle: false,
        }
    }
}

impl TryFrom<ThrottleSettings> for ThrottleConfig {
    type Error = ThrottlerError;

    fn try_from(settings: ThrottleSettings) -> Result<Self, Self::Error> {
        settings.validate()?;

        Ok(ThrottleConfig::new(settings.calls, settings.period)?
            .with_raise_on_throttle(settings.raise_on_throttle))
    }
}

impl From<ThrottleConfig> for ThrottleSettings {
    fn from(config: ThrottleConfig) -> Self {
        Self {
            calls: config.calls,
            period: config.period,
            raise_on_throttle: config.raise_on_throttle,
        }
    }
}
