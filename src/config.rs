use crate::error::ThrottlerResult;
use crate::throttle_config::{ThrottleConfig, ThrottleSettings};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which throttle variant drives the demo
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Block a thread while the window is full
    Blocking,
    /// Suspend a tokio task while the window is full
    Suspending,
}

/// Command line configuration for the `call-throttle` demo
#[derive(Debug, Clone, Parser)]
#[command(name = "call-throttle", version, about = "Run no-op calls through a sliding-window throttle")]
pub struct Config {
    /// Maximum calls admitted per period
    #[arg(long, env = "THROTTLE_CALLS", default_value_t = 1)]
    pub calls: u32,

    /// Sliding window length, e.g. "1s" or "250ms"
    #[arg(long, env = "THROTTLE_PERIOD", default_value = "1s", value_parser = parse_period)]
    pub period: Duration,

    /// Fail instead of waiting when the window is full
    #[arg(long, env = "THROTTLE_RAISE", default_value_t = false)]
    pub raise: bool,

    /// Throttle variant to use
    #[arg(long, value_enum, default_value_t = Mode::Blocking)]
    pub mode: Mode,

    /// Number of guarded calls to issue
    #[arg(long, default_value_t = 5)]
    pub invocations: u32,

    /// JSON settings file; overrides calls, period and raise
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

fn parse_period(value: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(value)
}

impl Config {
    /// Build the throttle configuration, preferring the settings file if given
    pub fn throttle_config(&self) -> anyhow::Result<ThrottleConfig> {
        match &self.settings {
            Some(path) => Ok(ThrottleConfig::try_from(load_settings(path)?)?),
            None => Ok(self.throttle_config_from_args()?),
        }
    }

    fn throttle_config_from_args(&self) -> ThrottlerResult<ThrottleConfig> {
        Ok(ThrottleConfig::new(self.calls, self.period)?.with_raise_on_throttle(self.raise))
    }
}

/// Read throttle settings from a JSON file
pub fn load_settings(path: &Path) -> anyhow::Result<ThrottleSettings> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read settings {}: {}", path.display(), e))?;
    let settings = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Failed to parse settings {}: {}", path.display(), e))?;
    Ok(settings)
}
