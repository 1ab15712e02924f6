use anyhow::Result;
use call_throttle::config::{Config, Mode};
use call_throttle::{BlockingThrottle, SuspendingThrottle, ThrottleConfig};
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("call_throttle={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let throttle_config = config
        .throttle_config()
        .map_err(|e| anyhow::anyhow!("Invalid throttle configuration: {}", e))?;

    tracing::info!(
        calls = throttle_config.calls(),
        period_ms = throttle_config.period().as_millis() as u64,
        raise_on_throttle = throttle_config.raise_on_throttle(),
        mode = ?config.mode,
        "Starting throttled run"
    );

    let metrics = match config.mode {
        Mode::Blocking => {
            let invocations = config.invocations;
            tokio::task::spawn_blocking(move || run_blocking(throttle_config, invocations))
                .await?
        }
        Mode::Suspending => run_suspending(throttle_config, config.invocations).await,
    };

    tracing::info!(
        admitted = metrics.admitted_calls,
        rejected = metrics.rejected_calls,
        waits = metrics.wait_rounds,
        "Run finished"
    );
    println!("{}", serde_json::to_string_pretty(&metrics)?);

    Ok(())
}

fn run_blocking(config: ThrottleConfig, invocations: u32) -> call_throttle::ThrottleMetrics {
    let throttle = BlockingThrottle::new(config);
    let start = Instant::now();

    for call in 1..=invocations {
        match throttle.call(|| start.elapsed()) {
            Ok(offset) => tracing::info!(call, offset_ms = offset.as_millis() as u64, "Guarded call ran"),
            Err(e) => tracing::warn!(call, error = %e, "Guarded call refused"),
        }
    }

    throttle.metrics()
}

async fn run_suspending(config: ThrottleConfig, invocations: u32) -> call_throttle::ThrottleMetrics {
    let throttle = SuspendingThrottle::new(config);
    let start = Instant::now();

    for call in 1..=invocations {
        match throttle.call(|| async move { start.elapsed() }).await {
            Ok(offset) => tracing::info!(call, offset_ms = offset.as_millis() as u64, "Guarded call ran"),
            Err(e) => tracing::warn!(call, error = %e, "Guarded call refused"),
        }
    }

    throttle.metrics()
}
