//! Tracing setup: rolling file output plus console mirror in text mode.

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

fn rolling_writer(config: &AppConfig) -> (NonBlocking, WorkerGuard) {
    let rotation = match config.rotation.as_str() {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    };
    let appender = RollingFileAppender::new(rotation, &config.log_dir, &config.log_file);
    tracing_appender::non_blocking(appender)
}

/// Install the global tracing subscriber. The returned guard must be held for
/// the process lifetime or buffered log lines are dropped on exit.
///
/// `RUST_LOG` wins over the configured level when set. JSON mode writes to the
/// file only; text mode mirrors to stdout for local runs.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let (file_writer, guard) = rolling_writer(config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    if config.use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(file_writer),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(file_writer),
            )
            .with(fmt::layer().with_target(false).with_ansi(true))
            .init();
    }

    guard
}
