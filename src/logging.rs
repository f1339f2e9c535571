use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_FILE: &str = "nba_etl.log";
const DEFAULT_DIRECTIVE: &str = "nba_etl=info";

/// Console plus `nba_etl.log` in `log_dir`. `RUST_LOG` overrides the default
/// filter. Keep the returned guard alive for the life of the process or
/// buffered file lines are lost.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(log_dir)
        .with_context(|| format!("open log file in {}", log_dir.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let file_layer = fmt::layer().with_ansi(false).with_writer(file_writer);
    let console_layer = fmt::layer().with_writer(std::io::stderr);

    // A second init (tests, repeated calls) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(guard)
}
