//! Logging setup: rotated JSON files plus console output.
//!
//! One mode only, since the binary has a single long-running subcommand.
//! File entries are JSON for machine consumption; the stderr layer stays
//! human-readable. Both are filtered by `RUST_LOG` (default: `info`).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the non-blocking file writer alive.
///
/// Dropping the inner [`WorkerGuard`] flushes buffered entries and closes
/// the log file, so the guard must live as long as the process.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Initialise logging for the serving process.
///
/// JSON entries go to `{logs_dir}/frontdesk.log.YYYY-MM-DD`, rotated daily;
/// the console layer writes to stderr. The returned [`LoggingGuard`] must be
/// held until shutdown.
///
/// # Errors
///
/// Returns an error if the logs directory cannot be created.
pub fn init(logs_dir: &Path) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir).map_err(|e| {
        anyhow::anyhow!(
            "failed to create logs directory {}: {e}",
            logs_dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "frontdesk.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(console_layer)
        .init();

    Ok(LoggingGuard { _guard: guard })
}
