use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "skillpath.log";

/// Keeps the non-blocking file writer alive; dropping it flushes pending lines.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber: stdout always, a daily-rolling file when configured.
///
/// A second call (tests, embedding) leaves the first subscriber in place.
pub fn init_tracing(config: &Config) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match config.file_log_dir.as_deref().and_then(file_writer) {
        Some((writer, guard)) => (
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true),
            ),
            Some(FileLogGuard { _guard: guard }),
        ),
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        return None;
    }
    guard
}

fn file_writer(dir: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("failed to create log directory {}: {err}", dir.display());
        return None;
    }
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}
