//! Logging setup: stderr, plus an optional file under the cache directory.

use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Platform-specific log directory.
///
/// - macOS: `~/Library/Caches/packs/logs`
/// - Linux: `~/.cache/packs/logs` (or `$XDG_CACHE_HOME/packs/logs`)
/// - Windows: `%LOCALAPPDATA%\packs\cache\logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "packs")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("packs"))
        .join("logs")
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default level (`info`, or `debug` when
/// `verbose`). With `log_to_file`, a daily-rolling `packs.log` is written as
/// well; keep the returned guard alive until exit so it gets flushed.
pub fn setup_logging(verbose: bool, log_to_file: bool) -> Result<Option<WorkerGuard>> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if !log_to_file {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    }

    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::daily(&dir, "packs.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::debug!("Log file: {}/packs.log", dir.display());
    Ok(Some(guard))
}
