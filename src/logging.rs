//! Tracing subscriber setup
//!
//! Log lines go to a plain-text file through a non-blocking writer and,
//! optionally, to the console. `RUST_LOG` overrides the configured level.

use crate::config::LoggingConfig;
use crate::ScrapeError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Level for this crate after applying `-v` / `-q` to the configured one
pub fn effective_level(configured: &str, verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    let base = LEVELS
        .iter()
        .position(|level| level.eq_ignore_ascii_case(configured))
        .unwrap_or(2);
    LEVELS[(base + verbose as usize).min(LEVELS.len() - 1)]
}

/// Installs the global subscriber
///
/// The returned guard flushes the file writer when dropped, so the caller
/// keeps it alive until the process exits.
pub fn init_logging(
    config: &LoggingConfig,
    verbose: u8,
    quiet: bool,
) -> Result<Option<WorkerGuard>, ScrapeError> {
    let level = effective_level(&config.level, verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("critic_scrape={},warn", level)));

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let appender = file_appender(path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = config.console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| ScrapeError::Logging(e.to_string()))?;

    Ok(guard)
}

/// A single, never-rotated log file at `path`
fn file_appender(path: &Path) -> Result<RollingFileAppender, ScrapeError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ScrapeError::Logging(format!("invalid log file path: {}", path.display())))?;
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|e| ScrapeError::Logging(format!("cannot open {}: {}", path.display(), e)))
}
